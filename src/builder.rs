use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::data::DataSequence;
use crate::feature::{Feature, FeatureIndex};
use crate::label::LabelSequence;
use crate::lattice::PatternSetSequence;
use crate::pattern::{Pattern, PatternId, ROOT};
use crate::pattern_set::PatternSet;

type PatternMap = BTreeMap<LabelSequence, PatternId>;

/// Builds the pattern lattice of a data sequence.
///
/// Every feature whose template is active at a position creates or extends the pattern of its
/// label sequence there. Missing predecessors are created on demand, so that each pattern of
/// order `k > 1` is linked to the pattern of its `k - 1` older labels one position back.
///
/// # Arguments
///
/// * `sequence` - The data sequence.
/// * `features` - All known features. Their indices are the feature IDs.
/// * `index` - Index of `features`.
#[must_use]
pub fn build_pattern_set_sequence(
    sequence: &DataSequence,
    features: &[Feature],
    index: &FeatureIndex,
) -> PatternSetSequence {
    let mut patterns = vec![Pattern::root()];
    let mut maps: Vec<PatternMap> = Vec::with_capacity(sequence.len());

    for pos in 0..sequence.len() {
        let mut map = PatternMap::new();
        map.insert(LabelSequence::empty(), patterns.len());
        patterns.push(Pattern::new(LabelSequence::empty()));
        maps.push(map);

        for template in sequence.templates_at(pos) {
            let order = template.order();
            if order == 0 || order > pos + 1 {
                continue;
            }
            let Some(fids) = index.get(template) else {
                continue;
            };
            for &fid in fids {
                let id = find_or_insert(&mut patterns, &mut maps, pos, features[fid].labels());
                patterns[id].features.push(fid);
            }
        }
    }

    let max_order = index.max_order();
    let pattern_sets = maps
        .iter()
        .enumerate()
        .map(|(pos, map)| {
            link_suffixes(&mut patterns, map, max_order);
            let longest_match = find_longest_match(sequence, map, pos, max_order);
            PatternSet::new(map.values().copied().collect(), longest_match)
        })
        .collect();

    PatternSetSequence {
        patterns,
        pattern_sets,
    }
}

fn find_or_insert(
    patterns: &mut Vec<Pattern>,
    maps: &mut [PatternMap],
    pos: usize,
    labels: &LabelSequence,
) -> PatternId {
    if let Some(&id) = maps[pos].get(labels) {
        return id;
    }
    let id = patterns.len();
    patterns.push(Pattern::new(labels.clone()));
    maps[pos].insert(labels.clone(), id);
    link_predecessors(patterns, maps, pos, id);
    id
}

/// Walks back from a new pattern and creates its missing predecessors.
fn link_predecessors(
    patterns: &mut Vec<Pattern>,
    maps: &mut [PatternMap],
    mut pos: usize,
    mut id: PatternId,
) {
    while pos != 0 {
        let prefix = patterns[id].labels.prefix();
        if let Some(&prev) = maps[pos - 1].get(&prefix) {
            patterns[id].prev = prev;
            return;
        }
        let prev = patterns.len();
        patterns.push(Pattern::new(prefix.clone()));
        maps[pos - 1].insert(prefix, prev);
        patterns[id].prev = prev;
        id = prev;
        pos -= 1;
    }
    patterns[id].prev = ROOT;
}

/// Sets the suffix link of every non-empty pattern at one position.
///
/// `candidates[k]` holds the longest pattern of order `<= k` leading the current key.
fn link_suffixes(patterns: &mut [Pattern], map: &PatternMap, max_order: usize) {
    let mut candidates = vec![ROOT; max_order + 1];
    let mut last: Option<&LabelSequence> = None;
    for (labels, &id) in map {
        let order = labels.order();
        if let Some(last) = last {
            let diff = last.difference_position(labels);
            let suffix = candidates[diff];
            patterns[id].suffix = suffix;
            for candidate in &mut candidates[diff + 1..order] {
                *candidate = suffix;
            }
        }
        for candidate in &mut candidates[order..] {
            *candidate = id;
        }
        last = Some(labels);
    }
}

fn find_longest_match(
    sequence: &DataSequence,
    map: &PatternMap,
    pos: usize,
    max_order: usize,
) -> PatternId {
    let empty = map.get(&LabelSequence::empty()).copied().unwrap_or(ROOT);
    for order in (1..=max_order.min(pos + 1)).rev() {
        let Some(labels) = sequence.label_sequence_at(pos, order) else {
            return empty;
        };
        if let Some(&id) = map.get(&labels) {
            return id;
        }
    }
    empty
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::feature::FeatureTemplate;
    use crate::label::Label;

    fn find(lattice: &PatternSetSequence, pos: usize, labels: &[Label]) -> Option<PatternId> {
        lattice.pattern_sets()[pos]
            .patterns()
            .iter()
            .copied()
            .find(|&id| lattice.pattern(id).labels().labels() == labels)
    }

    fn generate_test_lattice() -> PatternSetSequence {
        let features = vec![
            Feature::new("", LabelSequence::new(vec![0])),
            Feature::new("", LabelSequence::new(vec![1])),
            Feature::new("", LabelSequence::new(vec![1, 0])),
            Feature::new("a", LabelSequence::new(vec![0, 1, 1])),
        ];
        let index = FeatureIndex::new(&features);
        let templates = vec![
            vec![
                FeatureTemplate::new("", 1),
                FeatureTemplate::new("", 2),
                FeatureTemplate::new("", 0),
            ],
            vec![
                FeatureTemplate::new("", 1),
                FeatureTemplate::new("", 2),
                FeatureTemplate::new("a", 3),
            ],
            vec![
                FeatureTemplate::new("", 1),
                FeatureTemplate::new("", 2),
                FeatureTemplate::new("a", 3),
                FeatureTemplate::new("b", 1),
            ],
        ];
        let sequence = DataSequence::new(templates, Some(vec![0, 1, 1])).unwrap();
        build_pattern_set_sequence(&sequence, &features, &index)
    }

    #[test]
    fn test_patterns() {
        let lattice = generate_test_lattice();
        assert_eq!(3, lattice.len());

        let labels = |pos: usize| -> Vec<Vec<Label>> {
            lattice.pattern_sets()[pos]
                .patterns()
                .iter()
                .map(|&id| lattice.pattern(id).labels().labels().to_vec())
                .collect()
        };
        assert_eq!(vec![vec![], vec![0], vec![1]], labels(0));
        assert_eq!(
            vec![vec![], vec![0], vec![1], vec![1, 0], vec![1, 1]],
            labels(1)
        );
        assert_eq!(
            vec![vec![], vec![0], vec![0, 1, 1], vec![1], vec![1, 0]],
            labels(2)
        );

        // root + 3 + 5 + 5
        assert_eq!(14, lattice.num_patterns());
    }

    #[test]
    fn test_features() {
        let lattice = generate_test_lattice();
        let features_at = |pos: usize, labels: &[Label]| -> Vec<usize> {
            lattice
                .pattern(find(&lattice, pos, labels).unwrap())
                .features()
                .to_vec()
        };
        assert_eq!(vec![0], features_at(0, &[0]));
        assert_eq!(vec![2], features_at(1, &[1, 0]));
        assert!(features_at(1, &[1, 1]).is_empty());
        assert_eq!(vec![3], features_at(2, &[0, 1, 1]));
        assert!(features_at(2, &[]).is_empty());
    }

    #[test]
    fn test_prev_links() {
        let lattice = generate_test_lattice();
        let prev = |pos: usize, labels: &[Label]| {
            lattice
                .pattern(find(&lattice, pos, labels).unwrap())
                .prev()
        };
        assert_eq!(ROOT, prev(0, &[0]));
        assert_eq!(ROOT, prev(0, &[1]));
        assert_eq!(find(&lattice, 0, &[]).unwrap(), prev(1, &[1]));
        assert_eq!(find(&lattice, 0, &[0]).unwrap(), prev(1, &[1, 0]));
        assert_eq!(find(&lattice, 0, &[1]).unwrap(), prev(1, &[1, 1]));
        assert_eq!(find(&lattice, 1, &[1, 1]).unwrap(), prev(2, &[0, 1, 1]));
        assert_eq!(find(&lattice, 1, &[0]).unwrap(), prev(2, &[1, 0]));
    }

    #[test]
    fn test_suffix_links() {
        let lattice = generate_test_lattice();
        let suffix = |pos: usize, labels: &[Label]| {
            lattice
                .pattern(find(&lattice, pos, labels).unwrap())
                .suffix()
        };
        let empty = find(&lattice, 2, &[]).unwrap();
        assert_eq!(empty, suffix(2, &[0]));
        assert_eq!(empty, suffix(2, &[1]));
        assert_eq!(find(&lattice, 2, &[0]).unwrap(), suffix(2, &[0, 1, 1]));
        assert_eq!(find(&lattice, 2, &[1]).unwrap(), suffix(2, &[1, 0]));
        assert_eq!(find(&lattice, 1, &[1]).unwrap(), suffix(1, &[1, 0]));
        assert_eq!(find(&lattice, 1, &[1]).unwrap(), suffix(1, &[1, 1]));
    }

    #[test]
    fn test_longest_match() {
        let lattice = generate_test_lattice();
        let longest_match = |pos: usize| {
            let id = lattice.pattern_sets()[pos].longest_match();
            lattice.pattern(id).labels().labels().to_vec()
        };
        assert_eq!(vec![0], longest_match(0));
        assert_eq!(vec![1, 0], longest_match(1));
        assert_eq!(vec![1], longest_match(2));
    }

    #[test]
    fn test_no_duplicate_patterns() {
        let lattice = generate_test_lattice();
        for pattern_set in lattice.pattern_sets() {
            let labels: Vec<_> = pattern_set
                .patterns()
                .iter()
                .map(|&id| lattice.pattern(id).labels())
                .collect();
            assert!(labels.windows(2).all(|w| w[0] < w[1]));
            assert!(labels[0].is_empty());
        }
    }

    #[test]
    fn test_candidate_chain_skips_missing_orders() {
        let features = vec![
            Feature::new("", LabelSequence::new(vec![0])),
            Feature::new("", LabelSequence::new(vec![0, 0, 0])),
            Feature::new("", LabelSequence::new(vec![1])),
            Feature::new("", LabelSequence::new(vec![1, 0, 0])),
        ];
        let index = FeatureIndex::new(&features);
        let templates = vec![
            vec![FeatureTemplate::new("", 1)],
            vec![FeatureTemplate::new("", 1)],
            vec![FeatureTemplate::new("", 1), FeatureTemplate::new("", 3)],
        ];
        let sequence = DataSequence::new(templates, None).unwrap();
        let lattice = build_pattern_set_sequence(&sequence, &features, &index);
        let suffix = |labels: &[Label]| lattice.pattern(find(&lattice, 2, labels).unwrap()).suffix();
        assert_eq!(find(&lattice, 2, &[0]).unwrap(), suffix(&[0, 0, 0]));
        assert_eq!(find(&lattice, 2, &[1]).unwrap(), suffix(&[1, 0, 0]));
        assert_eq!(find(&lattice, 2, &[]).unwrap(), suffix(&[1]));
        assert_eq!(
            lattice.pattern_sets()[2].empty_pattern(),
            lattice.pattern_sets()[2].longest_match()
        );
    }
}
