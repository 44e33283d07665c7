use alloc::string::String;
use alloc::vec::Vec;

use crate::data::DataSequence;
use crate::feature::{Feature, FeatureTemplate};
use crate::generator::{
    AggregatedFeatureTemplateGenerator, FeatureTemplateGenerator,
    UnconditionalFeatureTemplateGenerator,
};
use crate::label::{Label, LabelSequence};
use crate::math;

/// Emits the current word with orders 1 and 2.
pub struct CurrentWordGenerator;

impl FeatureTemplateGenerator<&str> for CurrentWordGenerator {
    fn generate_at(&self, observations: &[&str], pos: usize) -> Vec<FeatureTemplate> {
        let observation = format!("w={}", observations[pos]);
        let mut templates = vec![FeatureTemplate::new(observation.clone(), 1)];
        if pos != 0 {
            templates.push(FeatureTemplate::new(observation, 2));
        }
        templates
    }
}

pub fn generate_test_generator() -> AggregatedFeatureTemplateGenerator<&'static str> {
    let mut generator = AggregatedFeatureTemplateGenerator::new();
    generator.add_generator(UnconditionalFeatureTemplateGenerator::new(2));
    generator.add_generator(CurrentWordGenerator);
    generator
}

// the: 0, dog/cat: 1, runs/sleeps: 2
pub fn generate_test_corpus() -> Vec<DataSequence> {
    let generator = generate_test_generator();
    [
        (vec!["the", "dog", "runs"], vec![0, 1, 2]),
        (vec!["the", "cat", "sleeps"], vec![0, 1, 2]),
        (vec!["a", "dog", "sleeps"], vec![0, 1, 2]),
        (vec!["dogs", "run"], vec![1, 2]),
        (vec!["the", "cat", "runs", "the", "dog"], vec![0, 1, 2, 0, 1]),
    ]
    .into_iter()
    .map(|(words, labels)| {
        DataSequence::from_observations(&words, Some(labels), &generator).unwrap()
    })
    .collect()
}

/// Creates a sequence of the given length alternating between two observations.
///
/// Every position activates the unconditional templates of orders 1..=max_order.
pub fn generate_test_sequence(
    len: usize,
    max_order: usize,
    labels: Option<Vec<Label>>,
) -> DataSequence {
    let templates = (0..len)
        .map(|pos| {
            let mut templates: Vec<_> = (1..=max_order.min(pos + 1))
                .map(|order| FeatureTemplate::new("", order))
                .collect();
            let observation = if pos % 2 == 0 { "even" } else { "odd" };
            templates.push(FeatureTemplate::new(observation, 1));
            if pos != 0 {
                templates.push(FeatureTemplate::new(observation, 2));
            }
            templates
        })
        .collect();
    DataSequence::new(templates, labels).unwrap()
}

/// Creates all features of the test sequences over `n_labels` labels with deterministic weights.
pub fn generate_test_features(n_labels: Label, max_order: usize) -> Vec<Feature> {
    let mut features = vec![];
    let mut seed = 1u32;
    let mut next_weight = || {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345) % 65_536;
        f64::from(seed) / 65_536.0 - 0.5
    };
    for order in 1..=max_order {
        for labels in enumerate_paths(n_labels, order) {
            features.push(Feature::with_weight(
                "",
                LabelSequence::new(labels),
                next_weight(),
            ));
        }
    }
    for observation in ["even", "odd"] {
        for order in 1..=2 {
            for labels in enumerate_paths(n_labels, order) {
                features.push(Feature::with_weight(
                    String::from(observation),
                    LabelSequence::new(labels),
                    next_weight(),
                ));
            }
        }
    }
    features
}

/// Returns all label sequences of the given length.
pub fn enumerate_paths(n_labels: Label, len: usize) -> Vec<Vec<Label>> {
    let mut paths = vec![vec![]];
    for _ in 0..len {
        paths = paths
            .into_iter()
            .flat_map(|path| {
                (0..n_labels).map(move |label| {
                    let mut path = path.clone();
                    path.push(label);
                    path
                })
            })
            .collect();
    }
    paths
}

/// Counts the features fired by a label path, checking every template against every feature.
pub fn path_feature_counts(
    features: &[Feature],
    sequence: &DataSequence,
    path: &[Label],
) -> Vec<f64> {
    let mut counts = vec![0.0; features.len()];
    for pos in 0..sequence.len() {
        for template in sequence.templates_at(pos) {
            let order = template.order();
            if order == 0 || order > pos + 1 {
                continue;
            }
            let history: Vec<Label> = (0..order).map(|i| path[pos - i]).collect();
            for (count, feature) in counts.iter_mut().zip(features) {
                if feature.template() == *template && feature.labels().labels() == history {
                    *count += 1.0;
                }
            }
        }
    }
    counts
}

pub fn path_log_score(features: &[Feature], sequence: &DataSequence, path: &[Label]) -> f64 {
    path_feature_counts(features, sequence, path)
        .into_iter()
        .zip(features)
        .map(|(count, feature)| count * feature.weight())
        .sum()
}

pub fn brute_force_log_partition(
    features: &[Feature],
    sequence: &DataSequence,
    n_labels: Label,
) -> f64 {
    enumerate_paths(n_labels, sequence.len())
        .iter()
        .map(|path| path_log_score(features, sequence, path))
        .fold(f64::NEG_INFINITY, math::logsumexp)
}

pub fn brute_force_best_path(
    features: &[Feature],
    sequence: &DataSequence,
    n_labels: Label,
) -> Vec<Label> {
    let mut best = (f64::NEG_INFINITY, vec![]);
    for path in enumerate_paths(n_labels, sequence.len()) {
        let score = path_log_score(features, sequence, &path);
        if score > best.0 {
            best = (score, path);
        }
    }
    best.1
}

/// Returns the model expectation of each feature count.
pub fn brute_force_expectations(
    features: &[Feature],
    sequence: &DataSequence,
    n_labels: Label,
) -> Vec<f64> {
    let log_z = brute_force_log_partition(features, sequence, n_labels);
    let mut expectations = vec![0.0; features.len()];
    for path in enumerate_paths(n_labels, sequence.len()) {
        let prob = (path_log_score(features, sequence, &path) - log_z).exp();
        for (e, c) in expectations
            .iter_mut()
            .zip(path_feature_counts(features, sequence, &path))
        {
            *e += prob * c;
        }
    }
    expectations
}

/// First-order forward recursion in log space, for sequences without templates above order 2.
pub fn log_partition_first_order(
    features: &[Feature],
    sequence: &DataSequence,
    n_labels: Label,
) -> f64 {
    let score = |pos: usize, labels: &[Label]| -> f64 {
        let mut score = 0.0;
        for template in sequence.templates_at(pos) {
            if template.order() != labels.len() {
                continue;
            }
            for feature in features {
                if feature.template() == *template && feature.labels().labels() == labels {
                    score += feature.weight();
                }
            }
        }
        score
    };
    let mut alphas: Vec<f64> = (0..n_labels).map(|y| score(0, &[y])).collect();
    for pos in 1..sequence.len() {
        alphas = (0..n_labels)
            .map(|y| {
                let unigram = score(pos, &[y]);
                (0..n_labels)
                    .map(|x| alphas[x as usize] + unigram + score(pos, &[y, x]))
                    .fold(f64::NEG_INFINITY, math::logsumexp)
            })
            .collect();
    }
    alphas.into_iter().fold(f64::NEG_INFINITY, math::logsumexp)
}
