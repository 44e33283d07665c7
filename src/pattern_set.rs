use alloc::vec::Vec;

use crate::pattern::{Pattern, PatternId};

/// All patterns at one position of a lattice.
#[derive(Clone, Debug)]
pub struct PatternSet {
    /// Pattern IDs sorted by their label sequences. The first one is the empty pattern.
    pub(crate) patterns: Vec<PatternId>,

    /// Longest pattern matching the gold labels, or the empty pattern.
    pub(crate) longest_match: PatternId,

    /// Binary exponent removed from the forward scores.
    pub(crate) scale: i32,
}

impl PatternSet {
    pub(crate) const fn new(patterns: Vec<PatternId>, longest_match: PatternId) -> Self {
        Self {
            patterns,
            longest_match,
            scale: 0,
        }
    }

    /// Returns the pattern IDs sorted by their label sequences.
    #[inline(always)]
    #[must_use]
    pub fn patterns(&self) -> &[PatternId] {
        &self.patterns
    }

    /// Returns the longest pattern matching the gold labels.
    #[inline(always)]
    #[must_use]
    pub const fn longest_match(&self) -> PatternId {
        self.longest_match
    }

    /// Returns the binary exponent removed from the forward scores in the last pass.
    #[inline(always)]
    #[must_use]
    pub const fn scale(&self) -> i32 {
        self.scale
    }

    #[inline(always)]
    pub(crate) fn empty_pattern(&self) -> PatternId {
        self.patterns[0]
    }

    /// Non-empty patterns in label sequence order, so suffixes come before their extensions.
    #[inline(always)]
    pub(crate) fn non_empty(&self) -> &[PatternId] {
        &self.patterns[1..]
    }

    pub(crate) fn initialize_scores(&mut self, arena: &mut [Pattern]) {
        let empty = self.empty_pattern();
        for &id in &self.patterns {
            let pattern = &mut arena[id];
            pattern.reset_scores();
            pattern.best_prefix = empty;
            pattern.best_prev = empty;
        }
        self.scale = 0;
    }

    /// Sets the weight of each pattern to the product of the exponential weights of all features
    /// matched by it.
    #[cfg(feature = "train")]
    pub(crate) fn set_pattern_weights(&self, arena: &mut [Pattern], exp_weights: &[f64]) {
        for &id in self.non_empty() {
            let mut weight = arena[arena[id].suffix].exp_weight;
            for &fid in &arena[id].features {
                weight *= exp_weights[fid];
            }
            arena[id].exp_weight = weight;
        }
    }

    /// Sets the log weight of each pattern to the sum of the weights of all features matched by
    /// it.
    pub(crate) fn set_pattern_log_weights(&self, arena: &mut [Pattern], weights: &[f64]) {
        for &id in self.non_empty() {
            let mut weight = arena[arena[id].suffix].log_weight;
            for &fid in &arena[id].features {
                weight += weights[fid];
            }
            arena[id].log_weight = weight;
        }
    }

    pub(crate) fn set_first_best_scores(&self, arena: &mut [Pattern]) {
        for &id in self.non_empty() {
            arena[id].best_score = arena[id].log_weight;
        }
        arena[self.empty_pattern()].best_score = f64::NEG_INFINITY;
    }

    /// Restores the best scores that the patterns offer to the next position.
    pub(crate) fn reset_best_scores_for_label(&self, arena: &mut [Pattern]) {
        for &id in self.non_empty() {
            let pattern = &mut arena[id];
            pattern.best_score_for_label = pattern.best_score;
            pattern.best_prefix = id;
        }
        let empty = self.empty_pattern();
        arena[empty].best_score_for_label = f64::NEG_INFINITY;
        arena[empty].best_prefix = empty;
    }

    /// Calculates the best scores of the patterns from the ones at the previous position.
    ///
    /// Patterns are visited from the last in sorted order, so that patterns sharing the most
    /// recent label are visited together, longer contexts first. Within such a group the
    /// predecessors are visited in decreasing order too, which lets a single cursor walk the
    /// previous position and push the best scores of longer histories into their suffixes.
    pub(crate) fn calc_best_scores(&self, prev_set: &Self, arena: &mut [Pattern]) {
        let mut cursor = 0;
        let mut current_label = None;
        for &id in self.non_empty().iter().rev() {
            let label = arena[id].labels.first();
            if label != current_label {
                prev_set.reset_best_scores_for_label(arena);
                cursor = prev_set.patterns.len() - 1;
                current_label = label;
            }
            let target = arena[id].prev;
            while prev_set.patterns[cursor] != target {
                let prev_id = prev_set.patterns[cursor];
                let score = arena[prev_id].best_score_for_label;
                let prefix = arena[prev_id].best_prefix;
                let suffix_id = arena[prev_id].suffix;
                let suffix = &mut arena[suffix_id];
                if score > suffix.best_score_for_label {
                    suffix.best_score_for_label = score;
                    suffix.best_prefix = prefix;
                }
                cursor -= 1;
            }
            let best_score = arena[target].best_score_for_label + arena[id].log_weight;
            let best_prev = arena[target].best_prefix;
            let pattern = &mut arena[id];
            pattern.best_score = best_score;
            pattern.best_prev = best_prev;

            // the histories under the predecessor are claimed by this pattern
            arena[target].best_score_for_label = f64::NEG_INFINITY;
        }
    }

    /// Returns the pattern with the highest best score, ignoring patterns no path reaches.
    pub(crate) fn best_pattern(&self, arena: &[Pattern]) -> Option<PatternId> {
        let mut best: Option<PatternId> = None;
        for &id in self.non_empty() {
            let score = arena[id].best_score;
            if score > f64::NEG_INFINITY && best.is_none_or(|best| score > arena[best].best_score)
            {
                best = Some(id);
            }
        }
        best
    }
}
