use alloc::vec::Vec;

use crate::label::Label;
use crate::pattern::{Pattern, PatternId};
use crate::pattern_set::PatternSet;

/// Lattice of patterns built from a data sequence, one [`PatternSet`] per position.
///
/// Patterns are stored in an arena and refer to each other by index. Index
/// [`ROOT`](crate::ROOT) holds a sentinel that precedes the first position.
#[derive(Clone, Debug)]
pub struct PatternSetSequence {
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) pattern_sets: Vec<PatternSet>,
}

impl PatternSetSequence {
    /// Returns the number of positions.
    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pattern_sets.len()
    }

    /// Returns `true` if the lattice has no position.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pattern_sets.is_empty()
    }

    /// Returns the pattern sets.
    #[inline(always)]
    #[must_use]
    pub fn pattern_sets(&self) -> &[PatternSet] {
        &self.pattern_sets
    }

    /// Returns the pattern of the given ID.
    #[inline(always)]
    #[must_use]
    pub fn pattern(&self, id: PatternId) -> &Pattern {
        &self.patterns[id]
    }

    /// Returns the number of patterns, including the root and the empty ones.
    #[inline(always)]
    #[must_use]
    pub fn num_patterns(&self) -> usize {
        self.patterns.len()
    }

    #[cfg(feature = "train")]
    pub(crate) fn initialize(&mut self, exp_weights: &[f64]) {
        let Self {
            patterns,
            pattern_sets,
        } = self;
        for pattern_set in pattern_sets {
            pattern_set.initialize_scores(patterns);
            pattern_set.set_pattern_weights(patterns, exp_weights);
        }
    }

    /// Infers the best label sequence.
    ///
    /// # Arguments
    ///
    /// * `weights` - Weights of the features, indexed by their IDs.
    ///
    /// Scores are summed in log space, so paths of vanishing probability are still decoded.
    /// Returns one label per position, or `None` if some position has no candidate label.
    pub fn decode(&mut self, weights: &[f64]) -> Option<Vec<Label>> {
        if self.is_empty() {
            return Some(vec![]);
        }

        let Self {
            patterns,
            pattern_sets,
        } = self;
        for pattern_set in pattern_sets.iter_mut() {
            pattern_set.initialize_scores(patterns);
            pattern_set.set_pattern_log_weights(patterns, weights);
        }
        pattern_sets[0].set_first_best_scores(patterns);
        for i in 1..pattern_sets.len() {
            let (prev_sets, sets) = pattern_sets.split_at_mut(i);
            sets[0].calc_best_scores(&prev_sets[i - 1], patterns);
        }

        let mut id = pattern_sets.last()?.best_pattern(patterns)?;
        let mut labels = vec![0; pattern_sets.len()];
        for label in labels.iter_mut().rev() {
            let pattern = &patterns[id];
            *label = pattern.labels.first()?;
            id = pattern.best_prev;
        }
        Some(labels)
    }
}
