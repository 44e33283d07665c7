use core::f64::consts::LN_2;

use crate::lattice::PatternSetSequence;
use crate::math;
use crate::pattern::{Pattern, ROOT};
use crate::pattern_set::PatternSet;

impl PatternSet {
    /// Calculates the forward differences and rescales them.
    ///
    /// The alpha of a pattern sums the paths whose longest match at this position is the
    /// pattern. Extensions are visited first and remove their histories from their suffixes.
    pub(crate) fn calc_alpha(&mut self, arena: &mut [Pattern]) {
        for &id in self.non_empty().iter().rev() {
            let prev_gamma = arena[arena[id].prev].gamma;
            let suffix = arena[id].suffix;
            arena[suffix].alpha -= prev_gamma;
            let pattern = &mut arena[id];
            pattern.alpha = (pattern.alpha + prev_gamma) * pattern.exp_weight;
        }
        self.scale = math::scale_exponent(self.non_empty().iter().map(|&id| arena[id].alpha));
        let factor = math::pow2(-self.scale);
        for &id in self.non_empty() {
            arena[id].alpha *= factor;
        }
    }

    /// Calculates the forward sums, which cover every path matching the pattern.
    pub(crate) fn calc_gamma(&self, arena: &mut [Pattern]) {
        for &id in self.non_empty().iter().rev() {
            let pattern = &mut arena[id];
            pattern.gamma += pattern.alpha;
            let (gamma, suffix) = (pattern.gamma, pattern.suffix);
            arena[suffix].gamma += gamma;
        }
    }

    pub(crate) fn set_last_delta(&self, arena: &mut [Pattern]) {
        arena[self.empty_pattern()].delta = 1.0;
    }

    /// Calculates the backward sums from the differences accumulated by the next position.
    ///
    /// `next_scale` is the exponent removed from the forward scores at the next position, or 0
    /// at the last position.
    pub(crate) fn calc_beta(&self, arena: &mut [Pattern], next_scale: i32) {
        let empty = self.empty_pattern();
        arena[empty].beta = arena[empty].delta;
        for &id in self.non_empty() {
            arena[id].beta = arena[id].delta + arena[arena[id].suffix].beta;
        }
        arena[empty].beta = 0.0;
        let factor = math::pow2(-next_scale);
        for &id in self.non_empty() {
            arena[id].beta *= factor;
        }
    }

    /// Pushes the backward differences to the previous position and sums the joint scores.
    pub(crate) fn calc_delta_and_others(&self, arena: &mut [Pattern]) {
        for &id in self.non_empty() {
            let pattern = &arena[id];
            let prev = pattern.prev;
            if prev != ROOT {
                let suffix = &arena[pattern.suffix];
                let diff = pattern.exp_weight * pattern.beta - suffix.exp_weight * suffix.beta;
                arena[prev].delta += diff;
            }
            let pattern = &mut arena[id];
            pattern.theta = pattern.alpha * pattern.beta;
        }
        for &id in self.non_empty().iter().rev() {
            let pattern = &mut arena[id];
            pattern.sigma += pattern.theta;
            let (sigma, suffix) = (pattern.sigma, pattern.suffix);
            arena[suffix].sigma += sigma;
        }
    }

    pub(crate) fn add_feature_expectations(
        &self,
        arena: &[Pattern],
        z: f64,
        expectations: &mut [f64],
    ) {
        for &id in self.non_empty() {
            let pattern = &arena[id];
            let prob = pattern.sigma / z;
            for &fid in &pattern.features {
                expectations[fid] -= prob;
            }
        }
    }

    /// Returns the scaled partition function.
    #[inline(always)]
    pub(crate) fn z(&self, arena: &[Pattern]) -> f64 {
        arena[self.empty_pattern()].sigma
    }
}

impl PatternSetSequence {
    /// Runs the forward-backward passes and subtracts the feature expectations.
    ///
    /// # Arguments
    ///
    /// * `exp_weights` - Exponential weights of the features, indexed by their IDs.
    /// * `expectations` - Accumulator of the features. The marginal probability of each
    ///   feature is subtracted from its slot.
    ///
    /// Returns the log-likelihood of the gold labels.
    #[cfg_attr(docsrs, doc(cfg(feature = "train")))]
    pub fn accumulate_feature_expectation(
        &mut self,
        exp_weights: &[f64],
        expectations: &mut [f64],
    ) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.initialize(exp_weights);

        let Self {
            patterns,
            pattern_sets,
        } = self;
        for pattern_set in pattern_sets.iter_mut() {
            pattern_set.calc_alpha(patterns);
            pattern_set.calc_gamma(patterns);
        }
        if let Some(last) = pattern_sets.last() {
            last.set_last_delta(patterns);
        }
        let mut next_scale = 0;
        for pattern_set in pattern_sets.iter().rev() {
            pattern_set.calc_beta(patterns, next_scale);
            pattern_set.calc_delta_and_others(patterns);
            next_scale = pattern_set.scale;
        }

        let z = pattern_sets[0].z(patterns);
        if z > 0.0 && z.is_finite() {
            for pattern_set in pattern_sets.iter() {
                pattern_set.add_feature_expectations(patterns, z, expectations);
            }
        }
        self.calc_log_likelihood()
    }

    /// Returns the log-likelihood of the gold labels computed by the last forward-backward pass.
    ///
    /// Returns 0 if the value is not finite.
    #[cfg_attr(docsrs, doc(cfg(feature = "train")))]
    #[must_use]
    pub fn calc_log_likelihood(&self) -> f64 {
        let mut ll = -self.log_partition_function();
        for pattern_set in &self.pattern_sets {
            ll += self.patterns[pattern_set.longest_match].exp_weight.ln();
        }
        if ll.is_finite() {
            ll
        } else {
            log::warn!("log-likelihood is not finite ({ll}), replaced with 0");
            0.0
        }
    }

    /// Returns the logarithm of the partition function computed by the last forward-backward
    /// pass.
    #[cfg_attr(docsrs, doc(cfg(feature = "train")))]
    #[must_use]
    pub fn log_partition_function(&self) -> f64 {
        let Some(first) = self.pattern_sets.first() else {
            return 0.0;
        };
        let scale: i32 = self.pattern_sets.iter().map(|s| s.scale).sum();
        first.z(&self.patterns).ln() + LN_2 * f64::from(scale)
    }
}
