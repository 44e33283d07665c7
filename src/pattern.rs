use alloc::vec::Vec;

use crate::label::LabelSequence;

/// Index of a pattern in the arena of its lattice.
pub type PatternId = usize;

/// The sentinel predecessor of the patterns at the first position.
pub const ROOT: PatternId = 0;

/// A label context observed at one position of a lattice.
///
/// The pattern is the node of every path whose labels, read backward from its position, start
/// with `labels` and are not matched by a longer pattern at the same position.
#[derive(Clone, Debug)]
pub struct Pattern {
    pub(crate) labels: LabelSequence,
    pub(crate) features: Vec<usize>,

    /// Pattern at the previous position holding `labels.prefix()`.
    pub(crate) prev: PatternId,

    /// Pattern at the same position holding the longest proper leading part of `labels`.
    pub(crate) suffix: PatternId,

    pub(crate) exp_weight: f64,
    pub(crate) log_weight: f64,

    // forward difference and forward sum
    pub(crate) alpha: f64,
    pub(crate) gamma: f64,

    // backward sum and backward difference
    pub(crate) beta: f64,
    pub(crate) delta: f64,

    // joint score of the paths going through this pattern, and its sum over the extensions
    pub(crate) theta: f64,
    pub(crate) sigma: f64,

    // for decoding, in log space
    pub(crate) best_score: f64,
    pub(crate) best_score_for_label: f64,
    pub(crate) best_prefix: PatternId,
    pub(crate) best_prev: PatternId,
}

impl Pattern {
    pub(crate) const fn new(labels: LabelSequence) -> Self {
        Self {
            labels,
            features: Vec::new(),
            prev: ROOT,
            suffix: ROOT,
            exp_weight: 1.0,
            log_weight: 0.0,
            alpha: 0.0,
            gamma: 0.0,
            beta: 0.0,
            delta: 0.0,
            theta: 0.0,
            sigma: 0.0,
            best_score: f64::NEG_INFINITY,
            best_score_for_label: f64::NEG_INFINITY,
            best_prefix: ROOT,
            best_prev: ROOT,
        }
    }

    /// Creates the root pattern, whose forward sum makes the empty history weigh 1.
    pub(crate) const fn root() -> Self {
        let mut root = Self::new(LabelSequence::empty());
        root.gamma = 1.0;
        root
    }

    /// Returns the label sequence.
    #[inline(always)]
    #[must_use]
    pub const fn labels(&self) -> &LabelSequence {
        &self.labels
    }

    /// Returns the IDs of the attached features.
    #[inline(always)]
    #[must_use]
    pub fn features(&self) -> &[usize] {
        &self.features
    }

    /// Returns the pattern at the previous position this pattern extends.
    #[inline(always)]
    #[must_use]
    pub const fn prev(&self) -> PatternId {
        self.prev
    }

    /// Returns the pattern holding the longest proper leading part of the labels.
    #[inline(always)]
    #[must_use]
    pub const fn suffix(&self) -> PatternId {
        self.suffix
    }

    pub(crate) fn reset_scores(&mut self) {
        self.exp_weight = 1.0;
        self.log_weight = 0.0;
        self.alpha = 0.0;
        self.gamma = 0.0;
        self.beta = 0.0;
        self.delta = 0.0;
        self.theta = 0.0;
        self.sigma = 0.0;
        self.best_score = f64::NEG_INFINITY;
        self.best_score_for_label = f64::NEG_INFINITY;
        self.best_prefix = ROOT;
        self.best_prev = ROOT;
    }
}
