use alloc::vec::Vec;

use argmin::core::observers::ObserverMode;
use argmin::core::{Executor, State};
use argmin::solver::linesearch::condition::ArmijoCondition;
use argmin::solver::linesearch::{BacktrackingLineSearch, MoreThuenteLineSearch};
use argmin::solver::quasinewton::LBFGS;
use argmin_observer_slog::SlogLogger;

use crate::builder::build_pattern_set_sequence;
use crate::data::DataSequence;
use crate::errors::{HocrfError, Result};
use crate::feature::{Feature, FeatureCounter, FeatureIndex};
use crate::lattice::PatternSetSequence;
use crate::model::Model;
use crate::objective::LogLikelihoodFunction;

/// L1- or L2- regularization settings
#[cfg_attr(docsrs, doc(cfg(feature = "train")))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Regularization {
    /// Performs L1-regularization with OWL-QN.
    L1,

    /// Performs L2-regularization.
    L2,
}

/// Trainer for high-order CRF
#[cfg_attr(docsrs, doc(cfg(feature = "train")))]
pub struct Trainer {
    max_iter: u64,
    n_threads: usize,
    regularization: Regularization,
    lambda: f64,
    epsilon: f64,
    verbose: bool,
}

macro_rules! minimize {
    ( $trainer:expr, $objective:expr, $solver:expr, $weights_init:expr ) => {{
        let executor = Executor::new($objective, $solver)
            .configure(|state| state.param($weights_init).max_iters($trainer.max_iter));
        let res = if $trainer.verbose {
            executor
                .add_observer(SlogLogger::term(), ObserverMode::Always)
                .run()?
        } else {
            executor.run()?
        };
        let state = res.state();
        log::info!(
            "optimization finished after {} iterations: {:?}",
            state.get_iter(),
            state.get_termination_status(),
        );
        state.get_best_param().or_else(|| state.get_param()).cloned()
    }};
}

impl Trainer {
    /// Creates a new trainer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_iter: 100,
            n_threads: 1,
            regularization: Regularization::L2,
            lambda: 0.1,
            epsilon: 1e-5,
            verbose: false,
        }
    }

    /// Sets the maximum number of iterations
    ///
    /// # Errors
    ///
    /// `max_iter` must not be 0.
    pub fn max_iter(mut self, max_iter: u64) -> Result<Self> {
        if max_iter == 0 {
            return Err(HocrfError::invalid_argument("max_iter", "must not be 0"));
        }
        self.max_iter = max_iter;
        Ok(self)
    }

    /// Sets regularization settings.
    ///
    /// # Errors
    ///
    /// `lambda` must be greater than or equal to 0.
    pub fn regularization(mut self, regularization: Regularization, lambda: f64) -> Result<Self> {
        if !(lambda >= 0.0 && lambda.is_finite()) {
            return Err(HocrfError::invalid_argument(
                "lambda",
                "must be greater than or equal to 0",
            ));
        }
        self.regularization = regularization;
        self.lambda = lambda;
        Ok(self)
    }

    /// Sets the number of threads
    ///
    /// # Errors
    ///
    /// `n_threads` must not be 0.
    pub fn n_threads(mut self, n_threads: usize) -> Result<Self> {
        if n_threads == 0 {
            return Err(HocrfError::invalid_argument("n_threads", "must not be 0"));
        }
        self.n_threads = n_threads;
        Ok(self)
    }

    /// Sets the tolerance of the change of the objective, used as a stopping criterion.
    ///
    /// # Errors
    ///
    /// `epsilon` must be a positive number.
    pub fn epsilon(mut self, epsilon: f64) -> Result<Self> {
        if !(epsilon > 0.0 && epsilon.is_finite()) {
            return Err(HocrfError::invalid_argument(
                "epsilon",
                "must be a positive number",
            ));
        }
        self.epsilon = epsilon;
        Ok(self)
    }

    /// Prints the progress of the optimizer to the terminal.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Starts training and generates a model from the given sequences
    ///
    /// Features are the pairs of observations and label histories found in the gold labels.
    /// The returned model keeps the features with non-zero weights, plus the unconditional
    /// order-1 features which keep every seen label a candidate.
    ///
    /// # Errors
    ///
    /// [`HocrfError::InvalidArgument`] is returned if `sequences` is empty or some sequence has
    /// no gold labels. Failures during the optimization are returned as
    /// [`HocrfError::Optimization`] or [`HocrfError::Scheduler`].
    pub fn train(&self, sequences: &[DataSequence]) -> Result<Model> {
        if sequences.is_empty() {
            return Err(HocrfError::invalid_argument("sequences", "must not be empty"));
        }
        if sequences.iter().any(|sequence| sequence.labels().is_none()) {
            return Err(HocrfError::invalid_argument(
                "sequences",
                "must have gold labels",
            ));
        }

        let mut counter = FeatureCounter::new();
        for sequence in sequences {
            sequence.accumulate_feature_counts(&mut counter);
        }
        let (features, feature_counts) = counter.into_parts();
        let index = FeatureIndex::new(&features);
        log::info!(
            "number of features: {} (max order: {})",
            features.len(),
            index.max_order()
        );

        let lattices: Vec<PatternSetSequence> = sequences
            .iter()
            .map(|sequence| build_pattern_set_sequence(sequence, &features, &index))
            .collect();
        log::info!(
            "number of patterns: {}",
            lattices
                .iter()
                .map(PatternSetSequence::num_patterns)
                .sum::<usize>()
        );

        let l2_lambda = (self.regularization == Regularization::L2).then_some(self.lambda);
        let objective =
            LogLikelihoodFunction::new(lattices, feature_counts, self.n_threads, l2_lambda)?;
        let weights_init = vec![0.0; features.len()];

        let weights = match self.regularization {
            Regularization::L1 => {
                let linesearch =
                    BacktrackingLineSearch::new(ArmijoCondition::new(1e-4)?).rho(0.5)?;
                let solver = LBFGS::new(linesearch, 7)
                    .with_tolerance_cost(self.epsilon)?
                    .with_l1_regularization(self.lambda)?;
                minimize!(self, objective, solver, weights_init)
            }
            Regularization::L2 => {
                let linesearch = MoreThuenteLineSearch::new().with_c(1e-4, 0.9)?;
                let solver = LBFGS::new(linesearch, 7).with_tolerance_cost(self.epsilon)?;
                minimize!(self, objective, solver, weights_init)
            }
        }
        .ok_or_else(|| HocrfError::optimization("the optimizer returned no parameter"))?;

        Ok(Self::extract_model(features, &weights))
    }

    fn extract_model(features: Vec<Feature>, weights: &[f64]) -> Model {
        let n_features = features.len();
        let features: Vec<Feature> = features
            .into_iter()
            .zip(weights)
            .filter_map(|(mut feature, &weight)| {
                let unconditional = feature.observation().is_empty() && feature.order() == 1;
                (weight != 0.0 || unconditional).then(|| {
                    feature.set_weight(weight);
                    feature
                })
            })
            .collect();
        log::info!("number of active features: {} / {n_features}", features.len());
        Model::new(features)
    }
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new()
    }
}
