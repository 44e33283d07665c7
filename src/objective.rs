use std::sync::Mutex;

use alloc::vec::Vec;

use argmin::core::{CostFunction, Gradient};
use argmin_math::{ArgminDot, ArgminScaledSub};

use crate::errors::{HocrfError, Result};
use crate::lattice::PatternSetSequence;
use crate::scheduler::{self, Schedulable, TaskQueue};

/// Log-likelihood and feature expectations accumulated over some sequences.
#[derive(Clone, Debug)]
pub struct LogLikelihood {
    /// Sum of the log-likelihoods.
    pub log_likelihood: f64,

    /// Empirical counts minus model expectations, indexed by feature IDs.
    pub expectations: Vec<f64>,
}

impl LogLikelihood {
    fn new(dimension: usize) -> Self {
        Self {
            log_likelihood: 0.0,
            expectations: vec![0.0; dimension],
        }
    }
}

struct LogLikelihoodComputer<'a> {
    lattices: &'a [Mutex<PatternSetSequence>],
    exp_weights: &'a [f64],
    queue: TaskQueue,
    result: Mutex<LogLikelihood>,
}

impl Schedulable for LogLikelihoodComputer<'_> {
    type Partial = LogLikelihood;

    fn task_count(&self) -> usize {
        self.lattices.len()
    }

    fn next_task_id(&self) -> Option<usize> {
        self.queue.next()
    }

    fn new_partial(&self) -> Self::Partial {
        LogLikelihood::new(self.exp_weights.len())
    }

    fn run_task(&self, task_id: usize, partial: &mut Self::Partial) -> Result<()> {
        let mut lattice = self.lattices[task_id]
            .lock()
            .map_err(|_| HocrfError::scheduler("lattice lock is poisoned"))?;
        partial.log_likelihood +=
            lattice.accumulate_feature_expectation(self.exp_weights, &mut partial.expectations);
        Ok(())
    }

    fn merge_result(&self, partial: Self::Partial) -> Result<()> {
        let mut result = self
            .result
            .lock()
            .map_err(|_| HocrfError::scheduler("result lock is poisoned"))?;
        result.log_likelihood += partial.log_likelihood;
        for (y, x) in result.expectations.iter_mut().zip(partial.expectations) {
            *y += x;
        }
        Ok(())
    }
}

struct Evaluation {
    weights: Vec<f64>,
    value: f64,
    gradient: Vec<f64>,
}

/// Negative mean log-likelihood of a corpus, minimized by the trainer.
pub struct LogLikelihoodFunction {
    lattices: Vec<Mutex<PatternSetSequence>>,
    feature_counts: Vec<f64>,
    n_threads: usize,
    l2_lambda: Option<f64>,
    cache: Mutex<Option<Evaluation>>,
}

impl LogLikelihoodFunction {
    /// Creates a new objective.
    ///
    /// # Arguments
    ///
    /// * `lattices` - Lattices of the training sequences.
    /// * `feature_counts` - Number of times each feature fires on the gold labels.
    /// * `n_threads` - Number of worker threads.
    /// * `l2_lambda` - Coefficient of the L2 penalty, if any.
    ///
    /// # Errors
    ///
    /// `lattices` must not be empty, `n_threads` must not be 0, and `l2_lambda` must be a
    /// non-negative number.
    pub fn new(
        lattices: Vec<PatternSetSequence>,
        feature_counts: Vec<f64>,
        n_threads: usize,
        l2_lambda: Option<f64>,
    ) -> Result<Self> {
        if lattices.is_empty() {
            return Err(HocrfError::invalid_argument("lattices", "must not be empty"));
        }
        if n_threads == 0 {
            return Err(HocrfError::invalid_argument("n_threads", "must not be 0"));
        }
        if l2_lambda.is_some_and(|lambda| !(lambda >= 0.0 && lambda.is_finite())) {
            return Err(HocrfError::invalid_argument(
                "l2_lambda",
                "must be a non-negative number",
            ));
        }
        Ok(Self {
            lattices: lattices.into_iter().map(Mutex::new).collect(),
            feature_counts,
            n_threads,
            l2_lambda,
            cache: Mutex::new(None),
        })
    }

    /// Returns the number of weights.
    #[inline(always)]
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.feature_counts.len()
    }

    /// Returns the objective value at the given weights.
    ///
    /// # Errors
    ///
    /// See [`LogLikelihoodFunction::gradient_at()`].
    pub fn value_at(&self, weights: &[f64]) -> Result<f64> {
        self.evaluate(weights, |e| e.value)
    }

    /// Returns the gradient of the objective at the given weights.
    ///
    /// # Errors
    ///
    /// [`HocrfError::InvalidArgument`] is returned if the length of `weights` differs from the
    /// dimension, and [`HocrfError::Scheduler`] if a worker fails.
    pub fn gradient_at(&self, weights: &[f64]) -> Result<Vec<f64>> {
        self.evaluate(weights, |e| e.gradient.clone())
    }

    fn evaluate<F, T>(&self, weights: &[f64], f: F) -> Result<T>
    where
        F: FnOnce(&Evaluation) -> T,
    {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| HocrfError::scheduler("cache lock is poisoned"))?;
        if let Some(evaluation) = cache.as_ref() {
            if evaluation.weights == weights {
                return Ok(f(evaluation));
            }
        }
        let evaluation = self.compute(weights)?;
        let result = f(&evaluation);
        *cache = Some(evaluation);
        Ok(result)
    }

    fn compute(&self, weights: &[f64]) -> Result<Evaluation> {
        if weights.len() != self.dimension() {
            return Err(HocrfError::invalid_argument(
                "weights",
                "must have the same length as the features",
            ));
        }
        let exp_weights: Vec<f64> = weights.iter().map(|w| w.exp()).collect();

        let (expectations, log_likelihood) = match self.l2_lambda {
            Some(lambda) => {
                let weights = weights.to_vec();
                let norm2: f64 = weights.dot(&weights);
                (
                    self.feature_counts.scaled_sub(&lambda, &weights),
                    -lambda * norm2 * 0.5,
                )
            }
            None => (self.feature_counts.clone(), 0.0),
        };

        let computer = LogLikelihoodComputer {
            lattices: &self.lattices,
            exp_weights: &exp_weights,
            queue: TaskQueue::new(self.lattices.len())?,
            result: Mutex::new(LogLikelihood {
                log_likelihood,
                expectations,
            }),
        };
        scheduler::run(&computer, self.n_threads)?;
        let result = computer
            .result
            .into_inner()
            .map_err(|_| HocrfError::scheduler("result lock is poisoned"))?;

        let n = self.lattices.len() as f64;
        let value = -result.log_likelihood / n;
        log::debug!("objective = {value}");
        Ok(Evaluation {
            weights: weights.to_vec(),
            value,
            gradient: result.expectations.into_iter().map(|e| -e / n).collect(),
        })
    }
}

impl CostFunction for LogLikelihoodFunction {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        Ok(self.value_at(param)?)
    }
}

impl Gradient for LogLikelihoodFunction {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, param: &Self::Param) -> Result<Self::Gradient, argmin::core::Error> {
        Ok(self.gradient_at(param)?)
    }
}
