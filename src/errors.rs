//! Definition of errors.

use core::fmt;

use alloc::string::String;

#[cfg(feature = "std")]
use std::error::Error;

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

#[cfg(feature = "std")]
impl Error for InvalidArgumentError {}

/// Error used when a parallel evaluation could not be completed.
#[derive(Debug)]
pub struct SchedulerError {
    /// Error message.
    pub(crate) msg: &'static str,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SchedulerError: {}", self.msg)
    }
}

#[cfg(feature = "std")]
impl Error for SchedulerError {}

/// Error used when the optimizer fails.
#[derive(Debug)]
pub struct OptimizationError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for OptimizationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "OptimizationError: {}", self.msg)
    }
}

#[cfg(feature = "std")]
impl Error for OptimizationError {}

/// The error type for Hocrf.
#[derive(Debug)]
pub enum HocrfError {
    /// The error variant for [`InvalidArgumentError`].
    InvalidArgument(InvalidArgumentError),

    /// The error variant for [`SchedulerError`].
    Scheduler(SchedulerError),

    /// The error variant for [`OptimizationError`].
    Optimization(OptimizationError),
}

impl HocrfError {
    /// Creates a new [`InvalidArgumentError`].
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// Creates a new [`SchedulerError`].
    #[cfg(feature = "train")]
    pub(crate) const fn scheduler(msg: &'static str) -> Self {
        Self::Scheduler(SchedulerError { msg })
    }

    /// Creates a new [`OptimizationError`].
    #[cfg(feature = "train")]
    pub(crate) fn optimization<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::Optimization(OptimizationError { msg: msg.into() })
    }
}

impl fmt::Display for HocrfError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidArgument(e) => e.fmt(f),
            Self::Scheduler(e) => e.fmt(f),
            Self::Optimization(e) => e.fmt(f),
        }
    }
}

#[cfg(feature = "std")]
impl Error for HocrfError {}

#[cfg(feature = "train")]
impl From<argmin::core::Error> for HocrfError {
    fn from(e: argmin::core::Error) -> Self {
        Self::optimization(e.to_string())
    }
}

/// A specialized Result type.
pub type Result<T, E = HocrfError> = core::result::Result<T, E>;
