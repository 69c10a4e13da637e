use lin_reg::LinRegError;
use thiserror::Error;

/// Result type used throughout the reservoir crates
pub type Result<T> = std::result::Result<T, RcError>;

/// Everything that can go wrong while building or driving a simulation.
/// None of these are retried internally, they are surfaced to the driver.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RcError {
    /// A construction parameter is outside of its admissible range
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter
        name: &'static str,
        /// What the parameter has to satisfy
        reason: String,
    },

    /// Shapes of two operands disagree, reported as (rows, cols)
    #[error("dimension mismatch in {context}: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// The operation that was attempted
        context: &'static str,
        /// Required shape
        expected: (usize, usize),
        /// Offered shape
        actual: (usize, usize),
    },

    /// A replayed series was queried away from its internal clock
    #[error("replay queried at t = {query}, but its clock is at t = {clock} (allowed window: {window})")]
    ReplayDesync {
        /// The time the caller asked for
        query: f64,
        /// The time of the current frame
        clock: f64,
        /// Largest admissible distance between the two
        window: f64,
    },

    /// A replayed series has no frames left
    #[error("replay exhausted at frame {frame} of {n_frames}")]
    ReplayExhausted {
        /// The frame that was requested
        frame: usize,
        /// Number of frames in the series
        n_frames: usize,
    },

    /// Random access past the end of a time series
    #[error("index {index} is out of bounds for a time series of length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Number of stored time points
        len: usize,
    },

    /// A batch operation needs at least one stored sample
    #[error("no samples have been stored")]
    EmptyTimeSeries,

    /// The linear regression backend failed
    #[error(transparent)]
    Regression(#[from] LinRegError),
}

impl RcError {
    /// Shorthand for a `DimensionMismatch`
    #[inline]
    pub fn dims(context: &'static str, expected: (usize, usize), actual: (usize, usize)) -> Self {
        RcError::DimensionMismatch {
            context,
            expected,
            actual,
        }
    }

    /// Shorthand for an `InvalidParameter`
    #[inline]
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        RcError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
