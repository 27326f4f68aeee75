//! Error types for rust_autonomy

use std::fmt;

/// Main error type for estimation and control routines
#[derive(Debug, Clone)]
pub enum EstimationError {
    /// Malformed input (bad shape, empty data, invalid option)
    InvalidParameter(String),
    /// NaN or infinity in an input or an intermediate result
    NonFinite(String),
    /// Measurement refers to a landmark id missing from the table
    UnknownLandmark { step: usize, id: usize },
    /// State covariance lost positive semi-definiteness
    CovarianceNotPsd { step: usize, min_eigenvalue: f64 },
    /// Step timestamps must be monotone non-decreasing
    OutOfOrderTimestamp { step: usize, previous: f64, current: f64 },
    /// Numerical computation failed (singular system, rank deficiency, etc.)
    NumericalError(String),
}

impl fmt::Display for EstimationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimationError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            EstimationError::NonFinite(msg) => write!(f, "Non-finite value: {}", msg),
            EstimationError::UnknownLandmark { step, id } => {
                write!(f, "Unknown landmark id {} at step {}", id, step)
            }
            EstimationError::CovarianceNotPsd { step, min_eigenvalue } => {
                write!(
                    f,
                    "Covariance not positive semi-definite at step {} (min eigenvalue {:e})",
                    step, min_eigenvalue
                )
            }
            EstimationError::OutOfOrderTimestamp { step, previous, current } => {
                write!(
                    f,
                    "Out-of-order timestamp at step {}: {} after {}",
                    step, current, previous
                )
            }
            EstimationError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
        }
    }
}

impl std::error::Error for EstimationError {}

/// Result type alias for estimation operations
pub type EstimationResult<T> = Result<T, EstimationError>;
