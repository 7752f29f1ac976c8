//! Error types for densplot-stats

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, StatsError>;

/// Errors raised by statistical computations
///
/// None of these are transient: the same input always fails the same way.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// A statistic was requested over an empty sequence
    #[error("Cannot compute {statistic} of an empty sample")]
    EmptyInput { statistic: &'static str },

    /// The input contained NaN or an infinity
    #[error("Cannot compute {statistic}: sample contains non-finite values")]
    NonFiniteInput { statistic: &'static str },

    /// Quantile probability outside [0, 1]
    #[error("Quantile {0} is outside [0, 1]")]
    InvalidQuantile(f64),

    /// Kernel bandwidth must be strictly positive and finite
    #[error("Bandwidth must be positive and finite, got {0}")]
    InvalidBandwidth(f64),

    /// Confidence level must lie in the open interval (0, 1)
    #[error("Confidence level must be in (0, 1), got {0}")]
    InvalidConfidenceLevel(f64),

    /// Standard-deviation multiplier must be non-negative and finite
    #[error("Standard deviation multiplier must be non-negative, got {0}")]
    InvalidMultiplier(f64),

    /// Covariance matrix is not symmetric positive semi-definite
    #[error("Invalid covariance matrix: {reason}")]
    InvalidCovariance { reason: String },

    /// A range with reversed or non-finite bounds
    #[error("Invalid domain [{start}, {stop}]")]
    InvalidDomain { start: f64, stop: f64 },

    /// Standard deviation of a reference curve must be positive
    #[error("Standard deviation must be positive, got {0}")]
    InvalidStdDev(f64),

    /// z-score outlier threshold must be positive and finite
    #[error("Outlier z-score threshold must be positive, got {0}")]
    InvalidOutlierThreshold(f64),
}
