//! Error types for densplot-core
//!
//! Provides error handling for:
//! - Statistical failures (empty input, invalid parameters)
//! - Dataset shape problems
//! - Configuration loading and validation

use densplot_stats::StatsError;
use thiserror::Error;

/// Result alias for chart preparation
pub type Result<T> = std::result::Result<T, DensplotError>;

/// Main error type for densplot operations
#[derive(Error, Debug)]
pub enum DensplotError {
    /// Statistical computation failed
    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),

    /// Dataset shape errors
    #[error("Invalid dataset: {0}")]
    Dataset(#[from] DatasetError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// TOML parsing errors
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("Failed to serialize TOML configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors related to dataset shape
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    /// Labels must be absent or one per value
    #[error("Label count mismatch: {values} values but {labels} labels")]
    LabelMismatch { values: usize, labels: usize },

    /// A series has no usable values
    #[error("Series '{label}' has no finite values")]
    EmptySeries { label: String },

    /// A box-plot category has no usable values
    #[error("Category '{category}' in group '{group}' has no finite values")]
    EmptyCategory { group: String, category: String },

    /// No values at all across a chart
    #[error("Chart has no data points")]
    NoData,
}
