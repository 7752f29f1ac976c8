//! densplot-core - Chart preparation for statistical plots
//!
//! This crate turns raw grouped samples into the plain numeric payloads a
//! renderer needs to draw each densplot chart. It never touches scales, DOM
//! or pixels; everything it returns is data coordinates.
//!
//! # Key Components
//!
//! - **Dataset**: values with optional per-value labels, series naming
//! - **Config**: [`ChartConfig`] loaded from TOML or JSON, validated up front
//! - **Scatter**: per-series mean, covariance and confidence regions
//! - **Density**: KDE curves (and optional histograms) on a shared grid
//! - **Box plot**: per-category Tukey summaries, group means, pooled intervals
//! - **Detection**: dose-response curves with interpolated prediction limits
//! - **Sampling**: seeded normal samples for demos and tests
//!
//! Every `prepare_*` function recomputes from its inputs; callers that want to
//! skip redundant work can compare inputs before calling.

pub mod boxplot;
pub mod config;
pub mod dataset;
pub mod density;
pub mod detection;
pub mod error;
pub mod sampling;
pub mod scatter;

pub use boxplot::*;
pub use config::*;
pub use dataset::*;
pub use density::*;
pub use detection::*;
pub use error::{DatasetError, DensplotError, Result};
pub use sampling::*;
pub use scatter::*;

pub use densplot_stats as stats;
