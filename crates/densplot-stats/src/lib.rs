//! densplot-stats - Statistical core for density and distribution charts
//!
//! This crate provides the numeric building blocks behind the densplot charts:
//!
//! - **Descriptive**: mean, population variance, R-7 quantiles, IQR fences
//! - **Bivariate**: mean vector and population covariance of 2-D point sets
//! - **KDE**: kernel functions (Epanechnikov by default) and density curves
//! - **Region**: confidence rectangles and eigen-decomposed confidence ellipses
//! - **Box plots**: Tukey-fenced five-number summaries with outlier classification
//! - **Histogram / ticks**: threshold binning and "nice" evaluation grids
//!
//! # Design Philosophy
//!
//! Every function is pure: inputs are borrowed, results are freshly allocated,
//! and nothing is sorted or modified in place. Empty input and invalid
//! parameters are reported as [`StatsError`] instead of leaking NaN into the
//! renderer.

pub mod bivariate;
pub mod boxplot;
pub mod descriptive;
pub mod error;
pub mod histogram;
pub mod kde;
pub mod region;
pub mod summary;
pub mod ticks;

pub use bivariate::*;
pub use boxplot::*;
pub use descriptive::*;
pub use error::{Result, StatsError};
pub use histogram::*;
pub use kde::*;
pub use region::*;
pub use summary::*;
pub use ticks::*;
