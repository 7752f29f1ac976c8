//! Scatter chart preparation
//!
//! Each point series gets its centroid, covariance, and the confidence
//! regions selected by [`RegionConfig`]: a single ellipse, or one nested
//! rectangle per multiplier.

use densplot_stats::{
    confidence_ellipse, confidence_rectangles, mean_and_covariance, ConfidenceRegion,
    CovarianceMatrix, MeanVector, Point2D,
};
use serde::{Deserialize, Serialize};

use crate::config::{RegionConfig, RegionShapeKind};
use crate::dataset::{clean_series, series_labels, Dataset};
use crate::error::{DatasetError, Result};

/// Bounding box of all plotted points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent2D {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Extent2D {
    fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2D>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Extent2D {
                    min_x: p.x,
                    max_x: p.x,
                    min_y: p.y,
                    max_y: p.y,
                },
                Some(e) => Extent2D {
                    min_x: e.min_x.min(p.x),
                    max_x: e.max_x.max(p.x),
                    min_y: e.min_y.min(p.y),
                    max_y: e.max_y.max(p.y),
                },
            })
        })
    }
}

/// One prepared point series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterSeries {
    pub label: String,
    pub points: Vec<Point2D>,
    pub mean: MeanVector,
    pub covariance: CovarianceMatrix,
    /// A single ellipse, or one rectangle per configured multiplier
    pub regions: Vec<ConfidenceRegion>,
}

/// Prepared scatter chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterChart {
    pub series: Vec<ScatterSeries>,
    pub extent: Extent2D,
}

/// Compute regions for one series
pub fn prepare_scatter_series(
    label: &str,
    dataset: &Dataset<Point2D>,
    config: &RegionConfig,
) -> Result<ScatterSeries> {
    config.validate()?;
    let points = clean_series(dataset, label);
    if points.is_empty() {
        return Err(DatasetError::EmptySeries {
            label: label.to_string(),
        }
        .into());
    }

    let (mean, covariance) = mean_and_covariance(&points)?;
    let regions = match config.shape {
        RegionShapeKind::Ellipse => vec![ConfidenceRegion::Ellipse(confidence_ellipse(
            &mean,
            &covariance,
            config.confidence_level,
        )?)],
        RegionShapeKind::Rectangle => {
            confidence_rectangles(&mean, &covariance, &config.rectangle_multipliers)?
                .into_iter()
                .map(ConfidenceRegion::Rectangle)
                .collect()
        }
    };

    Ok(ScatterSeries {
        label: label.to_string(),
        points,
        mean,
        covariance,
        regions,
    })
}

/// Prepare every series of a scatter chart
///
/// `labels` names the series (see [`series_labels`]). A series with no finite
/// points is an error rather than a region drawn at the origin.
pub fn prepare_scatter(
    datasets: &[Dataset<Point2D>],
    labels: &[String],
    config: &RegionConfig,
) -> Result<ScatterChart> {
    config.validate()?;
    let names = series_labels(labels, datasets.len());
    let series = datasets
        .iter()
        .zip(&names)
        .map(|(dataset, name)| prepare_scatter_series(name, dataset, config))
        .collect::<Result<Vec<_>>>()?;

    let extent = Extent2D::from_points(series.iter().flat_map(|s| s.points.iter()))
        .ok_or(DatasetError::NoData)?;

    tracing::debug!(
        series = series.len(),
        shape = ?config.shape,
        "prepared scatter chart"
    );

    Ok(ScatterChart { series, extent })
}
