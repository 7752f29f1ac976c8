//! Density chart preparation
//!
//! Several series share one x-domain and one KDE evaluation grid so that
//! their curves can be overlaid directly. Optionally each series is also
//! binned into a histogram on a coarser threshold grid.

use densplot_stats::{
    histogram, kde, normal_curve, ticks, HistogramBin, KdeCurve, Kernel, SummaryStats,
};
use serde::{Deserialize, Serialize};

use crate::config::DensityConfig;
use crate::dataset::{clean_series, series_labels, Dataset};
use crate::error::{DatasetError, Result};

/// One prepared density series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensitySeries {
    pub label: String,
    /// `None` for a series without finite values
    pub summary: Option<SummaryStats>,
    pub curve: KdeCurve,
    pub histogram: Option<Vec<HistogramBin>>,
    /// Normal density with the series' mean and standard deviation
    pub normal_curve: Option<Vec<(f64, f64)>>,
}

/// Prepared density chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityChart {
    /// Shared x-domain
    pub domain: (f64, f64),
    /// KDE evaluation points shared by every curve
    pub grid: Vec<f64>,
    /// Histogram thresholds, when histograms were requested
    pub thresholds: Vec<f64>,
    pub series: Vec<DensitySeries>,
    /// Largest density across all curves, for the y-domain
    pub max_density: f64,
}

fn pooled_extent(series: &[Vec<f64>]) -> Option<(f64, f64)> {
    series.iter().flatten().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
    })
}

/// Prepare overlaid density curves for several series
///
/// A series with no finite values still yields a (zero) curve; the chart as a
/// whole needs at least one value unless a fixed domain is configured.
/// `config` is validated before anything is computed.
pub fn prepare_density(
    datasets: &[Dataset<f64>],
    labels: &[String],
    config: &DensityConfig,
) -> Result<DensityChart> {
    config.validate()?;
    let kernel = Kernel::new(config.kernel, config.bandwidth)?;
    let names = series_labels(labels, datasets.len());
    let samples: Vec<Vec<f64>> = datasets
        .iter()
        .zip(&names)
        .map(|(dataset, name)| clean_series(dataset, name))
        .collect();

    let domain = match config.domain {
        Some(domain) => domain,
        None => pooled_extent(&samples).ok_or(DatasetError::NoData)?,
    };
    let grid = ticks(domain.0, domain.1, config.grid_ticks);
    let thresholds = if config.histogram {
        ticks(domain.0, domain.1, config.histogram_ticks)
    } else {
        Vec::new()
    };

    let series = samples
        .iter()
        .zip(names)
        .map(|(sample, label)| -> Result<DensitySeries> {
            let histogram = if config.histogram {
                Some(histogram(sample, domain, &thresholds)?)
            } else {
                None
            };
            let summary = SummaryStats::from_data(sample).ok();
            let normal = match &summary {
                Some(stats) if config.normal_reference && stats.std_dev > 0.0 => {
                    Some(normal_curve(stats.mean, stats.std_dev, config.grid_ticks)?)
                }
                _ => None,
            };
            Ok(DensitySeries {
                curve: kde(&kernel, &grid, sample),
                histogram,
                normal_curve: normal,
                summary,
                label,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let max_density = series
        .iter()
        .map(|s| s.curve.max_density())
        .fold(0.0, f64::max);

    tracing::debug!(
        series = series.len(),
        grid = grid.len(),
        bandwidth = config.bandwidth,
        kernel = config.kernel.name(),
        "prepared density chart"
    );

    Ok(DensityChart {
        domain,
        grid,
        thresholds,
        series,
        max_density,
    })
}
