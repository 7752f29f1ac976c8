//! Summary statistics for datasets
//!
//! Provides:
//! - Per-dataset summaries that tolerate missing (non-finite) values
//! - Pooled statistics across grouped data (overall mean, between-group
//!   spread, z-interval, tolerance interval)
//! - A reference normal density curve

use serde::{Deserialize, Serialize};

use crate::descriptive::{self, IqrFences};
use crate::error::{Result, StatsError};

/// z value for a two-sided 95% normal interval
pub const Z_95: f64 = 1.96;

/// Summary statistics for a numeric dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Number of finite values
    pub count: usize,
    /// Number of missing/NaN values
    pub missing: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population variance
    pub variance: f64,
    pub std_dev: f64,
    pub median: f64,
    /// Median Absolute Deviation
    pub mad: f64,
}

impl SummaryStats {
    /// Compute summary statistics, skipping non-finite entries
    ///
    /// Fails only when no finite value remains.
    pub fn from_data(data: &[f64]) -> Result<Self> {
        let finite: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
        let missing = data.len() - finite.len();
        if missing > 0 {
            tracing::debug!(missing, "skipping non-finite values in summary");
        }

        let sorted = descriptive::sorted_copy(&finite);
        let median = descriptive::median(&sorted)?;
        let mean = descriptive::mean(&sorted)?;
        let variance = descriptive::variance(&sorted)?;

        let deviations: Vec<f64> = sorted.iter().map(|x| (x - median).abs()).collect();
        let mad = descriptive::median(&descriptive::sorted_copy(&deviations))?;

        Ok(Self {
            count: sorted.len(),
            missing,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean,
            variance,
            std_dev: variance.sqrt(),
            median,
            mad,
        })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Standard score of `x`; 0 when the sample has no spread
    pub fn zscore(&self, x: f64) -> f64 {
        if self.std_dev == 0.0 {
            return 0.0;
        }
        (x - self.mean) / self.std_dev
    }

    /// Robust z-score using median and MAD
    ///
    /// Uses `(x - median) / (1.4826 * MAD)`; the constant makes it comparable
    /// to the standard z-score for normal data.
    pub fn robust_zscore(&self, x: f64) -> f64 {
        if self.mad == 0.0 {
            return 0.0;
        }
        (x - self.median) / (1.4826 * self.mad)
    }
}

/// Pooled statistics across grouped samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub overall_mean: f64,
    /// Population std dev of all values pooled together
    pub std_dev_across: f64,
    /// Population std dev of the group means around the overall mean
    pub std_dev_between: f64,
    /// `overall_mean -/+ z * std_dev_across`
    pub confidence_interval: (f64, f64),
    /// Smallest and largest pooled value
    pub tolerance_interval: (f64, f64),
    /// Tukey outliers among the pooled values
    pub outlier_count: usize,
}

impl OverallStats {
    /// Pool `groups` and compute interval statistics with multiplier `z`
    ///
    /// Empty groups contribute nothing; all groups empty is an error.
    pub fn from_groups<G: AsRef<[f64]>>(groups: &[G], z: f64) -> Result<Self> {
        let all: Vec<f64> = groups
            .iter()
            .flat_map(|g| g.as_ref().iter().copied())
            .collect();
        let overall_mean = descriptive::mean(&all)?;
        let std_dev_across = descriptive::std_dev(&all)?;

        let group_means: Vec<f64> = groups
            .iter()
            .filter(|g| !g.as_ref().is_empty())
            .map(|g| descriptive::mean(g.as_ref()))
            .collect::<Result<_>>()?;
        let between_var = group_means
            .iter()
            .map(|m| (m - overall_mean).powi(2))
            .sum::<f64>()
            / group_means.len() as f64;

        let sorted = descriptive::sorted_copy(&all);
        let fences = IqrFences::from_sorted(&sorted)?;
        let outlier_count = sorted.iter().filter(|&&v| fences.is_outside(v)).count();

        Ok(Self {
            overall_mean,
            std_dev_across,
            std_dev_between: between_var.sqrt(),
            confidence_interval: (
                overall_mean - z * std_dev_across,
                overall_mean + z * std_dev_across,
            ),
            tolerance_interval: (sorted[0], sorted[sorted.len() - 1]),
            outlier_count,
        })
    }
}

/// Normal probability density at `x`
pub fn normal_pdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    let variance = std_dev * std_dev;
    (-(x - mean).powi(2) / (2.0 * variance)).exp() / (2.0 * std::f64::consts::PI * variance).sqrt()
}

/// `count` points of the normal density spread evenly over `mean -/+ std_dev`
///
/// Point `i` sits at `mean + (i - count/2) * std_dev / (count/2)`.
pub fn normal_curve(mean: f64, std_dev: f64, count: usize) -> Result<Vec<(f64, f64)>> {
    if !(std_dev.is_finite() && std_dev > 0.0) {
        return Err(StatsError::InvalidStdDev(std_dev));
    }
    let half = count as f64 / 2.0;
    Ok((0..count)
        .map(|i| {
            let x = mean + (i as f64 - half) * std_dev / half;
            (x, normal_pdf(x, mean, std_dev))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_stats_basic() {
        let data: Vec<f64> = (1..=10).map(f64::from).collect();
        let stats = SummaryStats::from_data(&data).unwrap();

        assert_eq!(stats.count, 10);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 10.0);
        assert!((stats.mean - 5.5).abs() < 1e-10);
        assert!((stats.median - 5.5).abs() < 1e-10);
        assert_eq!(stats.range(), 9.0);
    }

    #[test]
    fn test_summary_stats_with_nan() {
        let data = vec![1.0, 2.0, f64::NAN, 4.0, 5.0];
        let stats = SummaryStats::from_data(&data).unwrap();

        assert_eq!(stats.count, 4);
        assert_eq!(stats.missing, 1);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
    }

    #[test]
    fn test_summary_all_missing() {
        assert!(SummaryStats::from_data(&[f64::NAN]).is_err());
    }

    #[test]
    fn test_zscores() {
        let stats = SummaryStats::from_data(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(stats.zscore(3.0).abs() < 1e-10);

        let skewed = SummaryStats::from_data(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert!(skewed.robust_zscore(100.0) > 3.0);
    }

    #[test]
    fn test_overall_stats() {
        let groups = vec![vec![1.0, 2.0, 3.0], vec![5.0, 6.0, 7.0]];
        let stats = OverallStats::from_groups(&groups, Z_95).unwrap();

        assert!((stats.overall_mean - 4.0).abs() < 1e-12);
        // Group means 2 and 6 sit 2 away from the overall mean
        assert!((stats.std_dev_between - 2.0).abs() < 1e-12);
        let sd = (28.0_f64 / 6.0).sqrt();
        assert!((stats.std_dev_across - sd).abs() < 1e-12);
        assert!((stats.confidence_interval.0 - (4.0 - 1.96 * sd)).abs() < 1e-12);
        assert_eq!(stats.tolerance_interval, (1.0, 7.0));
        assert_eq!(stats.outlier_count, 0);
    }

    #[test]
    fn test_overall_stats_counts_outliers_and_skips_empty_groups() {
        let groups: Vec<Vec<f64>> = vec![vec![], vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0]];
        let stats = OverallStats::from_groups(&groups, Z_95).unwrap();
        assert_eq!(stats.outlier_count, 1);
        assert_eq!(stats.std_dev_between, 0.0);

        let empty: Vec<Vec<f64>> = vec![vec![]];
        assert!(OverallStats::from_groups(&empty, Z_95).is_err());
    }

    #[test]
    fn test_normal_curve() {
        let curve = normal_curve(0.0, 1.0, 4).unwrap();
        let xs: Vec<f64> = curve.iter().map(|p| p.0).collect();
        assert_eq!(xs, vec![-1.0, -0.5, 0.0, 0.5]);
        assert!((curve[2].1 - 0.3989422804014327).abs() < 1e-12);
        assert!(normal_curve(0.0, 0.0, 4).is_err());
        assert!(normal_curve(0.0, 1.0, 0).unwrap().is_empty());
    }
}
