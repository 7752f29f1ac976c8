//! Box-plot statistics
//!
//! Quartiles use the R-7 rule from [`crate::descriptive`]. Whiskers follow
//! Tukey: they reach the most extreme observations still inside the
//! `1.5 x IQR` fences, and never retract inside the box.
//!
//! Outliers are classified by an explicit [`OutlierRule`]. The default is
//! Tukey fencing; a z-score band is available for charts that want to flag
//! points by distance from the mean instead.

use serde::{Deserialize, Serialize};

use crate::descriptive::{self, IqrFences};
use crate::error::{Result, StatsError};

/// Default z threshold for [`OutlierRule::ZScore`]
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// How outliers are classified
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum OutlierRule {
    /// Outside `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`
    #[default]
    Tukey,
    /// Further than `threshold` population standard deviations from the mean
    ZScore { threshold: f64 },
}

impl OutlierRule {
    /// Reject a z-score threshold that is not positive and finite
    pub fn validate(&self) -> Result<()> {
        match *self {
            OutlierRule::Tukey => Ok(()),
            OutlierRule::ZScore { threshold } if threshold.is_finite() && threshold > 0.0 => Ok(()),
            OutlierRule::ZScore { threshold } => {
                Err(StatsError::InvalidOutlierThreshold(threshold))
            }
        }
    }
}

/// Five-number summary plus dispersion and outliers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlotStats {
    /// Lower whisker end
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Upper whisker end
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Outlying values in ascending order
    pub outliers: Vec<f64>,
}

impl BoxPlotStats {
    /// Compute statistics with Tukey outlier classification
    pub fn from_data(values: &[f64]) -> Result<Self> {
        Self::with_rule(values, OutlierRule::Tukey)
    }

    /// Compute statistics with an explicit outlier rule
    ///
    /// `values` is not modified; sorting happens on a copy.
    pub fn with_rule(values: &[f64], rule: OutlierRule) -> Result<Self> {
        rule.validate()?;
        let sorted = descriptive::sorted_copy(values);
        let fences = IqrFences::from_sorted(&sorted)?;
        let median = descriptive::median(&sorted)?;
        let mean = descriptive::mean(&sorted)?;
        let std_dev = descriptive::std_dev(&sorted)?;

        let lowest_inside = sorted
            .iter()
            .copied()
            .find(|&v| v >= fences.lower_fence)
            .unwrap_or(fences.q1);
        let highest_inside = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= fences.upper_fence)
            .unwrap_or(fences.q3);

        let is_outlier = |v: f64| match rule {
            OutlierRule::Tukey => fences.is_outside(v),
            OutlierRule::ZScore { threshold } => {
                std_dev > 0.0 && ((v - mean) / std_dev).abs() > threshold
            }
        };
        let outliers = sorted.iter().copied().filter(|&v| is_outlier(v)).collect();

        Ok(Self {
            min: lowest_inside.min(fences.q1),
            q1: fences.q1,
            median,
            q3: fences.q3,
            max: highest_inside.max(fences.q3),
            mean,
            std_dev,
            outliers,
        })
    }

    /// Interquartile range
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Whether `value` is one of the computed outliers
    pub fn is_outlier(&self, value: f64) -> bool {
        self.outliers.contains(&value)
    }

    /// Outlier flag for each value, in the order given
    pub fn outlier_flags(&self, values: &[f64]) -> Vec<bool> {
        values.iter().map(|&v| self.is_outlier(v)).collect()
    }

    /// Box extent shrunk by one standard deviation from each whisker end
    ///
    /// Returns `(min + std_dev, max - std_dev)`. When the whisker span is
    /// narrower than two standard deviations the two ends would cross, so
    /// both collapse to their midpoint.
    pub fn std_dev_trimmed(&self) -> (f64, f64) {
        let lower = self.min + self.std_dev;
        let upper = self.max - self.std_dev;
        if lower <= upper {
            (lower, upper)
        } else {
            let mid = (lower + upper) / 2.0;
            (mid, mid)
        }
    }
}

/// Box-plot statistics with Tukey outlier classification
pub fn calculate_box_plot_stats(values: &[f64]) -> Result<BoxPlotStats> {
    BoxPlotStats::from_data(values)
}

/// Whether `value` is a Tukey outlier of `all_values`
pub fn is_outlier(value: f64, all_values: &[f64]) -> Result<bool> {
    Ok(BoxPlotStats::from_data(all_values)?.is_outlier(value))
}
