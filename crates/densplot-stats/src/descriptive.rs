//! Descriptive statistics for one-dimensional samples
//!
//! All dispersion measures are **population** statistics (divisor `n`),
//! matching what the charts have always displayed. Quantiles use the R-7
//! linear interpolation rule.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StatsError};

/// Tukey fence multiplier applied to the IQR
pub const TUKEY_FENCE: f64 = 1.5;

fn check_sample(values: &[f64], statistic: &'static str) -> Result<()> {
    if values.is_empty() {
        return Err(StatsError::EmptyInput { statistic });
    }
    if !values.iter().all(|v| v.is_finite()) {
        return Err(StatsError::NonFiniteInput { statistic });
    }
    Ok(())
}

/// Arithmetic mean
///
/// Fails on an empty sample rather than returning 0, so that a chart never
/// anchors a region at the origin by accident.
pub fn mean(values: &[f64]) -> Result<f64> {
    check_sample(values, "mean")?;
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (divisor `n`)
pub fn variance(values: &[f64]) -> Result<f64> {
    check_sample(values, "variance")?;
    let m = values.iter().sum::<f64>() / values.len() as f64;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Ok(ss / values.len() as f64)
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> Result<f64> {
    variance(values).map(f64::sqrt)
}

/// Return an ascending copy of `values`
///
/// Uses a stable sort with a numeric total order; the input is left untouched.
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Linear-interpolation quantile (R-7) of an ascending slice
///
/// For `q` in `[0, 1]` the position is `q * (n - 1)`; the result interpolates
/// between the neighbours at the floor and ceiling of that position.
///
/// `sorted` must already be in ascending order (see [`sorted_copy`]).
pub fn quantile(sorted: &[f64], q: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&q) {
        return Err(StatsError::InvalidQuantile(q));
    }
    check_sample(sorted, "quantile")?;
    debug_assert!(
        sorted.windows(2).all(|w| w[0] <= w[1]),
        "quantile input must be sorted ascending"
    );

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let lower = sorted[lo];
    let upper = sorted[hi];
    Ok(lower + (upper - lower) * (pos - lo as f64))
}

/// Median of an ascending slice
pub fn median(sorted: &[f64]) -> Result<f64> {
    quantile(sorted, 0.5)
}

/// Smallest and largest value of a sample
pub fn extent(values: &[f64]) -> Result<(f64, f64)> {
    check_sample(values, "extent")?;
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok((lo, hi))
}

/// Quartiles and Tukey fences of a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IqrFences {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
}

impl IqrFences {
    /// Compute fences from an ascending slice
    pub fn from_sorted(sorted: &[f64]) -> Result<Self> {
        let q1 = quantile(sorted, 0.25)?;
        let q3 = quantile(sorted, 0.75)?;
        let iqr = q3 - q1;
        Ok(Self {
            q1,
            q3,
            iqr,
            lower_fence: q1 - TUKEY_FENCE * iqr,
            upper_fence: q3 + TUKEY_FENCE * iqr,
        })
    }

    /// Whether `value` falls strictly outside the fences
    pub fn is_outside(&self, value: f64) -> bool {
        value < self.lower_fence || value > self.upper_fence
    }
}

/// Quartiles and Tukey fences of an unsorted sample
pub fn iqr_fences(values: &[f64]) -> Result<IqrFences> {
    IqrFences::from_sorted(&sorted_copy(values))
}
