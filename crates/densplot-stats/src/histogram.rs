//! Threshold-based histogram binning
//!
//! A domain `[lo, hi]` is split at every threshold strictly inside it,
//! producing bins `[lo, t0), [t0, t1), ..., [tn, hi]`. The last bin is closed
//! so that the domain maximum is counted.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StatsError};

/// A single histogram bin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    /// Inclusive lower edge
    pub x0: f64,
    /// Upper edge (exclusive except for the last bin)
    pub x1: f64,
    /// Number of values in the bin
    pub count: usize,
}

impl HistogramBin {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Count scaled to a probability density, comparable to a KDE curve
    ///
    /// `total` is the number of binned values; zero-width bins and an empty
    /// histogram report 0.
    pub fn density(&self, total: usize) -> f64 {
        let width = self.width();
        if total == 0 || width <= 0.0 {
            return 0.0;
        }
        self.count as f64 / (total as f64 * width)
    }
}

/// Bin `values` over `domain` at the given thresholds
///
/// Values outside the domain and non-finite values are skipped. Thresholds
/// need not be sorted; those outside the open domain are ignored.
pub fn histogram(values: &[f64], domain: (f64, f64), thresholds: &[f64]) -> Result<Vec<HistogramBin>> {
    let (lo, hi) = domain;
    if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
        return Err(StatsError::InvalidDomain { start: lo, stop: hi });
    }

    let mut cuts: Vec<f64> = thresholds
        .iter()
        .copied()
        .filter(|&t| t > lo && t < hi)
        .collect();
    cuts.sort_by(f64::total_cmp);
    cuts.dedup();

    let mut edges = Vec::with_capacity(cuts.len() + 2);
    edges.push(lo);
    edges.extend(cuts);
    edges.push(hi);

    let mut bins: Vec<HistogramBin> = edges
        .windows(2)
        .map(|w| HistogramBin {
            x0: w[0],
            x1: w[1],
            count: 0,
        })
        .collect();

    for &v in values {
        if !v.is_finite() || v < lo || v > hi {
            continue;
        }
        // Index of the first edge strictly greater than v, minus the lower edge
        let idx = edges[1..edges.len() - 1].partition_point(|&e| e <= v);
        bins[idx].count += 1;
    }

    Ok(bins)
}

/// Total number of values across bins
pub fn total_count(bins: &[HistogramBin]) -> usize {
    bins.iter().map(|b| b.count).sum()
}

/// Per-bin proportion of the total count
pub fn normalize_counts(bins: &[HistogramBin]) -> Vec<f64> {
    let total = total_count(bins);
    if total == 0 {
        return vec![0.0; bins.len()];
    }
    bins.iter().map(|b| b.count as f64 / total as f64).collect()
}
