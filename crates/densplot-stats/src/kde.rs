//! Kernel density estimation
//!
//! A density curve is built by averaging a kernel centred on each sample
//! point, evaluated at every point of a query grid. Evaluation is
//! O(|grid| x |sample|), which is fine for the hundreds-of-points datasets the
//! charts handle.
//!
//! The kernel shape is a [`KernelKind`] tag, so adding a new kernel only
//! touches [`Kernel::evaluate`].

use serde::{Deserialize, Serialize};

use crate::error::{Result, StatsError};

/// Bandwidths above this still work but flatten the curve to near uselessness
pub const RECOMMENDED_MAX_BANDWIDTH: f64 = 20.0;

const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Supported kernel shapes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelKind {
    /// Parabolic kernel with compact support `|u| <= h`
    #[default]
    Epanechnikov,
    /// Standard normal kernel, unbounded support
    Gaussian,
    /// Linear falloff with compact support `|u| <= h`
    Triangular,
}

impl KernelKind {
    pub fn name(&self) -> &'static str {
        match self {
            KernelKind::Epanechnikov => "epanechnikov",
            KernelKind::Gaussian => "gaussian",
            KernelKind::Triangular => "triangular",
        }
    }
}

/// A kernel shape with a validated bandwidth
///
/// Deserialization goes through [`Kernel::new`], so a stored kernel is
/// checked the same way as one built in code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawKernel")]
pub struct Kernel {
    kind: KernelKind,
    bandwidth: f64,
}

#[derive(Deserialize)]
struct RawKernel {
    #[serde(default)]
    kind: KernelKind,
    bandwidth: f64,
}

impl TryFrom<RawKernel> for Kernel {
    type Error = StatsError;

    fn try_from(raw: RawKernel) -> Result<Self> {
        Kernel::new(raw.kind, raw.bandwidth)
    }
}

impl Kernel {
    /// Create a kernel, rejecting non-positive or non-finite bandwidths
    pub fn new(kind: KernelKind, bandwidth: f64) -> Result<Self> {
        if !(bandwidth.is_finite() && bandwidth > 0.0) {
            return Err(StatsError::InvalidBandwidth(bandwidth));
        }
        if bandwidth > RECOMMENDED_MAX_BANDWIDTH {
            tracing::warn!(
                bandwidth,
                max = RECOMMENDED_MAX_BANDWIDTH,
                "KDE bandwidth above recommended maximum; curve will be heavily smoothed"
            );
        }
        Ok(Self { kind, bandwidth })
    }

    /// Epanechnikov kernel: `0.75 * (1 - (u/h)^2) / h` for `|u/h| <= 1`, else 0
    pub fn epanechnikov(bandwidth: f64) -> Result<Self> {
        Self::new(KernelKind::Epanechnikov, bandwidth)
    }

    pub fn kind(&self) -> KernelKind {
        self.kind
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Peak value of the kernel, reached at `u = 0`
    pub fn peak(&self) -> f64 {
        self.evaluate(0.0)
    }

    /// Evaluate the kernel at offset `u`
    pub fn evaluate(&self, u: f64) -> f64 {
        let h = self.bandwidth;
        let t = u / h;
        match self.kind {
            KernelKind::Epanechnikov => {
                if t.abs() <= 1.0 {
                    0.75 * (1.0 - t * t) / h
                } else {
                    0.0
                }
            }
            KernelKind::Gaussian => FRAC_1_SQRT_2PI * (-0.5 * t * t).exp() / h,
            KernelKind::Triangular => {
                if t.abs() <= 1.0 {
                    (1.0 - t.abs()) / h
                } else {
                    0.0
                }
            }
        }
    }
}

/// Density estimate sampled on a grid of query points
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KdeCurve {
    /// `(x, density)` pairs in query order
    pub points: Vec<(f64, f64)>,
}

impl KdeCurve {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Largest density on the curve, 0 for an empty curve
    pub fn max_density(&self) -> f64 {
        self.points.iter().map(|&(_, d)| d).fold(0.0, f64::max)
    }

    /// Piecewise-linear lookup of the density at `x`
    ///
    /// Assumes the query grid was ascending. Outside the grid the nearest
    /// end value is returned; `None` for an empty curve.
    pub fn interpolate(&self, x: f64) -> Option<f64> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        if x <= first.0 {
            return Some(first.1);
        }
        if x >= last.0 {
            return Some(last.1);
        }

        let idx = self.points.partition_point(|&(px, _)| px <= x);
        let (x0, y0) = self.points[idx - 1];
        let (x1, y1) = self.points[idx];
        if x1 == x0 {
            return Some(y0);
        }
        Some(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
    }

    /// Approximate area under the curve (trapezoid rule)
    pub fn area(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
            .sum()
    }
}

/// Kernel density estimator over a fixed sample
#[derive(Debug, Clone)]
pub struct KernelDensityEstimator {
    kernel: Kernel,
    sample: Vec<f64>,
}

impl KernelDensityEstimator {
    /// Build an estimator; non-finite sample values are treated as missing
    pub fn new(kernel: Kernel, sample: &[f64]) -> Self {
        let finite: Vec<f64> = sample.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.len() != sample.len() {
            tracing::debug!(
                dropped = sample.len() - finite.len(),
                "ignoring non-finite values in KDE sample"
            );
        }
        Self {
            kernel,
            sample: finite,
        }
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn sample_len(&self) -> usize {
        self.sample.len()
    }

    /// Mean kernel contribution at `x`; 0 when the sample is empty
    pub fn density_at(&self, x: f64) -> f64 {
        if self.sample.is_empty() {
            return 0.0;
        }
        let total: f64 = self.sample.iter().map(|s| self.kernel.evaluate(x - s)).sum();
        total / self.sample.len() as f64
    }

    /// Evaluate the density at every query point
    pub fn curve(&self, query_points: &[f64]) -> KdeCurve {
        if self.sample.is_empty() {
            tracing::warn!("empty KDE sample; density curve is zero everywhere");
        }
        KdeCurve {
            points: query_points
                .iter()
                .map(|&x| (x, self.density_at(x)))
                .collect(),
        }
    }
}

/// Evaluate a kernel density estimate of `sample` at each query point
///
/// An empty sample means "no distribution" and yields zero density.
pub fn kde(kernel: &Kernel, query_points: &[f64], sample: &[f64]) -> KdeCurve {
    KernelDensityEstimator::new(*kernel, sample).curve(query_points)
}
