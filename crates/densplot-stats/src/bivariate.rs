//! Mean vector and covariance of bivariate samples

use serde::{Deserialize, Serialize};

use crate::error::{Result, StatsError};

/// A single bivariate observation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point2D> for (f64, f64) {
    fn from(p: Point2D) -> Self {
        (p.x, p.y)
    }
}

/// Centroid of a point set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanVector {
    pub x: f64,
    pub y: f64,
}

impl MeanVector {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 2x2 covariance matrix `[[a, b], [c, d]]`
///
/// `a = Var(X)`, `d = Var(Y)` and `b = c = Cov(X, Y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CovarianceMatrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl CovarianceMatrix {
    /// Build a symmetric matrix from its three distinct entries
    pub fn symmetric(var_x: f64, cov_xy: f64, var_y: f64) -> Self {
        Self {
            a: var_x,
            b: cov_xy,
            c: cov_xy,
            d: var_y,
        }
    }

    /// Zero matrix (a single observation)
    pub fn zero() -> Self {
        Self::symmetric(0.0, 0.0, 0.0)
    }

    /// Validate a caller-supplied matrix
    ///
    /// Requires finite entries, `b == c`, non-negative diagonal and
    /// `a * d >= b^2`, each up to a small relative tolerance for rounding.
    pub fn validate(&self) -> Result<()> {
        let entries = [self.a, self.b, self.c, self.d];
        if !entries.iter().all(|v| v.is_finite()) {
            return Err(StatsError::InvalidCovariance {
                reason: "entries must be finite".to_string(),
            });
        }

        let scale = entries.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let tol = 1e-9 * scale.max(f64::MIN_POSITIVE);

        if (self.b - self.c).abs() > tol {
            return Err(StatsError::InvalidCovariance {
                reason: format!("matrix is not symmetric (b = {}, c = {})", self.b, self.c),
            });
        }
        if self.a < -tol || self.d < -tol {
            return Err(StatsError::InvalidCovariance {
                reason: "variances must be non-negative".to_string(),
            });
        }
        if self.a * self.d - self.b * self.c < -tol * scale {
            return Err(StatsError::InvalidCovariance {
                reason: "matrix is not positive semi-definite".to_string(),
            });
        }
        Ok(())
    }

    /// Sum of the diagonal
    pub fn trace(&self) -> f64 {
        self.a + self.d
    }

    /// Determinant `a*d - b*c`
    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Pearson correlation, `None` when either variance is zero
    pub fn correlation(&self) -> Option<f64> {
        let denom = (self.a * self.d).sqrt();
        if denom > 0.0 {
            Some((self.b / denom).clamp(-1.0, 1.0))
        } else {
            None
        }
    }
}

/// Per-axis mean and population covariance (divisor `n`)
///
/// A single point yields the zero matrix.
pub fn mean_and_covariance(points: &[Point2D]) -> Result<(MeanVector, CovarianceMatrix)> {
    if points.is_empty() {
        return Err(StatsError::EmptyInput {
            statistic: "mean and covariance",
        });
    }
    if !points.iter().all(Point2D::is_finite) {
        return Err(StatsError::NonFiniteInput {
            statistic: "mean and covariance",
        });
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for p in points {
        let dx = p.x - mean_x;
        let dy = p.y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    Ok((
        MeanVector::new(mean_x, mean_y),
        CovarianceMatrix::symmetric(sxx / n, sxy / n, syy / n),
    ))
}
