//! Bivariate confidence regions
//!
//! Two distinct shapes are offered and they are **not** interchangeable:
//!
//! - [`confidence_rectangle`] is an axis-aligned box of `k` standard
//!   deviations per axis. It ignores the covariance term entirely, so for
//!   correlated data it over-covers along the minor diagonal and under-covers
//!   along the major one. It is a quick visual band, not a probability region.
//! - [`confidence_ellipse`] is the region containing probability mass `p`
//!   under a bivariate normal model, from the eigen-decomposition of the
//!   covariance matrix.

use serde::{Deserialize, Serialize};

use crate::bivariate::{CovarianceMatrix, MeanVector, Point2D};
use crate::error::{Result, StatsError};

/// Default confidence level for ellipses
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Off-diagonal terms smaller than this (relative to the diagonal) count as zero
const AXIS_ALIGNED_EPS: f64 = 1e-12;

/// Axis-aligned box around a mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceRectangle {
    /// Lower-left corner
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ConfidenceRectangle {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: &Point2D) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Rotated ellipse around a mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceEllipse {
    pub cx: f64,
    pub cy: f64,
    /// Semi-axis along the direction given by `angle`
    pub rx: f64,
    /// Semi-axis perpendicular to `angle`
    pub ry: f64,
    /// Rotation of the `rx` axis from the x axis, in degrees
    pub angle: f64,
}

impl ConfidenceEllipse {
    /// Whether a point lies inside or on the ellipse
    ///
    /// A degenerate ellipse (zero semi-axis) contains only points on its
    /// remaining axis.
    pub fn contains(&self, p: &Point2D) -> bool {
        let theta = self.angle.to_radians();
        let (sin, cos) = theta.sin_cos();
        let dx = p.x - self.cx;
        let dy = p.y - self.cy;
        let u = dx * cos + dy * sin;
        let v = -dx * sin + dy * cos;

        let term = |offset: f64, radius: f64| -> Option<f64> {
            if radius > 0.0 {
                Some((offset / radius).powi(2))
            } else if offset.abs() <= f64::EPSILON * (1.0 + self.rx.max(self.ry)) {
                Some(0.0)
            } else {
                None
            }
        };

        match (term(u, self.rx), term(v, self.ry)) {
            (Some(a), Some(b)) => a + b <= 1.0,
            _ => false,
        }
    }

    /// Area of the ellipse
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.rx * self.ry
    }
}

/// Eigen-decomposition of a symmetric 2x2 matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Eigen2 {
    /// Smaller eigenvalue (clamped at 0)
    pub minor_value: f64,
    /// Larger eigenvalue (clamped at 0)
    pub major_value: f64,
    /// Unit eigenvector for `minor_value`
    pub minor_vector: (f64, f64),
    /// Unit eigenvector for `major_value`, with non-negative x component
    pub major_vector: (f64, f64),
}

/// Chi-square quantile with two degrees of freedom: `-2 ln(1 - p)`
pub fn chi_square_2dof(confidence_level: f64) -> Result<f64> {
    validate_confidence_level(confidence_level)?;
    Ok(-2.0 * (-confidence_level).ln_1p())
}

fn validate_confidence_level(p: f64) -> Result<()> {
    if p > 0.0 && p < 1.0 {
        Ok(())
    } else {
        Err(StatsError::InvalidConfidenceLevel(p))
    }
}

fn validate_multiplier(k: f64) -> Result<()> {
    if k.is_finite() && k >= 0.0 {
        Ok(())
    } else {
        Err(StatsError::InvalidMultiplier(k))
    }
}

fn is_axis_aligned(cov: &CovarianceMatrix) -> bool {
    let off = 0.5 * (cov.b + cov.c);
    let scale = cov.a.abs().max(cov.d.abs());
    off == 0.0 || off.abs() <= AXIS_ALIGNED_EPS * scale
}

/// Eigenvalues and unit eigenvectors of a symmetric covariance matrix
pub fn eigen_decomposition(cov: &CovarianceMatrix) -> Result<Eigen2> {
    cov.validate()?;

    if is_axis_aligned(cov) {
        let a = cov.a.max(0.0);
        let d = cov.d.max(0.0);
        return Ok(if a >= d {
            Eigen2 {
                minor_value: d,
                major_value: a,
                minor_vector: (0.0, 1.0),
                major_vector: (1.0, 0.0),
            }
        } else {
            Eigen2 {
                minor_value: a,
                major_value: d,
                minor_vector: (1.0, 0.0),
                major_vector: (0.0, 1.0),
            }
        });
    }

    let b = 0.5 * (cov.b + cov.c);
    let trace = cov.a + cov.d;
    let diff = cov.a - cov.d;
    // sqrt(diff^2 + 4bc) without overflow or cancellation
    let tmp = diff.hypot(2.0 * b);

    let major_value = ((trace + tmp) / 2.0).max(0.0);
    // det / major avoids the cancellation in (trace - tmp) / 2
    let minor_value = if major_value > 0.0 {
        ((cov.a * cov.d - b * b) / major_value).max(0.0)
    } else {
        0.0
    };

    // (lambda - d, b) and (b, lambda - a) are both eigenvectors; take the
    // one without cancellation.
    let (mut vx, mut vy) = if diff >= 0.0 {
        (diff + tmp, 2.0 * b)
    } else {
        (2.0 * b, tmp - diff)
    };
    let norm = vx.hypot(vy);
    vx /= norm;
    vy /= norm;
    if vx < 0.0 {
        vx = -vx;
        vy = -vy;
    }

    Ok(Eigen2 {
        minor_value,
        major_value,
        minor_vector: (-vy, vx),
        major_vector: (vx, vy),
    })
}

/// Axis-aligned box of `multiplier` standard deviations around the mean
///
/// Uses only the diagonal of `cov`; see the module docs for why this is an
/// approximation rather than a true confidence region.
pub fn confidence_rectangle(
    mean: &MeanVector,
    cov: &CovarianceMatrix,
    multiplier: f64,
) -> Result<ConfidenceRectangle> {
    validate_multiplier(multiplier)?;
    cov.validate()?;

    let sx = cov.a.max(0.0).sqrt();
    let sy = cov.d.max(0.0).sqrt();
    let width = 2.0 * multiplier * sx;
    let height = 2.0 * multiplier * sy;

    Ok(ConfidenceRectangle {
        x: mean.x - width / 2.0,
        y: mean.y - height / 2.0,
        width,
        height,
    })
}

/// Nested rectangles, one per multiplier, in the given order
pub fn confidence_rectangles(
    mean: &MeanVector,
    cov: &CovarianceMatrix,
    multipliers: &[f64],
) -> Result<Vec<ConfidenceRectangle>> {
    multipliers
        .iter()
        .map(|&k| confidence_rectangle(mean, cov, k))
        .collect()
}

/// Ellipse containing probability `confidence_level` under a bivariate normal
///
/// Semi-axes are `sqrt(s * lambda)` with `s = -2 ln(1 - p)`. For a diagonal
/// covariance the ellipse is returned unrotated with `rx = sqrt(s * a)` and
/// `ry = sqrt(s * d)`; otherwise `rx` follows the major eigenvector and
/// `angle` is its orientation.
pub fn confidence_ellipse(
    mean: &MeanVector,
    cov: &CovarianceMatrix,
    confidence_level: f64,
) -> Result<ConfidenceEllipse> {
    let s = chi_square_2dof(confidence_level)?;
    cov.validate()?;

    if is_axis_aligned(cov) {
        return Ok(ConfidenceEllipse {
            cx: mean.x,
            cy: mean.y,
            rx: (s * cov.a.max(0.0)).sqrt(),
            ry: (s * cov.d.max(0.0)).sqrt(),
            angle: 0.0,
        });
    }

    let eigen = eigen_decomposition(cov)?;
    let (vx, vy) = eigen.major_vector;

    Ok(ConfidenceEllipse {
        cx: mean.x,
        cy: mean.y,
        rx: (s * eigen.major_value).sqrt(),
        ry: (s * eigen.minor_value).sqrt(),
        angle: vy.atan2(vx).to_degrees(),
    })
}

/// Which confidence region to draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum RegionShape {
    Ellipse { confidence_level: f64 },
    Rectangle { multiplier: f64 },
}

/// A computed confidence region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ConfidenceRegion {
    Ellipse(ConfidenceEllipse),
    Rectangle(ConfidenceRectangle),
}

impl ConfidenceRegion {
    pub fn contains(&self, p: &Point2D) -> bool {
        match self {
            ConfidenceRegion::Ellipse(e) => e.contains(p),
            ConfidenceRegion::Rectangle(r) => r.contains(p),
        }
    }
}

/// Compute the region selected by `shape`
pub fn confidence_region(
    shape: RegionShape,
    mean: &MeanVector,
    cov: &CovarianceMatrix,
) -> Result<ConfidenceRegion> {
    match shape {
        RegionShape::Ellipse { confidence_level } => {
            confidence_ellipse(mean, cov, confidence_level).map(ConfidenceRegion::Ellipse)
        }
        RegionShape::Rectangle { multiplier } => {
            confidence_rectangle(mean, cov, multiplier).map(ConfidenceRegion::Rectangle)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bivariate::mean_and_covariance;
    use proptest::prelude::*;
    use rstest::rstest;

    const ORIGIN: MeanVector = MeanVector { x: 0.0, y: 0.0 };

    #[test]
    fn test_chi_square_95() {
        let s = chi_square_2dof(0.95).unwrap();
        assert!((s - 5.991464547107979).abs() < 1e-9);
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(-0.5)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn test_rejects_bad_confidence(#[case] p: f64) {
        let cov = CovarianceMatrix::symmetric(1.0, 0.0, 1.0);
        assert!(matches!(
            confidence_ellipse(&ORIGIN, &cov, p),
            Err(StatsError::InvalidConfidenceLevel(_))
        ));
    }

    #[test]
    fn test_rectangle() {
        let mean = MeanVector::new(10.0, 20.0);
        let cov = CovarianceMatrix::symmetric(4.0, 1.5, 9.0);
        let rect = confidence_rectangle(&mean, &cov, 2.0).unwrap();

        assert_eq!(rect.width, 8.0);
        assert_eq!(rect.height, 12.0);
        assert_eq!(rect.x, 6.0);
        assert_eq!(rect.y, 14.0);
        assert_eq!(rect.center(), (10.0, 20.0));
    }

    #[test]
    fn test_rectangle_ignores_covariance() {
        let a = confidence_rectangle(&ORIGIN, &CovarianceMatrix::symmetric(4.0, 0.0, 9.0), 3.0);
        let b = confidence_rectangle(&ORIGIN, &CovarianceMatrix::symmetric(4.0, 5.0, 9.0), 3.0);
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn test_rectangle_rejects_negative_multiplier() {
        let cov = CovarianceMatrix::symmetric(1.0, 0.0, 1.0);
        assert_eq!(
            confidence_rectangle(&ORIGIN, &cov, -1.0),
            Err(StatsError::InvalidMultiplier(-1.0))
        );
    }

    #[test]
    fn test_nested_rectangles() {
        let cov = CovarianceMatrix::symmetric(1.0, 0.0, 1.0);
        let rects = confidence_rectangles(&ORIGIN, &cov, &[2.0, 3.0]).unwrap();
        assert_eq!(rects.len(), 2);
        assert!(rects[1].width > rects[0].width);
    }

    #[test]
    fn test_axis_aligned_ellipse() {
        let cov = CovarianceMatrix::symmetric(4.0, 0.0, 1.0);
        let s = chi_square_2dof(0.95).unwrap();
        let e = confidence_ellipse(&ORIGIN, &cov, 0.95).unwrap();

        assert_eq!(e.angle, 0.0);
        assert!((e.rx - (s * 4.0).sqrt()).abs() < 1e-12);
        assert!((e.ry - s.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_axis_aligned_tall_ellipse_keeps_axes() {
        let cov = CovarianceMatrix::symmetric(1.0, 0.0, 9.0);
        let s = chi_square_2dof(0.9).unwrap();
        let e = confidence_ellipse(&ORIGIN, &cov, 0.9).unwrap();

        assert!(e.angle == 0.0 || e.angle == 90.0);
        assert!((e.rx - s.sqrt()).abs() < 1e-12);
        assert!((e.ry - (9.0 * s).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_correlated_ellipse_orientation() {
        // Equal variances, positive covariance: major axis on the diagonal
        let cov = CovarianceMatrix::symmetric(1.0, 0.8, 1.0);
        let s = chi_square_2dof(0.95).unwrap();
        let e = confidence_ellipse(&ORIGIN, &cov, 0.95).unwrap();

        assert!((e.angle - 45.0).abs() < 1e-9);
        assert!((e.rx - (s * 1.8).sqrt()).abs() < 1e-9);
        assert!((e.ry - (s * 0.2).sqrt()).abs() < 1e-9);

        let neg = confidence_ellipse(&ORIGIN, &CovarianceMatrix::symmetric(1.0, -0.5, 1.0), 0.95)
            .unwrap();
        assert!((neg.angle + 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_perfectly_correlated_is_a_line() {
        let pts: Vec<Point2D> = (0..10).map(|i| Point2D::new(i as f64, 2.0 * i as f64)).collect();
        let (mean, cov) = mean_and_covariance(&pts).unwrap();
        let e = confidence_ellipse(&mean, &cov, 0.95).unwrap();

        assert!(e.ry.abs() < 1e-6);
        assert!(e.rx > 0.0);
        assert!((e.angle - 2.0_f64.atan().to_degrees()).abs() < 1e-9);
        assert!(e.rx.is_finite() && e.ry.is_finite());
    }

    #[test]
    fn test_zero_covariance_is_a_point() {
        let e = confidence_ellipse(&ORIGIN, &CovarianceMatrix::zero(), 0.95).unwrap();
        assert_eq!((e.rx, e.ry, e.angle), (0.0, 0.0, 0.0));
        let r = confidence_rectangle(&ORIGIN, &CovarianceMatrix::zero(), 2.0).unwrap();
        assert_eq!((r.width, r.height), (0.0, 0.0));
    }

    #[test]
    fn test_eigen_decomposition() {
        let eigen = eigen_decomposition(&CovarianceMatrix::symmetric(2.0, 1.0, 2.0)).unwrap();
        assert!((eigen.major_value - 3.0).abs() < 1e-12);
        assert!((eigen.minor_value - 1.0).abs() < 1e-12);
        let (mx, my) = eigen.major_vector;
        let (nx, ny) = eigen.minor_vector;
        assert!((mx.hypot(my) - 1.0).abs() < 1e-12);
        assert!((mx * nx + my * ny).abs() < 1e-12);
    }

    #[test]
    fn test_ellipse_contains() {
        let e = ConfidenceEllipse {
            cx: 1.0,
            cy: 1.0,
            rx: 2.0,
            ry: 1.0,
            angle: 90.0,
        };
        assert!(e.contains(&Point2D::new(1.0, 2.9)));
        assert!(!e.contains(&Point2D::new(2.9, 1.0)));
    }

    #[test]
    fn test_region_dispatch() {
        let cov = CovarianceMatrix::symmetric(1.0, 0.0, 1.0);
        let region = confidence_region(RegionShape::Rectangle { multiplier: 2.0 }, &ORIGIN, &cov)
            .unwrap();
        assert!(matches!(region, ConfidenceRegion::Rectangle(_)));
        let region = confidence_region(
            RegionShape::Ellipse {
                confidence_level: 0.95,
            },
            &ORIGIN,
            &cov,
        )
        .unwrap();
        assert!(region.contains(&Point2D::new(0.5, 0.5)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn ellipse_axes_are_finite_and_ordered(
            var_x in 0.0_f64..100.0,
            var_y in 0.0_f64..100.0,
            rho in -1.0_f64..1.0,
            p in 0.01_f64..0.99,
        ) {
            let cov = CovarianceMatrix::symmetric(var_x, rho * (var_x * var_y).sqrt(), var_y);
            let e = confidence_ellipse(&ORIGIN, &cov, p).unwrap();
            prop_assert!(e.rx >= 0.0 && e.ry >= 0.0);
            prop_assert!(e.rx.is_finite() && e.ry.is_finite() && e.angle.is_finite());
            prop_assert!((-90.0..=90.0).contains(&e.angle));

            // Semi-axes preserve the trace: rx^2 + ry^2 = s * (a + d)
            let s = chi_square_2dof(p).unwrap();
            let lhs = e.rx * e.rx + e.ry * e.ry;
            prop_assert!((lhs - s * (var_x + var_y)).abs() <= 1e-9 * (1.0 + lhs));
        }
    }
}
