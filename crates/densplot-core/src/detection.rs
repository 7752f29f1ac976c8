//! Detection-probability (dose-response) chart preparation
//!
//! Each group carries an LPOD curve, the upper and lower limits of its
//! prediction range and the observed per-lab detection rates. Preparation
//! sorts everything by x, closes the upper limit at probability 1 where the
//! lower limit runs further right, and fills both limits in at every x where
//! the other series have a point so the band can be drawn as one area.

use densplot_stats::Point2D;
use serde::{Deserialize, Serialize};

use crate::config::{AxisScale, DetectionConfig};
use crate::error::{DatasetError, Result};

/// Raw input for one detection group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionGroup {
    pub name: String,
    pub lab_detection_rates: Vec<Point2D>,
    pub lpod_curve: Vec<Point2D>,
    pub upper_limit: Vec<Point2D>,
    pub lower_limit: Vec<Point2D>,
}

/// Where a lab detection rate meets the LPOD curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropLine {
    /// Concentration at which the curve reaches `rate`
    pub x: f64,
    pub rate: f64,
}

/// One group ready for drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedDetectionGroup {
    pub name: String,
    pub lab_detection_rates: Vec<Point2D>,
    pub lpod_curve: Vec<Point2D>,
    pub upper_limit: Vec<Point2D>,
    pub lower_limit: Vec<Point2D>,
    pub drop_lines: Vec<DropLine>,
}

/// Prepared detection chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionChart {
    pub groups: Vec<PreparedDetectionGroup>,
    pub x_domain: (f64, f64),
    /// Always `(0, 1)`: detection probabilities
    pub y_domain: (f64, f64),
    pub scale: AxisScale,
}

/// Copy of `points` ordered by ascending x
pub fn sort_by_x(points: &[Point2D]) -> Vec<Point2D> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));
    sorted
}

/// Append `(x, 1.0)` to `upper` for every lower-limit x past the upper limit's end
///
/// An empty upper limit takes every lower-limit x.
pub fn extend_upper_limit(upper: &mut Vec<Point2D>, lower: &[Point2D]) {
    let max_upper_x = upper.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    upper.extend(
        lower
            .iter()
            .filter(|p| p.x > max_upper_x)
            .map(|p| Point2D::new(p.x, 1.0)),
    );
}

fn fill_missing(limit: &[Point2D], xs: &[f64]) -> Vec<Point2D> {
    let mut out = limit.to_vec();
    for &x in xs {
        if limit.iter().any(|p| p.x == x) {
            continue;
        }
        let idx = limit.partition_point(|p| p.x < x);
        if idx == 0 || idx == limit.len() {
            continue;
        }
        let (p0, p1) = (limit[idx - 1], limit[idx]);
        let slope = (p1.y - p0.y) / (p1.x - p0.x);
        out.push(Point2D::new(x, p0.y + slope * (x - p0.x)));
    }
    out.sort_by(|a, b| a.x.total_cmp(&b.x));
    out
}

/// Interpolate both limits at every x of the curve and either limit
///
/// Limits must be sorted by x. A limit only gains points strictly between
/// its own first and last x; nothing is extrapolated. Returns
/// `(upper, lower)`, each sorted by x.
pub fn interpolate_limits(
    curve: &[Point2D],
    upper: &[Point2D],
    lower: &[Point2D],
) -> (Vec<Point2D>, Vec<Point2D>) {
    let mut xs: Vec<f64> = curve
        .iter()
        .chain(upper)
        .chain(lower)
        .map(|p| p.x)
        .collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup();

    (fill_missing(upper, &xs), fill_missing(lower, &xs))
}

/// First x at which a curve sorted by x rises through `y`
///
/// Scans segments left to right for one with `y0 <= y <= y1` and
/// interpolates inside it. A flat segment at exactly `y` yields its left end.
pub fn find_intersection_x(curve: &[Point2D], y: f64) -> Option<f64> {
    curve.windows(2).find_map(|w| {
        let (p0, p1) = (w[0], w[1]);
        if p0.y <= y && p1.y >= y {
            let dy = p1.y - p0.y;
            if dy == 0.0 {
                Some(p0.x)
            } else {
                Some(p0.x + (y - p0.y) * (p1.x - p0.x) / dy)
            }
        } else {
            None
        }
    })
}

fn clean_points(points: &[Point2D], group: &str, series: &str) -> Vec<Point2D> {
    let finite: Vec<Point2D> = points.iter().copied().filter(Point2D::is_finite).collect();
    if finite.len() < points.len() {
        tracing::warn!(
            group,
            series,
            missing = points.len() - finite.len(),
            "dropping non-finite detection points"
        );
    }
    sort_by_x(&finite)
}

fn prepare_group(group: &DetectionGroup, drop_lines: bool) -> PreparedDetectionGroup {
    let name = group.name.as_str();
    let lab_detection_rates = clean_points(&group.lab_detection_rates, name, "lab_detection_rates");
    let lpod_curve = clean_points(&group.lpod_curve, name, "lpod_curve");
    let mut upper = clean_points(&group.upper_limit, name, "upper_limit");
    let lower = clean_points(&group.lower_limit, name, "lower_limit");

    extend_upper_limit(&mut upper, &lower);
    let (upper_limit, lower_limit) = interpolate_limits(&lpod_curve, &upper, &lower);

    let drop_lines = if drop_lines {
        lab_detection_rates
            .iter()
            .filter_map(|rate| {
                find_intersection_x(&lpod_curve, rate.y).map(|x| DropLine { x, rate: rate.y })
            })
            .collect()
    } else {
        Vec::new()
    };

    PreparedDetectionGroup {
        name: group.name.clone(),
        lab_detection_rates,
        lpod_curve,
        upper_limit,
        lower_limit,
        drop_lines,
    }
}

/// Prepare every group of a detection chart
///
/// The x-domain runs from 0 (or 1 on a log axis) to the largest x of any
/// series in any group.
pub fn prepare_detection(
    groups: &[DetectionGroup],
    config: &DetectionConfig,
) -> Result<DetectionChart> {
    config.validate()?;
    let prepared: Vec<PreparedDetectionGroup> = groups
        .iter()
        .map(|g| prepare_group(g, config.drop_lines))
        .collect();

    let x_max = prepared
        .iter()
        .flat_map(|g| {
            g.lab_detection_rates
                .iter()
                .chain(&g.lpod_curve)
                .chain(&g.upper_limit)
                .chain(&g.lower_limit)
        })
        .map(|p| p.x)
        .reduce(f64::max)
        .ok_or(DatasetError::NoData)?;

    let x_min = match config.scale {
        AxisScale::Linear => 0.0,
        AxisScale::Log { .. } => 1.0,
    };
    if x_max <= x_min {
        tracing::warn!(x_min, x_max, "detection x-domain is empty or reversed");
    }

    tracing::debug!(groups = prepared.len(), x_max, "prepared detection chart");

    Ok(DetectionChart {
        groups: prepared,
        x_domain: (x_min, x_max),
        y_domain: (0.0, 1.0),
        scale: config.scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DensplotError;
    use rstest::rstest;

    fn pts(xy: &[(f64, f64)]) -> Vec<Point2D> {
        xy.iter().map(|&(x, y)| Point2D::new(x, y)).collect()
    }

    fn curve() -> Vec<Point2D> {
        pts(&[(0.0, 0.0), (10.0, 0.5), (20.0, 1.0)])
    }

    #[rstest]
    #[case(0.25, Some(5.0))]
    #[case(0.5, Some(10.0))]
    #[case(0.75, Some(15.0))]
    #[case(0.0, Some(0.0))]
    #[case(1.5, None)]
    #[case(-0.1, None)]
    fn test_find_intersection(#[case] y: f64, #[case] expected: Option<f64>) {
        assert_eq!(find_intersection_x(&curve(), y), expected);
    }

    #[test]
    fn test_flat_segment_intersection() {
        let flat = pts(&[(0.0, 0.5), (4.0, 0.5), (8.0, 1.0)]);
        assert_eq!(find_intersection_x(&flat, 0.5), Some(0.0));
    }

    #[test]
    fn test_extend_upper_limit() {
        let mut upper = pts(&[(0.0, 0.2), (5.0, 0.9)]);
        extend_upper_limit(&mut upper, &pts(&[(3.0, 0.0), (7.0, 0.4), (9.0, 0.6)]));
        assert_eq!(upper, pts(&[(0.0, 0.2), (5.0, 0.9), (7.0, 1.0), (9.0, 1.0)]));

        let mut empty = Vec::new();
        extend_upper_limit(&mut empty, &pts(&[(1.0, 0.1)]));
        assert_eq!(empty, pts(&[(1.0, 1.0)]));
    }

    #[test]
    fn test_interpolate_limits() {
        let upper = pts(&[(0.0, 0.2), (10.0, 0.8)]);
        let lower = pts(&[(5.0, 0.0), (15.0, 0.5)]);
        let (u, l) = interpolate_limits(&pts(&[(2.0, 0.1)]), &upper, &lower);

        // Upper gains 2 and 5; 15 is past its end
        let xs: Vec<f64> = u.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 5.0, 10.0]);
        assert!((u[1].y - 0.32).abs() < 1e-12);
        assert!((u[2].y - 0.5).abs() < 1e-12);
        // Lower gains 10 only; 0 and 2 are before its start
        assert_eq!(l.len(), 3);
        assert_eq!(l[1].x, 10.0);
        assert!((l[1].y - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_prepare_sorts_and_extends() {
        let group = DetectionGroup {
            name: "kit".into(),
            lab_detection_rates: pts(&[(10.0, 0.5), (5.0, 0.25)]),
            lpod_curve: pts(&[(20.0, 1.0), (0.0, 0.0), (10.0, 0.5)]),
            upper_limit: pts(&[(10.0, 0.9), (0.0, 0.1)]),
            lower_limit: pts(&[(0.0, 0.0), (20.0, 0.8)]),
        };
        let config = DetectionConfig {
            drop_lines: true,
            ..DetectionConfig::default()
        };
        let chart = prepare_detection(&[group.clone()], &config).unwrap();
        let g = &chart.groups[0];

        assert_eq!(g.lpod_curve, curve());
        assert_eq!(g.lab_detection_rates[0].x, 5.0);
        assert_eq!(g.upper_limit.last(), Some(&Point2D::new(20.0, 1.0)));
        assert_eq!(g.lower_limit.len(), 3);
        assert_eq!(
            g.drop_lines,
            vec![
                DropLine { x: 5.0, rate: 0.25 },
                DropLine { x: 10.0, rate: 0.5 }
            ]
        );
        assert_eq!(chart.x_domain, (0.0, 20.0));
        assert_eq!(chart.y_domain, (0.0, 1.0));

        // Caller data untouched
        assert_eq!(group.upper_limit.len(), 2);
    }

    #[test]
    fn test_log_scale_domain() {
        let group = DetectionGroup {
            name: "g".into(),
            lpod_curve: curve(),
            ..DetectionGroup::default()
        };
        let config = DetectionConfig {
            scale: AxisScale::Log { base: 10.0 },
            ..DetectionConfig::default()
        };
        let chart = prepare_detection(&[group], &config).unwrap();
        assert_eq!(chart.x_domain, (1.0, 20.0));
        assert!(chart.groups[0].drop_lines.is_empty());
    }

    #[rstest]
    #[case(1.0)]
    #[case(0.0)]
    #[case(-10.0)]
    #[case(f64::NAN)]
    fn test_hand_built_invalid_log_base_rejected(#[case] base: f64) {
        let group = DetectionGroup {
            name: "g".into(),
            lpod_curve: curve(),
            ..DetectionGroup::default()
        };
        let config = DetectionConfig {
            scale: AxisScale::Log { base },
            ..DetectionConfig::default()
        };
        assert!(matches!(
            prepare_detection(&[group], &config),
            Err(DensplotError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_no_points() {
        assert!(matches!(
            prepare_detection(&[DetectionGroup::default()], &DetectionConfig::default()),
            Err(DensplotError::Dataset(DatasetError::NoData))
        ));
    }
}
