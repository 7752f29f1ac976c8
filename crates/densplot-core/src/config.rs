//! Configuration for densplot charts
//!
//! Every section has defaults matching the charts' historical behaviour, so a
//! configuration file only needs to name what it changes.

use densplot_stats::{KernelKind, OutlierRule, DEFAULT_CONFIDENCE_LEVEL, Z_95};
use serde::{Deserialize, Serialize};

use crate::error::{DensplotError, Result};

/// Chart-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub density: DensityConfig,
    pub region: RegionConfig,
    pub box_plot: BoxPlotConfig,
    pub detection: DetectionConfig,
}

/// Kernel density chart settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityConfig {
    /// Kernel bandwidth in data units
    pub bandwidth: f64,
    pub kernel: KernelKind,
    /// Approximate number of KDE evaluation points
    pub grid_ticks: usize,
    /// Approximate number of histogram thresholds
    pub histogram_ticks: usize,
    /// Also bin each series into a histogram
    pub histogram: bool,
    /// Overlay a normal curve fitted to each series
    pub normal_reference: bool,
    /// Fixed x-domain; the pooled data extent when absent
    pub domain: Option<(f64, f64)>,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            bandwidth: 7.0,
            kernel: KernelKind::Epanechnikov,
            grid_ticks: 100,
            histogram_ticks: 40,
            histogram: false,
            normal_reference: false,
            domain: None,
        }
    }
}

/// Which confidence region a scatter chart draws
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionShapeKind {
    #[default]
    Ellipse,
    Rectangle,
}

/// Scatter-chart confidence region settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    pub shape: RegionShapeKind,
    /// Probability mass inside the ellipse
    pub confidence_level: f64,
    /// One nested rectangle per multiplier
    pub rectangle_multipliers: Vec<f64>,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            shape: RegionShapeKind::Ellipse,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            rectangle_multipliers: vec![2.0, 3.0],
        }
    }
}

/// Box-plot chart settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxPlotConfig {
    /// Cap on categories across all groups
    pub max_categories: usize,
    /// Order categories by ascending median within each group
    pub sort_by_median: bool,
    /// z multiplier for the pooled confidence interval
    pub interval_z: f64,
    pub outlier_rule: OutlierRule,
}

impl Default for BoxPlotConfig {
    fn default() -> Self {
        Self {
            max_categories: 50,
            sort_by_median: true,
            interval_z: Z_95,
            outlier_rule: OutlierRule::Tukey,
        }
    }
}

/// X-axis scale of a detection chart
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AxisScale {
    #[default]
    Linear,
    Log { base: f64 },
}

/// Detection (dose-response) chart settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Compute drop lines from each lab detection rate to the LPOD curve
    pub drop_lines: bool,
    pub scale: AxisScale,
}

impl ChartConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load and validate configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.density.validate()?;
        self.region.validate()?;
        self.box_plot.validate()?;
        self.detection.validate()
    }
}

impl DensityConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.bandwidth.is_finite() && self.bandwidth > 0.0) {
            return Err(invalid(format!(
                "density.bandwidth must be positive, got {}",
                self.bandwidth
            )));
        }
        if self.grid_ticks == 0 {
            return Err(invalid("density.grid_ticks must be positive"));
        }
        if self.histogram && self.histogram_ticks == 0 {
            return Err(invalid("density.histogram_ticks must be positive"));
        }
        if let Some((lo, hi)) = self.domain {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(invalid(format!("density.domain [{lo}, {hi}] is not a valid range")));
            }
        }
        Ok(())
    }
}

impl RegionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(invalid(format!(
                "region.confidence_level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        if let Some(k) = self
            .rectangle_multipliers
            .iter()
            .find(|k| !(k.is_finite() && **k >= 0.0))
        {
            return Err(invalid(format!(
                "region.rectangle_multipliers must be non-negative, got {k}"
            )));
        }
        Ok(())
    }
}

impl BoxPlotConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_categories == 0 {
            return Err(invalid("box_plot.max_categories must be positive"));
        }
        if !(self.interval_z.is_finite() && self.interval_z >= 0.0) {
            return Err(invalid(format!(
                "box_plot.interval_z must be non-negative, got {}",
                self.interval_z
            )));
        }
        self.outlier_rule
            .validate()
            .map_err(|e| invalid(format!("box_plot.outlier_rule: {e}")))
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<()> {
        if let AxisScale::Log { base } = self.scale {
            if !(base.is_finite() && base > 0.0 && base != 1.0) {
                return Err(invalid(format!(
                    "detection.scale log base must be positive and not 1, got {base}"
                )));
            }
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> DensplotError {
    DensplotError::InvalidConfig(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults_are_valid() {
        let config = ChartConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.density.bandwidth, 7.0);
        assert_eq!(config.region.confidence_level, 0.95);
        assert_eq!(config.region.rectangle_multipliers, vec![2.0, 3.0]);
        assert_eq!(config.box_plot.max_categories, 50);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ChartConfig::from_toml(
            r#"
            [density]
            bandwidth = 2.5

            [region]
            shape = "rectangle"
            "#,
        )
        .unwrap();

        assert_eq!(config.density.bandwidth, 2.5);
        assert_eq!(config.density.grid_ticks, 100);
        assert_eq!(config.region.shape, RegionShapeKind::Rectangle);
        assert_eq!(config.box_plot, BoxPlotConfig::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = ChartConfig::default();
        config.box_plot.outlier_rule = OutlierRule::ZScore { threshold: 2.5 };
        config.detection.scale = AxisScale::Log { base: 4.0 };
        config.density.domain = Some((0.0, 100.0));

        let text = config.to_toml().unwrap();
        let parsed = ChartConfig::from_toml(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = ChartConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(ChartConfig::from_json(&json).unwrap(), config);
    }

    #[rstest]
    #[case("[density]\nbandwidth = 0.0")]
    #[case("[density]\nbandwidth = -3.0")]
    #[case("[density]\ngrid_ticks = 0")]
    #[case("[region]\nconfidence_level = 1.0")]
    #[case("[region]\nconfidence_level = 0.0")]
    #[case("[region]\nrectangle_multipliers = [2.0, -1.0]")]
    #[case("[box_plot]\nmax_categories = 0")]
    #[case("[box_plot]\ninterval_z = -5.0")]
    #[case("[box_plot.outlier_rule]\nrule = \"z_score\"\nthreshold = -1.0")]
    #[case("[density]\ndomain = [10.0, 0.0]")]
    #[case("[detection.scale]\ntype = \"log\"\nbase = 1.0")]
    fn test_invalid_values_rejected(#[case] text: &str) {
        assert!(matches!(
            ChartConfig::from_toml(text),
            Err(DensplotError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_sections_validate_on_their_own() {
        let density = DensityConfig {
            domain: Some((10.0, 0.0)),
            ..DensityConfig::default()
        };
        let region = RegionConfig {
            confidence_level: 1.5,
            ..RegionConfig::default()
        };
        let box_plot = BoxPlotConfig {
            outlier_rule: OutlierRule::ZScore { threshold: 0.0 },
            ..BoxPlotConfig::default()
        };
        let detection = DetectionConfig {
            scale: AxisScale::Log { base: -2.0 },
            ..DetectionConfig::default()
        };

        assert!(matches!(density.validate(), Err(DensplotError::InvalidConfig(_))));
        assert!(matches!(region.validate(), Err(DensplotError::InvalidConfig(_))));
        assert!(matches!(box_plot.validate(), Err(DensplotError::InvalidConfig(_))));
        assert!(matches!(detection.validate(), Err(DensplotError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            ChartConfig::from_toml("density = ["),
            Err(DensplotError::TomlParse(_))
        ));
    }
}
