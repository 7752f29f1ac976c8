//! Box-plot chart preparation
//!
//! Groups of named categories become per-category [`BoxPlotStats`], per-group
//! means and pooled [`OverallStats`]. Input groups are borrowed and never
//! reordered in place; every output holds its own copy of the values.

use std::collections::HashSet;

use densplot_stats::{mean, BoxPlotStats, OverallStats};
use serde::{Deserialize, Serialize};

use crate::config::BoxPlotConfig;
use crate::dataset::BoxPlotGroup;
use crate::error::{DatasetError, Result};

/// Statistics for one box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBox {
    pub group: String,
    /// Display name, prefixed with the group when it repeats an earlier name
    pub category: String,
    pub stats: BoxPlotStats,
    /// `(min + std_dev, max - std_dev)`
    pub trimmed_box: (f64, f64),
    /// Finite values of the category in input order
    pub values: Vec<f64>,
    /// Outlier flag per entry of `values`
    pub outlier_flags: Vec<bool>,
}

/// Boxes of one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBoxes {
    pub group: String,
    pub mean: f64,
    pub categories: Vec<CategoryBox>,
}

/// Reference bands drawn behind a single-group chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intervals {
    pub confidence: (f64, f64),
    pub tolerance: (f64, f64),
}

/// Prepared box-plot chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlotChart {
    pub groups: Vec<GroupBoxes>,
    pub overall: OverallStats,
    /// Present only when the chart has exactly one group
    pub intervals: Option<Intervals>,
    /// Categories dropped by the category cap
    pub truncated: usize,
}

impl BoxPlotChart {
    /// Number of boxes across all groups
    pub fn category_count(&self) -> usize {
        self.groups.iter().map(|g| g.categories.len()).sum()
    }

    /// Boxes in display order
    pub fn boxes(&self) -> impl Iterator<Item = &CategoryBox> {
        self.groups.iter().flat_map(|g| g.categories.iter())
    }
}

fn finite_values(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

/// Prepare a grouped box-plot chart
///
/// At most `config.max_categories` categories are kept across all groups, in
/// input order. A category with no finite values is an error.
pub fn prepare_box_plot(groups: &[BoxPlotGroup], config: &BoxPlotConfig) -> Result<BoxPlotChart> {
    config.validate()?;
    let total: usize = groups.iter().map(|g| g.categories.len()).sum();
    if total == 0 {
        return Err(DatasetError::NoData.into());
    }
    let truncated = total.saturating_sub(config.max_categories);
    if truncated > 0 {
        tracing::warn!(
            categories = total,
            max = config.max_categories,
            dropped = truncated,
            "too many box-plot categories; dropping the last ones"
        );
    }

    let mut budget = config.max_categories;
    let mut seen = HashSet::new();
    let mut prepared = Vec::with_capacity(groups.len());

    for group in groups {
        let take = group.categories.len().min(budget);
        budget -= take;
        if take == 0 {
            continue;
        }

        let mut boxes = Vec::with_capacity(take);
        for category in &group.categories[..take] {
            let values = finite_values(&category.values);
            if values.len() < category.values.len() {
                tracing::warn!(
                    group = %group.group,
                    category = %category.name,
                    missing = category.values.len() - values.len(),
                    "dropping missing values from category"
                );
            }
            if values.is_empty() {
                return Err(DatasetError::EmptyCategory {
                    group: group.group.clone(),
                    category: category.name.clone(),
                }
                .into());
            }

            let name = if seen.contains(&category.name) {
                format!("{}_{}", group.group, category.name)
            } else {
                category.name.clone()
            };
            seen.insert(name.clone());

            let stats = BoxPlotStats::with_rule(&values, config.outlier_rule)?;
            boxes.push(CategoryBox {
                group: group.group.clone(),
                category: name,
                trimmed_box: stats.std_dev_trimmed(),
                outlier_flags: stats.outlier_flags(&values),
                values,
                stats,
            });
        }

        if config.sort_by_median {
            boxes.sort_by(|a, b| a.stats.median.total_cmp(&b.stats.median));
        }

        let pooled: Vec<f64> = boxes.iter().flat_map(|b| b.values.iter().copied()).collect();
        prepared.push(GroupBoxes {
            group: group.group.clone(),
            mean: mean(&pooled)?,
            categories: boxes,
        });
    }

    let group_values: Vec<Vec<f64>> = prepared
        .iter()
        .map(|g| g.categories.iter().flat_map(|b| b.values.iter().copied()).collect())
        .collect();
    let overall = OverallStats::from_groups(&group_values, config.interval_z)?;
    let intervals = (prepared.len() == 1).then(|| Intervals {
        confidence: overall.confidence_interval,
        tolerance: overall.tolerance_interval,
    });

    tracing::debug!(
        groups = prepared.len(),
        categories = total - truncated,
        "prepared box plot"
    );

    Ok(BoxPlotChart {
        groups: prepared,
        overall,
        intervals,
        truncated,
    })
}
