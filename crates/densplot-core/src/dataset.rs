//! Dataset representation
//!
//! A [`Dataset`] is an ordered sequence of observations with optional
//! per-observation labels. Charts take several datasets at once and name
//! each one with a series label.

use densplot_stats::Point2D;
use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// Observations that may be missing (NaN or infinite)
pub trait Observation: Copy {
    fn is_present(&self) -> bool;
}

impl Observation for f64 {
    fn is_present(&self) -> bool {
        self.is_finite()
    }
}

impl Observation for Point2D {
    fn is_present(&self) -> bool {
        self.is_finite()
    }
}

/// Ordered observations with optional labels
///
/// Invariant: `labels` is either empty or exactly as long as `values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset<T>")]
pub struct Dataset<T> {
    values: Vec<T>,
    labels: Vec<String>,
}

#[derive(Deserialize)]
struct RawDataset<T> {
    values: Vec<T>,
    #[serde(default)]
    labels: Vec<String>,
}

impl<T> TryFrom<RawDataset<T>> for Dataset<T> {
    type Error = DatasetError;

    fn try_from(raw: RawDataset<T>) -> Result<Self, Self::Error> {
        Dataset::with_labels(raw.values, raw.labels)
    }
}

impl<T> Dataset<T> {
    /// Unlabelled dataset
    pub fn new(values: Vec<T>) -> Self {
        Self {
            values,
            labels: Vec::new(),
        }
    }

    /// Labelled dataset; labels must match values one-to-one or be empty
    pub fn with_labels(values: Vec<T>, labels: Vec<String>) -> Result<Self, DatasetError> {
        if !labels.is_empty() && labels.len() != values.len() {
            return Err(DatasetError::LabelMismatch {
                values: values.len(),
                labels: labels.len(),
            });
        }
        Ok(Self { values, labels })
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Label of the observation at `index`, if labelled
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T: Observation> Dataset<T> {
    /// Present observations and the number of missing ones
    pub fn present_values(&self) -> (Vec<T>, usize) {
        let present: Vec<T> = self.values.iter().copied().filter(T::is_present).collect();
        let missing = self.values.len() - present.len();
        (present, missing)
    }
}

impl<T> From<Vec<T>> for Dataset<T> {
    fn from(values: Vec<T>) -> Self {
        Self::new(values)
    }
}

/// Series names for `count` datasets
///
/// Uses `labels` when there is exactly one per dataset; otherwise falls back
/// to `Dataset 1`, `Dataset 2`, ...
pub fn series_labels(labels: &[String], count: usize) -> Vec<String> {
    if labels.len() == count {
        labels.to_vec()
    } else {
        if !labels.is_empty() {
            tracing::warn!(
                labels = labels.len(),
                datasets = count,
                "series label count does not match dataset count; using defaults"
            );
        }
        (1..=count).map(|i| format!("Dataset {i}")).collect()
    }
}

/// Take present observations from a series, logging any dropped
pub(crate) fn clean_series<T: Observation>(dataset: &Dataset<T>, label: &str) -> Vec<T> {
    let (present, missing) = dataset.present_values();
    if missing > 0 {
        tracing::warn!(series = label, missing, "dropping missing values from series");
    }
    present
}

/// One named category of a box-plot group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub values: Vec<f64>,
}

impl Category {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// A group of box-plot categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlotGroup {
    pub group: String,
    pub categories: Vec<Category>,
}

impl BoxPlotGroup {
    pub fn new(group: impl Into<String>, categories: Vec<Category>) -> Self {
        Self {
            group: group.into(),
            categories,
        }
    }

    /// All values of all categories, in order
    pub fn all_values(&self) -> Vec<f64> {
        self.categories
            .iter()
            .flat_map(|c| c.values.iter().copied())
            .collect()
    }
}
