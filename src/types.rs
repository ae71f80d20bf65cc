//! Type aliases and common types.

use nalgebra::{SMatrix, SVector};
use serde::{Deserialize, Serialize};

/// 2x2 normal-equations matrix for local linear regression.
pub type Matrix2 = SMatrix<f64, 2, 2>;

/// 2-dimensional vector for local linear regression (intercept, slope).
pub type Vector2 = SVector<f64, 2>;

/// An equally spaced time series with an optional known transition.
///
/// Element `i` sits at time index `i`. The series is immutable once built;
/// everything derived from it lives in [`crate::AnalysisContext`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    values: Vec<f64>,
    transition: Option<usize>,
}

impl TimeSeries {
    /// Create a series from raw values.
    pub fn new(values: Vec<f64>, transition: Option<usize>) -> Self {
        Self { values, transition }
    }

    /// Same values with a different transition index.
    pub fn with_transition(mut self, transition: Option<usize>) -> Self {
        self.transition = transition;
        self
    }

    /// The observations in time order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the known structural change, if any.
    pub fn transition(&self) -> Option<usize> {
        self.transition
    }

    /// Number of observations up to and including the transition.
    ///
    /// Detrending and all estimators only look at this prefix.
    pub fn pre_transition_len(&self) -> usize {
        match self.transition {
            Some(t) => (t + 1).min(self.values.len()),
            None => self.values.len(),
        }
    }

    /// The observations up to and including the transition.
    pub fn pre_transition(&self) -> &[f64] {
        &self.values[..self.pre_transition_len()]
    }
}

/// A named EWS indicator aligned with the pre-transition time index.
///
/// Entries are `NaN` where the indicator is undefined (rolling-window
/// warm-up, or times without a spectrum frame).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    /// Column name, e.g. `"variance"`.
    pub name: String,
    /// One value per pre-transition time index.
    pub values: Vec<f64>,
}

impl Indicator {
    /// Create an indicator column.
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Number of defined (non-NaN) entries.
    pub fn defined(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }
}

/// Ordered collection of indicators, the input of the Kendall tau trend test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorTable {
    columns: Vec<Indicator>,
}

impl IndicatorTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a column, replacing any column with the same name in place.
    pub fn insert(&mut self, indicator: Indicator) {
        match self.columns.iter_mut().find(|c| c.name == indicator.name) {
            Some(slot) => *slot = indicator,
            None => self.columns.push(indicator),
        }
    }

    /// Look up a column by name.
    pub fn get(&self, name: &str) -> Option<&Indicator> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Indicator> {
        self.columns.iter()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
