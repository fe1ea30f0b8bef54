use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named, sparse, date-keyed numeric history.
///
/// Dates are opaque zero-padded ISO strings, so lexicographic order is
/// chronological order. The map has no meaningful iteration order; consumers
/// must sort.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSeries {
    pub name: String,
    pub points: HashMap<String, f64>,
}

impl NamedSeries {
    pub fn new<I>(name: impl Into<String>, points: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        Self {
            name: name.into(),
            points: points.into_iter().collect(),
        }
    }
}

/// One row of an aligned multi-series table: a date plus exactly one value
/// slot per input series, `None` where that series has no point on the date.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub date: String,
    /// `(series name, value)` in the order the series were supplied.
    pub values: Vec<(String, Option<f64>)>,
}

impl AlignedRow {
    /// The value slot of `series`. `None` if no such series exists,
    /// `Some(None)` if the series has no point on this date.
    pub fn get(&self, series: &str) -> Option<Option<f64>> {
        self.values
            .iter()
            .find(|(name, _)| name == series)
            .map(|(_, value)| *value)
    }
}

/// Serializes as the flat object chart renderers key into:
/// `{"date": "2024-01-01", "Growth": 101.5, "Income": null}`.
impl Serialize for AlignedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("date", &self.date)?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One fixed-width slice of a histogram's value domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// `"{lower}-{upper}"` at the configured label precision.
    pub label: String,
    pub lower: f64,
    pub upper: f64,
    pub frequency: usize,
}
