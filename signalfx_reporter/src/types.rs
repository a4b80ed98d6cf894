use std::{collections::BTreeMap, fmt::Display, sync::Arc};

use serde::Serialize;

use crate::metric::Category;

/// A number on the wire. Counts stay integers; everything else is a float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DatapointValue {
    /// an integer value
    Integer(i64),
    /// a floating point value
    Float(f64),
}

impl DatapointValue {
    /// False for NaN and the infinities
    pub fn is_finite(self) -> bool {
        match self {
            DatapointValue::Integer(_) => true,
            DatapointValue::Float(n) => n.is_finite(),
        }
    }
}

impl From<i64> for DatapointValue {
    #[inline]
    fn from(n: i64) -> Self {
        DatapointValue::Integer(n)
    }
}

impl From<f64> for DatapointValue {
    #[inline]
    fn from(n: f64) -> Self {
        DatapointValue::Float(n)
    }
}

impl From<DatapointValue> for f64 {
    fn from(value: DatapointValue) -> Self {
        match value {
            DatapointValue::Integer(n) => n as f64,
            DatapointValue::Float(n) => n,
        }
    }
}

impl Display for DatapointValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatapointValue::Integer(n) => write!(f, "{n}"),
            DatapointValue::Float(n) => write!(f, "{n}"),
        }
    }
}

/// One measurement, ready to send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Datapoint {
    /// Full dotted metric name
    pub metric: String,
    /// Seconds since the unix epoch, floored to the reporting interval
    pub timestamp: u64,
    /// The measurement
    pub value: DatapointValue,
    /// Shared by every datapoint of an export
    pub tags: Arc<Vec<String>>,
}

/// The datapoints of one export, grouped by category.
///
/// Categories without datapoints are never present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExportBatch {
    categories: BTreeMap<Category, Vec<Datapoint>>,
}

impl ExportBatch {
    /// Append datapoints under a category. Appending nothing leaves the batch untouched.
    pub fn extend(&mut self, category: Category, datapoints: impl IntoIterator<Item = Datapoint>) {
        let mut datapoints = datapoints.into_iter().peekable();
        if datapoints.peek().is_none() {
            return;
        }
        self.categories
            .entry(category)
            .or_default()
            .extend(datapoints);
    }

    /// True when there is nothing to send
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Count of datapoints across every category
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// The datapoints of one category
    pub fn get(&self, category: Category) -> Option<&[Datapoint]> {
        self.categories.get(&category).map(Vec::as_slice)
    }

    /// The categories present, in export order
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.categories.keys().copied()
    }

    /// Every datapoint, in export order
    pub fn datapoints(&self) -> impl Iterator<Item = (Category, &Datapoint)> + '_ {
        self.categories.iter().flat_map(|(category, datapoints)| {
            datapoints.iter().map(move |datapoint| (*category, datapoint))
        })
    }

    /// Split into batches of at most `max_datapoints` datapoints each.
    ///
    /// Order is preserved and every returned batch is non-empty. A
    /// `max_datapoints` of 0 does not split.
    pub fn into_chunks(self, max_datapoints: usize) -> Vec<ExportBatch> {
        if max_datapoints == 0 || self.len() <= max_datapoints {
            return if self.is_empty() { vec![] } else { vec![self] };
        }

        let mut chunks = Vec::new();
        let mut current = ExportBatch::default();
        let mut current_len = 0;
        for (category, datapoints) in self.categories {
            for datapoint in datapoints {
                if current_len == max_datapoints {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                current
                    .categories
                    .entry(category)
                    .or_default()
                    .push(datapoint);
                current_len += 1;
            }
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }
}
