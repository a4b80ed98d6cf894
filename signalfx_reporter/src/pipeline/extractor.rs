use crate::{
    metric::{InstantField, SnapshotField},
    DatapointValue, ExportError, Metric,
};

/// Read named fields off one metric.
///
/// Instant fields come straight off the live metric. Snapshot fields all come
/// off one snapshot, computed only when there are snapshot fields to read, so
/// they agree with each other. The metric is never modified.
///
/// Asking a metric for a field its kind does not have is an error, not a skip.
/// So is reading NaN or an infinity.
pub fn extract(
    name: &str,
    metric: &Metric,
    instant_fields: &[InstantField],
    snapshot_fields: &[SnapshotField],
) -> Result<Vec<(&'static str, DatapointValue)>, ExportError> {
    let mut values = Vec::with_capacity(instant_fields.len() + snapshot_fields.len());
    for field in instant_fields {
        let value = metric
            .read(*field)
            .ok_or_else(|| unreadable(name, metric, field.accessor()))?;
        values.push((field.name(), finite(name, metric, field.accessor(), value)?));
    }

    if let Some(first) = snapshot_fields.first() {
        let snapshot = metric
            .snapshot()
            .ok_or_else(|| unreadable(name, metric, first.accessor()))?;
        for field in snapshot_fields {
            let value = snapshot.read(*field).into();
            values.push((field.name(), finite(name, metric, field.accessor(), value)?));
        }
    }
    Ok(values)
}

fn finite(
    name: &str,
    metric: &Metric,
    field: &'static str,
    value: DatapointValue,
) -> Result<DatapointValue, ExportError> {
    if value.is_finite() {
        return Ok(value);
    }
    Err(ExportError::NonFinite {
        metric: name.to_string(),
        category: metric.category(),
        field,
        value: value.into(),
    })
}

fn unreadable(name: &str, metric: &Metric, field: &'static str) -> ExportError {
    ExportError::Extraction {
        metric: name.to_string(),
        category: metric.category(),
        field,
    }
}
