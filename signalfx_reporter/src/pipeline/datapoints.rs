use std::{borrow::Cow, sync::Arc};

use crate::{Datapoint, ExportBatch, ExportError, Metric, MetricRegistry};

use super::extract;

/// Replace every run of spaces with a single underscore.
pub fn sanitize_name(name: &str) -> Cow<'_, str> {
    if !name.contains(' ') {
        return Cow::Borrowed(name);
    }
    let mut sanitized = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c == ' ' {
            if !in_run {
                sanitized.push('_');
            }
            in_run = true;
        } else {
            sanitized.push(c);
            in_run = false;
        }
    }
    Cow::Owned(sanitized)
}

/// `prefix.name`, or just `name`, with the registry name sanitized.
pub fn base_name(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}.{}", sanitize_name(name)),
        None => sanitize_name(name).into_owned(),
    }
}

/// One datapoint per exported field of one registry entry.
///
/// Every datapoint shares `timestamp` and the same `tags` allocation.
pub fn build_datapoints(
    name: &str,
    metric: &Metric,
    timestamp: u64,
    tags: &Arc<Vec<String>>,
    prefix: Option<&str>,
) -> Result<Vec<Datapoint>, ExportError> {
    let category = metric.category();
    let base_name = base_name(prefix, name);
    Ok(extract(
        name,
        metric,
        category.instant_fields(),
        category.snapshot_fields(),
    )?
    .into_iter()
    .map(|(field, value)| Datapoint {
        metric: format!("{base_name}.{field}"),
        timestamp,
        value,
        tags: tags.clone(),
    })
    .collect())
}

/// Walk the registry once and group every entry's datapoints by category.
///
/// Entries with blank names are skipped. The first extraction failure aborts the walk.
pub fn collect_batch(
    registry: &dyn MetricRegistry,
    timestamp: u64,
    tags: &Arc<Vec<String>>,
    prefix: Option<&str>,
) -> Result<ExportBatch, ExportError> {
    let mut batch = ExportBatch::default();
    let mut failure = None;
    registry.each_metric(&mut |name, metric| {
        if failure.is_some() || name.trim().is_empty() {
            return;
        }
        match build_datapoints(name, metric, timestamp, tags, prefix) {
            Ok(datapoints) => batch.extend(metric.category(), datapoints),
            Err(error) => failure = Some(error),
        }
    });
    match failure {
        Some(error) => Err(error),
        None => Ok(batch),
    }
}
