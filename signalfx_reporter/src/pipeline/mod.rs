//! Turning a metrics registry into export batches

mod datapoints;
mod extractor;

pub use datapoints::{base_name, build_datapoints, collect_batch, sanitize_name};
pub use extractor::extract;
