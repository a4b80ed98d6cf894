//! A periodic SignalFx reporter for an in-process metrics registry.
//!
//! A [`Reporter`] wakes up on wall-clock aligned boundaries, walks your
//! [`MetricRegistry`], turns every counter, gauge, meter, timer, utilization timer
//! and histogram into flat SignalFx datapoints and posts them to
//! `/api/datapoint`. Your service comes first: an export cycle that fails is
//! logged, handed to your error callback, and forgotten. The next cycle runs
//! with fresh data.
//!
//! # Getting Started
//!
//! ```no_run
//! # let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().expect("runtime can be built");
//! # runtime.block_on(async {
//! use std::sync::{atomic::AtomicI64, Arc};
//! use signalfx_reporter::{Metric, Registry, Reporter, ReporterConfig};
//!
//! let registry = Arc::new(Registry::default());
//! let requests = Arc::new(AtomicI64::new(0));
//! registry.register("api requests", Metric::Counter(requests.clone()));
//!
//! let mut config = ReporterConfig::new("https://ingest.signalfx.com", "token", "org");
//! config.tags(["env:prod"]).prefix("my_service").interval_seconds(10);
//!
//! let reporter = Reporter::connect(config, registry).expect("endpoint is valid");
//! reporter.start();
//! # });
//! ```

pub mod downstream;
mod error;
pub mod metric;
pub mod pipeline;
mod registry;
mod reporter;
mod time;
mod types;

#[cfg(test)]
pub(crate) mod test_util;

pub use error::{ConfigError, ExportError};
pub use metric::{Category, Metric};
pub use registry::{MetricRegistry, Registry};
pub use reporter::{ErrorCallback, Logger, Reporter, ReporterConfig};
pub use time::{TimeAligner, TimeSource};
pub use types::{Datapoint, DatapointValue, ExportBatch};
