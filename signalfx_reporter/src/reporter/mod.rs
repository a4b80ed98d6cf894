//! The reporter: a scheduled, failure-isolated export loop

use std::sync::Arc;

use crate::{
    downstream::{HttpTransport, Transport},
    ConfigError, ExportBatch, ExportError, MetricRegistry,
};

mod config;
mod exporter;
mod logger;
mod scheduler;

pub use config::{ErrorCallback, ReporterConfig};
pub use logger::Logger;

use exporter::Exporter;
use scheduler::Scheduler;

/// Periodically reports a registry to SignalFx.
///
/// Exports happen on wall clock multiples of the configured interval. Each one
/// runs as its own task so a slow endpoint never delays the next wake-up, and
/// a tick that finds the previous export still running is skipped.
pub struct Reporter {
    exporter: Arc<Exporter>,
    scheduler: Scheduler,
}

impl Reporter {
    /// Report `registry` over https to the configured endpoint.
    pub fn connect(
        config: ReporterConfig,
        registry: Arc<dyn MetricRegistry>,
    ) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(config.endpoint())?;
        Ok(Self::with_transport(config, registry, Arc::new(transport)))
    }

    /// Report `registry` through a transport of your own. The configured endpoint is not used.
    pub fn with_transport(
        config: ReporterConfig,
        registry: Arc<dyn MetricRegistry>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            exporter: Arc::new(Exporter::new(config, registry, transport)),
            scheduler: Scheduler::default(),
        }
    }

    /// Start reporting in the background. Does nothing if already started.
    ///
    /// # Panics
    ///
    /// When called outside of a tokio runtime.
    pub fn start(&self) {
        self.scheduler.start(&self.exporter)
    }

    /// Stop reporting and wait for the background loop to exit.
    ///
    /// An export already in progress is not interrupted.
    pub async fn stop(&self) {
        self.scheduler.stop().await
    }

    /// Stop, then start again. The next export happens at the next boundary.
    pub async fn restart(&self) {
        self.stop().await;
        self.start();
    }

    /// True while the background loop is alive
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Export right now. If an export is in progress this waits for it, then exports.
    ///
    /// Failures are logged and passed to the error callback; they never come back here.
    pub async fn flush(&self) {
        self.exporter.flush().await
    }

    /// Export right now unless an export is in progress. Returns whether an export ran.
    pub async fn try_flush(&self) -> bool {
        self.exporter.try_flush().await
    }

    /// Build the batch an export would send right now, without sending it.
    pub fn collect(&self) -> Result<ExportBatch, ExportError> {
        self.exporter.collect()
    }

    /// The current metric name prefix
    pub fn prefix(&self) -> Option<Arc<String>> {
        self.exporter.prefix.load_full()
    }

    /// Change the metric name prefix, starting with the next export
    pub fn set_prefix(&self, prefix: Option<String>) {
        self.exporter.prefix.store(prefix.map(Arc::new))
    }

    /// The current source label
    pub fn source(&self) -> Option<Arc<String>> {
        self.exporter.source.load_full()
    }

    /// Change the source label, starting with the next export
    pub fn set_source(&self, source: Option<String>) {
        self.exporter.source.store(source.map(Arc::new))
    }

    /// The current datapoint tags
    pub fn tags(&self) -> Arc<Vec<String>> {
        self.exporter.tags.load_full()
    }

    /// Change the datapoint tags, starting with the next export
    pub fn set_tags(&self, tags: impl IntoIterator<Item = impl Into<String>>) {
        self.exporter
            .tags
            .store(Arc::new(tags.into_iter().map(Into::into).collect()))
    }

    /// Where the reporter currently logs
    pub fn logger(&self) -> Logger {
        self.exporter.logger.load().as_ref().clone()
    }

    /// Change where the reporter logs
    pub fn set_logger(&self, logger: Logger) {
        self.exporter.logger.store(Arc::new(logger))
    }
}
