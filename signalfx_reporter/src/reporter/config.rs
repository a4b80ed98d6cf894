use std::sync::Arc;

use crate::{ExportError, Logger, TimeSource};

/// Called with every export failure. Panics inside it are swallowed.
pub type ErrorCallback = Arc<dyn Fn(&ExportError) + Send + Sync>;

/// Configuration for a [`crate::Reporter`]
pub struct ReporterConfig {
    pub(crate) endpoint: String,
    pub(crate) token: String,
    pub(crate) org_id: String,
    pub(crate) tags: Vec<String>,
    pub(crate) prefix: Option<String>,
    pub(crate) source: Option<String>,
    pub(crate) interval_seconds: u64,
    pub(crate) batch_size: usize,
    pub(crate) on_error: Option<ErrorCallback>,
    pub(crate) logger: Logger,
    pub(crate) time_source: TimeSource,
}

impl std::fmt::Debug for ReporterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReporterConfig")
            .field("endpoint", &self.endpoint)
            .field("org_id", &self.org_id)
            .field("tags", &self.tags)
            .field("prefix", &self.prefix)
            .field("source", &self.source)
            .field("interval_seconds", &self.interval_seconds)
            .field("batch_size", &self.batch_size)
            .field("logger", &self.logger)
            .field("time_source", &self.time_source)
            .finish_non_exhaustive()
    }
}

impl ReporterConfig {
    /// Create a configuration for reporting to `endpoint` (like `https://ingest.us0.signalfx.com`)
    /// as organization `org_id`, authenticating with `token`.
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        org_id: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            org_id: org_id.into(),
            tags: Vec::new(),
            prefix: None,
            source: None,
            interval_seconds: 60,
            batch_size: 50,
            on_error: None,
            logger: Logger::default(),
            time_source: TimeSource::default(),
        }
    }

    /// Tags attached to every datapoint (default none)
    pub fn tags(&mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Dotted prefix for every metric name (default none)
    pub fn prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Label added to every datapoint's tags as `source:<label>` (default none)
    pub fn source(&mut self, source: impl Into<String>) -> &mut Self {
        self.source = Some(source.into());
        self
    }

    /// Export on wall clock multiples of this many seconds (default 60)
    pub fn interval_seconds(&mut self, interval_seconds: u64) -> &mut Self {
        self.interval_seconds = interval_seconds;
        self
    }

    /// Most datapoints sent in one request (default 50). 0 sends everything at once.
    pub fn batch_size(&mut self, batch_size: usize) -> &mut Self {
        self.batch_size = batch_size;
        self
    }

    /// Get told about failed exports (default: they are only logged)
    pub fn on_error(
        &mut self,
        on_error: impl Fn(&ExportError) + Send + Sync + 'static,
    ) -> &mut Self {
        self.on_error = Some(Arc::new(on_error));
        self
    }

    /// Where the reporter logs (default the `log` facade)
    pub fn logger(&mut self, logger: Logger) -> &mut Self {
        self.logger = logger;
        self
    }

    /// Which clock exports align to (default the system clock)
    pub fn time_source(&mut self, time_source: TimeSource) -> &mut Self {
        self.time_source = time_source;
        self
    }

    /// The configured endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
