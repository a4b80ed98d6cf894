use std::{
    fmt,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
};

use arc_swap::{ArcSwap, ArcSwapOption};
use tokio::sync::Mutex;

use crate::{
    downstream::{DeliveryRequest, Transport},
    pipeline::collect_batch,
    ErrorCallback, ExportBatch, ExportError, Logger, MetricRegistry, ReporterConfig, TimeAligner,
};

/// Runs export cycles. At most one cycle body runs at a time.
pub(crate) struct Exporter {
    registry: Arc<dyn MetricRegistry>,
    transport: Arc<dyn Transport>,
    aligner: TimeAligner,
    path: String,
    token: String,
    batch_size: usize,
    on_error: Option<ErrorCallback>,
    pub(crate) prefix: ArcSwapOption<String>,
    pub(crate) source: ArcSwapOption<String>,
    pub(crate) tags: ArcSwap<Vec<String>>,
    pub(crate) logger: ArcSwap<Logger>,
    flush_lock: Mutex<()>,
}

impl Exporter {
    pub(crate) fn new(
        config: ReporterConfig,
        registry: Arc<dyn MetricRegistry>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            registry,
            transport,
            aligner: TimeAligner::new(config.interval_seconds, config.time_source),
            path: format!("/api/datapoint?orgid={}", config.org_id),
            token: config.token,
            batch_size: config.batch_size,
            on_error: config.on_error,
            prefix: ArcSwapOption::from(config.prefix.map(Arc::new)),
            source: ArcSwapOption::from(config.source.map(Arc::new)),
            tags: ArcSwap::from_pointee(config.tags),
            logger: ArcSwap::from_pointee(config.logger),
            flush_lock: Mutex::new(()),
        }
    }

    pub(crate) fn aligner(&self) -> &TimeAligner {
        &self.aligner
    }

    /// Run one export cycle, waiting for any cycle already in progress.
    pub(crate) async fn flush(&self) {
        let _guard = self.flush_lock.lock().await;
        self.flush_locked().await;
    }

    /// Run one export cycle unless one is already in progress.
    pub(crate) async fn try_flush(&self) -> bool {
        let Ok(_guard) = self.flush_lock.try_lock() else {
            self.log(
                log::Level::Warn,
                format_args!("previous flush still running; skipping this one"),
            );
            return false;
        };
        self.flush_locked().await;
        true
    }

    /// The batch an export would send right now.
    pub(crate) fn collect(&self) -> Result<ExportBatch, ExportError> {
        let prefix = self.prefix.load_full();
        collect_batch(
            self.registry.as_ref(),
            self.aligner.floor(),
            &self.export_tags(),
            prefix.as_deref().map(String::as_str),
        )
    }

    async fn flush_locked(&self) {
        self.log(log::Level::Debug, format_args!("Flushing metrics"));
        match self.export().await {
            Ok(0) => (),
            Ok(sent) => self.log(log::Level::Info, format_args!("Sent {sent} metrics")),
            Err(error) => self.report(error),
        }
    }

    async fn export(&self) -> Result<usize, ExportError> {
        let batch = self.collect()?;
        let total = batch.len();
        for chunk in batch.into_chunks(self.batch_size) {
            let body = serde_json::to_vec(&chunk)?;
            self.transport
                .post(self.request(body))
                .await
                .map_err(ExportError::Delivery)?;
        }
        Ok(total)
    }

    fn request(&self, body: Vec<u8>) -> DeliveryRequest {
        DeliveryRequest {
            path: self.path.clone(),
            headers: vec![
                ("X-SF-TOKEN", self.token.clone()),
                ("Content-Type", "application/json".to_string()),
                ("Accept", "application/json".to_string()),
            ],
            body: body.into(),
        }
    }

    fn export_tags(&self) -> Arc<Vec<String>> {
        let tags = self.tags.load_full();
        match &*self.source.load() {
            Some(source) => {
                let mut tags = tags.as_ref().clone();
                tags.push(format!("source:{source}"));
                Arc::new(tags)
            }
            None => tags,
        }
    }

    fn report(&self, error: ExportError) {
        self.log(log::Level::Error, format_args!("{error}"));
        if let Some(on_error) = &self.on_error {
            if catch_unwind(AssertUnwindSafe(|| on_error(&error))).is_err() {
                self.log(
                    log::Level::Debug,
                    format_args!("error callback panicked; ignoring"),
                );
            }
        }
    }

    pub(crate) fn log(&self, level: log::Level, args: fmt::Arguments<'_>) {
        self.logger.load().log(level, args)
    }
}
