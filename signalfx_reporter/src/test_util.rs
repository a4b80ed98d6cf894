use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::{Duration, UNIX_EPOCH},
};

use futures::future::BoxFuture;
use tokio::sync::Semaphore;

use crate::{
    downstream::{DeliveryRequest, StdError, Transport},
    metric::{Counting, Metered, Sampling, Snapshot, Utilizing},
    TimeSource,
};

/// A wall clock that starts at `start_seconds` and moves with tokio's (possibly paused) clock.
pub(crate) fn paused_clock(start_seconds: u64) -> TimeSource {
    let origin = tokio::time::Instant::now();
    let start = UNIX_EPOCH + Duration::from_secs(start_seconds);
    TimeSource::DynamicTime {
        now_wall_clock: Box::new(move || start + origin.elapsed()),
    }
}

/// Fixed readings: count 10, rates 1 through 4, samples 1 through 9.
#[derive(Debug, Default)]
pub(crate) struct FakeTimer {
    snapshots_taken: AtomicUsize,
}

impl FakeTimer {
    pub(crate) fn snapshots_taken(&self) -> usize {
        self.snapshots_taken.load(Ordering::Relaxed)
    }
}

impl Counting for FakeTimer {
    fn count(&self) -> i64 {
        10
    }
}

impl Metered for FakeTimer {
    fn one_minute_rate(&self) -> f64 {
        1.0
    }

    fn five_minute_rate(&self) -> f64 {
        2.0
    }

    fn fifteen_minute_rate(&self) -> f64 {
        3.0
    }

    fn mean_rate(&self) -> f64 {
        4.0
    }
}

impl Sampling for FakeTimer {
    fn min(&self) -> f64 {
        1.0
    }

    fn max(&self) -> f64 {
        9.0
    }

    fn mean(&self) -> f64 {
        5.0
    }

    fn stddev(&self) -> f64 {
        2.0
    }

    fn snapshot(&self) -> Snapshot {
        self.snapshots_taken.fetch_add(1, Ordering::Relaxed);
        Snapshot::new((1..=9).map(f64::from).collect::<Vec<_>>())
    }
}

/// A [`FakeTimer`] with utilizations 0.1 through 0.4.
#[derive(Debug, Default)]
pub(crate) struct FakeUtilizationTimer {
    timer: FakeTimer,
}

impl Counting for FakeUtilizationTimer {
    fn count(&self) -> i64 {
        self.timer.count()
    }
}

impl Metered for FakeUtilizationTimer {
    fn one_minute_rate(&self) -> f64 {
        self.timer.one_minute_rate()
    }

    fn five_minute_rate(&self) -> f64 {
        self.timer.five_minute_rate()
    }

    fn fifteen_minute_rate(&self) -> f64 {
        self.timer.fifteen_minute_rate()
    }

    fn mean_rate(&self) -> f64 {
        self.timer.mean_rate()
    }
}

impl Sampling for FakeUtilizationTimer {
    fn min(&self) -> f64 {
        self.timer.min()
    }

    fn max(&self) -> f64 {
        self.timer.max()
    }

    fn mean(&self) -> f64 {
        self.timer.mean()
    }

    fn stddev(&self) -> f64 {
        self.timer.stddev()
    }

    fn snapshot(&self) -> Snapshot {
        self.timer.snapshot()
    }
}

impl Utilizing for FakeUtilizationTimer {
    fn one_minute_utilization(&self) -> f64 {
        0.1
    }

    fn five_minute_utilization(&self) -> f64 {
        0.2
    }

    fn fifteen_minute_utilization(&self) -> f64 {
        0.3
    }

    fn mean_utilization(&self) -> f64 {
        0.4
    }
}

/// Remembers every request. Can fail on purpose, and can hold deliveries until told to go.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    requests: Mutex<Vec<DeliveryRequest>>,
    failures_left: AtomicUsize,
    delivered: AtomicUsize,
    gate: Option<Semaphore>,
}

impl RecordingTransport {
    /// Every post waits for a permit from [`Self::open_gate`]
    pub(crate) fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Default::default()
        }
    }

    pub(crate) fn open_gate(&self, posts: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(posts);
        }
    }

    pub(crate) fn fail_next(&self, posts: usize) {
        self.failures_left.store(posts, Ordering::SeqCst);
    }

    /// Every request seen, failed ones included
    pub(crate) fn requests(&self) -> Vec<DeliveryRequest> {
        self.requests
            .lock()
            .expect("local mutex should not be poisoned")
            .clone()
    }

    /// Request bodies, parsed
    pub(crate) fn batches(&self) -> Vec<serde_json::Value> {
        self.requests()
            .iter()
            .map(|request| serde_json::from_slice(&request.body).expect("bodies are json"))
            .collect()
    }

    pub(crate) fn delivered(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }
}

impl Transport for RecordingTransport {
    fn post(&self, request: DeliveryRequest) -> BoxFuture<'_, Result<(), StdError>> {
        Box::pin(async move {
            self.requests
                .lock()
                .expect("local mutex should not be poisoned")
                .push(request);
            if let Some(gate) = &self.gate {
                gate.acquire().await.expect("gate is never closed").forget();
            }
            if self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                    left.checked_sub(1)
                })
                .is_ok()
            {
                return Err("simulated failure".into());
            }
            self.delivered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

#[derive(Debug, Default)]
pub(crate) struct CapturingLogger {
    messages: Mutex<Vec<(log::Level, String)>>,
}

impl CapturingLogger {
    pub(crate) fn messages(&self) -> Vec<(log::Level, String)> {
        self.messages
            .lock()
            .expect("local mutex should not be poisoned")
            .clone()
    }
}

impl log::Log for CapturingLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        self.messages
            .lock()
            .expect("local mutex should not be poisoned")
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}
