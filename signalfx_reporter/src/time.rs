use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Primarily for testing, here's a way to customize which wall clock the
/// reporter aligns its exports to.
#[derive(Default)]
pub enum TimeSource {
    /// The system clock
    #[default]
    SystemTime,
    /// Whatever you say time it is
    DynamicTime {
        /// Current wall clock time
        now_wall_clock: Box<dyn Fn() -> SystemTime + Send + Sync>,
    },
}

impl std::fmt::Debug for TimeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SystemTime => write!(f, "SystemTime"),
            Self::DynamicTime { .. } => f.debug_tuple("DynamicTime").finish(),
        }
    }
}

impl TimeSource {
    /// Current wall clock time
    pub fn now(&self) -> SystemTime {
        match self {
            TimeSource::SystemTime => SystemTime::now(),
            TimeSource::DynamicTime { now_wall_clock } => now_wall_clock(),
        }
    }
}

/// Aligns work to wall clock multiples of an interval since the epoch.
///
/// It helps make metrics better-aligned when systems have well-aligned clocks.
#[derive(Debug)]
pub struct TimeAligner {
    interval: Duration,
    time_source: TimeSource,
}

impl TimeAligner {
    /// Align to multiples of `interval_seconds`. 0 is treated as 1.
    pub fn new(interval_seconds: u64, time_source: TimeSource) -> Self {
        Self {
            interval: Duration::from_secs(interval_seconds.max(1)),
            time_source,
        }
    }

    /// The alignment interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The largest interval multiple at or before now, in whole seconds since the epoch.
    pub fn floor(&self) -> u64 {
        let now = self.since_epoch().as_secs();
        let interval = self.interval.as_secs();
        now - now % interval
    }

    /// How long until the next interval multiple.
    ///
    /// Never zero: when exactly on a boundary, this is a whole interval.
    pub fn until_next_boundary(&self) -> Duration {
        let now = self.since_epoch().as_millis();
        let interval = self.interval.as_millis();
        Duration::from_millis((interval - now % interval) as u64)
    }

    /// Sleep until the next interval multiple.
    pub async fn wait_for_next_boundary(&self) {
        let wait = self.until_next_boundary();
        log::trace!("sleeping {wait:?} until the next boundary");
        tokio::time::sleep(wait).await;
    }

    fn since_epoch(&self) -> Duration {
        self.time_source
            .now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use std::{
        sync::{Arc, Mutex},
        time::{Duration, SystemTime, UNIX_EPOCH},
    };

    use crate::{TimeAligner, TimeSource};

    fn fixed_clock(seconds: f64) -> (TimeSource, Arc<Mutex<SystemTime>>) {
        let now = Arc::new(Mutex::new(UNIX_EPOCH + Duration::from_secs_f64(seconds)));
        let clock = now.clone();
        (
            TimeSource::DynamicTime {
                now_wall_clock: Box::new(move || *clock.lock().expect("test clock")),
            },
            now,
        )
    }

    #[test_log::test]
    fn floors_to_the_interval() {
        let (time_source, now) = fixed_clock(1_000_059.9);
        let aligner = TimeAligner::new(60, time_source);
        assert_eq!(1_000_020, aligner.floor());

        *now.lock().expect("test clock") = UNIX_EPOCH + Duration::from_secs(1_000_080);
        assert_eq!(1_000_080, aligner.floor());
    }

    #[test_log::test]
    fn waits_until_the_next_boundary() {
        let (time_source, now) = fixed_clock(1_000_050.5);
        let aligner = TimeAligner::new(60, time_source);
        assert_eq!(Duration::from_millis(29_500), aligner.until_next_boundary());

        *now.lock().expect("test clock") = UNIX_EPOCH + Duration::from_secs(1_000_080);
        assert_eq!(Duration::from_secs(60), aligner.until_next_boundary());
    }

    #[test_log::test]
    fn zero_interval_is_one_second() {
        let (time_source, _now) = fixed_clock(10.25);
        let aligner = TimeAligner::new(0, time_source);
        assert_eq!(Duration::from_secs(1), aligner.interval());
        assert_eq!(10, aligner.floor());
        assert_eq!(Duration::from_millis(750), aligner.until_next_boundary());
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn sleeps_the_computed_duration() {
        let (time_source, _now) = fixed_clock(1_000_050.0);
        let aligner = TimeAligner::new(60, time_source);
        let started = tokio::time::Instant::now();
        aligner.wait_for_next_boundary().await;
        assert_eq!(Duration::from_secs(30), started.elapsed());
    }
}
