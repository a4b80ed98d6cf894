//! The measurement kinds a registry can hold, and what each of them exports.
//!
//! Every kind is a capability trait. A [`Metric`] is the tagged variant that
//! pairs a registered measurement with its kind, and each [`Category`] declares
//! up front which [`InstantField`]s and [`SnapshotField`]s it reports.

use std::{
    fmt::Debug,
    sync::{
        atomic::{AtomicI64, AtomicU64},
        Arc,
    },
};

use serde::Serialize;

use crate::types::DatapointValue;

mod snapshot;

pub use snapshot::Snapshot;

const ORDERING: std::sync::atomic::Ordering = std::sync::atomic::Ordering::Relaxed;

/// Something that counts.
pub trait Counting: Send + Sync {
    /// The current count
    fn count(&self) -> i64;
}

/// Something that reports an instantaneous value.
pub trait Gauging: Send + Sync {
    /// The current value
    fn value(&self) -> f64;
}

/// A counter with moving-average rates.
pub trait Metered: Counting {
    /// Events per second, 1 minute exponentially weighted moving average
    fn one_minute_rate(&self) -> f64;
    /// Events per second, 5 minute exponentially weighted moving average
    fn five_minute_rate(&self) -> f64;
    /// Events per second, 15 minute exponentially weighted moving average
    fn fifteen_minute_rate(&self) -> f64;
    /// Events per second since the meter was created
    fn mean_rate(&self) -> f64;
}

/// Something that accumulates samples and can summarize them.
pub trait Sampling: Counting {
    /// Smallest sample
    fn min(&self) -> f64;
    /// Largest sample
    fn max(&self) -> f64;
    /// Arithmetic mean of the samples
    fn mean(&self) -> f64;
    /// Standard deviation of the samples
    fn stddev(&self) -> f64;
    /// Compute a point-in-time view of the retained samples.
    ///
    /// This may be expensive: it is called at most once per metric per export.
    fn snapshot(&self) -> Snapshot;
}

/// A meter of durations.
pub trait Timing: Metered + Sampling {}

impl<T> Timing for T where T: Metered + Sampling {}

/// A timer that also knows what fraction of wall time was spent timing.
pub trait Utilizing: Timing {
    /// 1 minute moving average utilization
    fn one_minute_utilization(&self) -> f64;
    /// 5 minute moving average utilization
    fn five_minute_utilization(&self) -> f64;
    /// 15 minute moving average utilization
    fn fifteen_minute_utilization(&self) -> f64;
    /// Utilization since the timer was created
    fn mean_utilization(&self) -> f64;
}

impl Counting for AtomicI64 {
    fn count(&self) -> i64 {
        self.load(ORDERING)
    }
}

impl Counting for AtomicU64 {
    fn count(&self) -> i64 {
        i64::try_from(self.load(ORDERING)).unwrap_or(i64::MAX)
    }
}

impl<F> Gauging for F
where
    F: Fn() -> f64 + Send + Sync,
{
    fn value(&self) -> f64 {
        self()
    }
}

/// The metric categories, in the order they appear in an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Counts with rates
    Meter,
    /// Plain counts
    Counter,
    /// Instantaneous values
    Gauge,
    /// Timers with utilization
    UtilizationTimer,
    /// Timers
    Timer,
    /// Distributions of arbitrary values
    Histogram,
}

impl Category {
    /// Every category, in export order.
    pub const ALL: [Category; 6] = [
        Category::Meter,
        Category::Counter,
        Category::Gauge,
        Category::UtilizationTimer,
        Category::Timer,
        Category::Histogram,
    ];

    /// The wire label for this category
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Meter => "meter",
            Category::Counter => "counter",
            Category::Gauge => "gauge",
            Category::UtilizationTimer => "utilization_timer",
            Category::Timer => "timer",
            Category::Histogram => "histogram",
        }
    }

    /// Fields read straight off the live metric
    pub fn instant_fields(self) -> &'static [InstantField] {
        use InstantField::*;
        match self {
            Category::Meter => &[
                Count,
                OneMinuteRate,
                FiveMinuteRate,
                FifteenMinuteRate,
                MeanRate,
            ],
            Category::Counter => &[Count],
            Category::Gauge => &[Value],
            Category::UtilizationTimer => &[
                Count,
                OneMinuteRate,
                FiveMinuteRate,
                FifteenMinuteRate,
                MeanRate,
                Min,
                Max,
                Mean,
                StdDev,
                OneMinuteUtilization,
                FiveMinuteUtilization,
                FifteenMinuteUtilization,
                MeanUtilization,
            ],
            Category::Timer => &[
                Count,
                OneMinuteRate,
                FiveMinuteRate,
                FifteenMinuteRate,
                MeanRate,
                Min,
                Max,
                Mean,
                StdDev,
            ],
            Category::Histogram => &[Count, Min, Max, Mean, StdDev],
        }
    }

    /// Fields read off one computed [`Snapshot`] of the metric
    pub fn snapshot_fields(self) -> &'static [SnapshotField] {
        match self {
            Category::Meter | Category::Counter | Category::Gauge => &[],
            Category::UtilizationTimer | Category::Timer | Category::Histogram => {
                &[SnapshotField::Median, SnapshotField::Percentile95]
            }
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar read directly off a live metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstantField {
    /// [`Counting::count`]
    Count,
    /// [`Metered::one_minute_rate`]
    OneMinuteRate,
    /// [`Metered::five_minute_rate`]
    FiveMinuteRate,
    /// [`Metered::fifteen_minute_rate`]
    FifteenMinuteRate,
    /// [`Metered::mean_rate`]
    MeanRate,
    /// [`Sampling::min`]
    Min,
    /// [`Sampling::max`]
    Max,
    /// [`Sampling::mean`]
    Mean,
    /// [`Sampling::stddev`]
    StdDev,
    /// [`Utilizing::one_minute_utilization`]
    OneMinuteUtilization,
    /// [`Utilizing::five_minute_utilization`]
    FiveMinuteUtilization,
    /// [`Utilizing::fifteen_minute_utilization`]
    FifteenMinuteUtilization,
    /// [`Utilizing::mean_utilization`]
    MeanUtilization,
    /// [`Gauging::value`]
    Value,
}

impl InstantField {
    /// The accessor this field is read through
    pub fn accessor(self) -> &'static str {
        match self {
            InstantField::Count => "count",
            InstantField::OneMinuteRate => "one_minute_rate",
            InstantField::FiveMinuteRate => "five_minute_rate",
            InstantField::FifteenMinuteRate => "fifteen_minute_rate",
            InstantField::MeanRate => "mean_rate",
            InstantField::Min => "min",
            InstantField::Max => "max",
            InstantField::Mean => "mean",
            InstantField::StdDev => "stddev",
            InstantField::OneMinuteUtilization => "one_minute_utilization",
            InstantField::FiveMinuteUtilization => "five_minute_utilization",
            InstantField::FifteenMinuteUtilization => "fifteen_minute_utilization",
            InstantField::MeanUtilization => "mean_utilization",
            InstantField::Value => "value",
        }
    }

    /// The exported field name
    pub fn name(self) -> &'static str {
        field_name(self.accessor())
    }
}

/// A scalar read off a [`Snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotField {
    /// [`Snapshot::median`]
    Median,
    /// [`Snapshot::get_95th_percentile`]
    Percentile95,
}

impl SnapshotField {
    /// The accessor this field is read through
    pub fn accessor(self) -> &'static str {
        match self {
            SnapshotField::Median => "median",
            SnapshotField::Percentile95 => "get_95th_percentile",
        }
    }

    /// The exported field name
    pub fn name(self) -> &'static str {
        field_name(self.accessor())
    }
}

/// Exported field names don't carry accessor markers.
pub fn field_name(accessor: &str) -> &str {
    accessor.strip_prefix("get_").unwrap_or(accessor)
}

/// A registered measurement, tagged with its kind.
#[derive(Clone)]
pub enum Metric {
    /// A plain count
    Counter(Arc<dyn Counting>),
    /// An instantaneous value
    Gauge(Arc<dyn Gauging>),
    /// A count with rates
    Meter(Arc<dyn Metered>),
    /// A meter of durations with a distribution
    Timer(Arc<dyn Timing>),
    /// A timer with utilization
    UtilizationTimer(Arc<dyn Utilizing>),
    /// A distribution of values
    Histogram(Arc<dyn Sampling>),
}

impl Debug for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Metric").field(&self.category()).finish()
    }
}

impl Metric {
    /// The category this metric exports under
    pub fn category(&self) -> Category {
        match self {
            Metric::Counter(_) => Category::Counter,
            Metric::Gauge(_) => Category::Gauge,
            Metric::Meter(_) => Category::Meter,
            Metric::Timer(_) => Category::Timer,
            Metric::UtilizationTimer(_) => Category::UtilizationTimer,
            Metric::Histogram(_) => Category::Histogram,
        }
    }

    /// Read one scalar off the live metric. `None` when this kind does not have the field.
    pub fn read(&self, field: InstantField) -> Option<DatapointValue> {
        Some(match field {
            InstantField::Count => DatapointValue::Integer(self.count()?),
            InstantField::OneMinuteRate => self.metered()?.one_minute_rate().into(),
            InstantField::FiveMinuteRate => self.metered()?.five_minute_rate().into(),
            InstantField::FifteenMinuteRate => self.metered()?.fifteen_minute_rate().into(),
            InstantField::MeanRate => self.metered()?.mean_rate().into(),
            InstantField::Min => self.sampling()?.min().into(),
            InstantField::Max => self.sampling()?.max().into(),
            InstantField::Mean => self.sampling()?.mean().into(),
            InstantField::StdDev => self.sampling()?.stddev().into(),
            InstantField::OneMinuteUtilization => self.utilizing()?.one_minute_utilization().into(),
            InstantField::FiveMinuteUtilization => {
                self.utilizing()?.five_minute_utilization().into()
            }
            InstantField::FifteenMinuteUtilization => {
                self.utilizing()?.fifteen_minute_utilization().into()
            }
            InstantField::MeanUtilization => self.utilizing()?.mean_utilization().into(),
            InstantField::Value => self.gauging()?.value().into(),
        })
    }

    /// Compute a snapshot, if this kind keeps samples.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.sampling().map(|sampling| sampling.snapshot())
    }

    fn count(&self) -> Option<i64> {
        Some(match self {
            Metric::Counter(counter) => counter.count(),
            Metric::Meter(meter) => meter.count(),
            Metric::Timer(timer) => timer.count(),
            Metric::UtilizationTimer(timer) => timer.count(),
            Metric::Histogram(histogram) => histogram.count(),
            Metric::Gauge(_) => return None,
        })
    }

    fn gauging(&self) -> Option<&dyn Gauging> {
        match self {
            Metric::Gauge(gauge) => Some(&**gauge),
            _ => None,
        }
    }

    fn metered(&self) -> Option<&dyn Metered> {
        let metered: &dyn Metered = match self {
            Metric::Meter(meter) => &**meter,
            Metric::Timer(timer) => &**timer,
            Metric::UtilizationTimer(timer) => &**timer,
            _ => return None,
        };
        Some(metered)
    }

    fn sampling(&self) -> Option<&dyn Sampling> {
        let sampling: &dyn Sampling = match self {
            Metric::Timer(timer) => &**timer,
            Metric::UtilizationTimer(timer) => &**timer,
            Metric::Histogram(histogram) => &**histogram,
            _ => return None,
        };
        Some(sampling)
    }

    fn utilizing(&self) -> Option<&dyn Utilizing> {
        match self {
            Metric::UtilizationTimer(timer) => Some(&**timer),
            _ => None,
        }
    }
}
