use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use crate::Metric;

/// A source of named metrics to report.
///
/// Implementations must tolerate being walked while other threads register
/// or update metrics.
pub trait MetricRegistry: Send + Sync {
    /// Visit every registered metric once.
    fn each_metric(&self, visit: &mut dyn FnMut(&str, &Metric));
}

/// A straightforward thread safe registry.
///
/// It is cheap to clone around: clones share their metrics.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    metrics: Arc<RwLock<BTreeMap<String, Metric>>>,
}

impl Registry {
    /// Register a metric under a name, replacing whatever was there.
    pub fn register(&self, name: impl Into<String>, metric: Metric) -> Option<Metric> {
        self.metrics
            .write()
            .expect("local rwlock should not be poisoned")
            .insert(name.into(), metric)
    }

    /// Stop reporting a metric.
    pub fn remove(&self, name: &str) -> Option<Metric> {
        self.metrics
            .write()
            .expect("local rwlock should not be poisoned")
            .remove(name)
    }

    /// Look up a registered metric
    pub fn get(&self, name: &str) -> Option<Metric> {
        self.metrics
            .read()
            .expect("local rwlock should not be poisoned")
            .get(name)
            .cloned()
    }

    /// How many metrics are registered
    pub fn len(&self) -> usize {
        self.metrics
            .read()
            .expect("local rwlock should not be poisoned")
            .len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetricRegistry for Registry {
    fn each_metric(&self, visit: &mut dyn FnMut(&str, &Metric)) {
        // Visit a copy so slow extraction never holds writers off.
        let metrics: Vec<(String, Metric)> = self
            .metrics
            .read()
            .expect("local rwlock should not be poisoned")
            .iter()
            .map(|(name, metric)| (name.clone(), metric.clone()))
            .collect();
        for (name, metric) in &metrics {
            visit(name, metric);
        }
    }
}
