//! The in-memory smoothing state for observed row counts.
//!
//! Each metric identity keeps exactly one smoothed value. An update is a
//! read-modify-write of that single entry: the first observation for a key
//! bootstraps the series, every later observation is averaged against the
//! stored value (a two-point moving average, not an exponential one) and the
//! result is rounded to two decimals.

use crate::collector::Sample;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// The identity of one exposed time series.
///
/// A pure function of the (namespace, pod, container) triple; used both as
/// the store key and as the gauge label tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricKey {
    pub namespace: String,
    pub pod_name: String,
    pub container_log: String,
}

impl From<&Sample> for MetricKey {
    fn from(sample: &Sample) -> Self {
        Self {
            namespace: sample.namespace.clone(),
            pod_name: sample.pod_name.clone(),
            container_log: sample.container_log.clone(),
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.namespace, self.pod_name, self.container_log
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    value: f64,
    updated_at: Instant,
}

/// Keyed map from metric identity to its last smoothed value.
///
/// Owned by the scheduler and mutated only from its sequential tick loop.
/// Keys are never evicted unless a TTL is configured, so the map grows with
/// the set of identities ever observed.
#[derive(Debug, Default)]
pub struct SmoothingStore {
    entries: HashMap<MetricKey, Entry>,
}

/// Rounds half away from zero, matching `f64::round`.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl SmoothingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one observation into the store and returns the new smoothed
    /// value for immediate publication.
    ///
    /// Presence, not the stored value, decides the bootstrap branch: a series
    /// that legitimately smooths to `0.0` keeps averaging instead of
    /// restarting.
    pub fn update(&mut self, key: MetricKey, observed: u64) -> f64 {
        let next = match self.entries.get(&key) {
            Some(entry) => round2((entry.value + observed as f64) / 2.0),
            None => round2(observed as f64),
        };
        self.entries.insert(
            key,
            Entry {
                value: next,
                updated_at: Instant::now(),
            },
        );
        next
    }

    pub fn get(&self, key: &MetricKey) -> Option<f64> {
        self.entries.get(key).map(|entry| entry.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every key not updated within `ttl` and returns the evicted
    /// keys. Only called when eviction is explicitly configured.
    pub fn prune(&mut self, ttl: Duration) -> Vec<MetricKey> {
        let now = Instant::now();
        let stale: Vec<MetricKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.updated_at) > ttl)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            self.entries.remove(key);
        }
        stale
    }

    /// Key-sorted view of the current state, for debug dumps and tests.
    pub fn snapshot(&self) -> Vec<(MetricKey, f64)> {
        let mut entries: Vec<(MetricKey, f64)> = self
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.value))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}
