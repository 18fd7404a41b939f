//! The fixed-interval collection loop.
//!
//! One tick runs the collector to completion, folds every sample into the
//! smoothing store in the order the command emitted them, and publishes each
//! new smoothed value to the gauge sink. Ticks are strictly sequential: the
//! collect future is awaited before any store update, and the whole tick
//! finishes before the interval sleep begins, so the effective period is at
//! least the configured interval and drifts by tick duration. There is no
//! per-tick deadline; a hung command blocks its tick indefinitely.

use crate::collector::{Collector, CollectorError};
use crate::exposition::GaugeSink;
use crate::smoothing::{MetricKey, SmoothingStore};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn, Level};

/// What to do when a tick fails.
///
/// The collector's errors have no recoverable class by default: any failure
/// aborts the loop and, from `main`, the process. `Continue` is the
/// documented opt-in deviation (log and skip the tick), also used by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    #[default]
    Abort,
    Continue,
}

pub struct Scheduler {
    collector: Arc<dyn Collector>,
    sink: Arc<dyn GaugeSink>,
    store: SmoothingStore,
    interval: Duration,
    eviction_ttl: Option<Duration>,
    policy: FailurePolicy,
}

impl Scheduler {
    pub fn new(
        collector: Arc<dyn Collector>,
        sink: Arc<dyn GaugeSink>,
        interval: Duration,
        eviction_ttl: Option<Duration>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            collector,
            sink,
            store: SmoothingStore::new(),
            interval,
            eviction_ttl,
            policy,
        }
    }

    pub fn store(&self) -> &SmoothingStore {
        &self.store
    }

    /// Runs a single tick: collect, fold, publish, optionally prune.
    ///
    /// Returns the number of samples processed.
    pub async fn tick(&mut self) -> Result<usize, CollectorError> {
        let started = Instant::now();
        let samples = self.collector.collect().await?;
        metrics::histogram!("collection_duration_seconds").record(started.elapsed().as_secs_f64());
        metrics::counter!("collections_total").increment(1);
        metrics::counter!("samples_collected_total").increment(samples.len() as u64);

        let count = samples.len();
        for sample in samples {
            let key = MetricKey::from(&sample);
            debug!(%key, row_count = sample.row_count, "collected sample");
            let value = self.store.update(key.clone(), sample.row_count);
            debug!(%key, value, "stored smoothed value");
            self.sink.set(&key, value);
        }

        if let Some(ttl) = self.eviction_ttl {
            let evicted = self.store.prune(ttl);
            for key in &evicted {
                debug!(%key, "evicted stale metric key");
            }
        }
        metrics::gauge!("smoothing_keys").set(self.store.len() as f64);

        Ok(count)
    }

    /// Drives ticks until shutdown is signalled, or until a tick fails under
    /// the `Abort` policy.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) -> anyhow::Result<()> {
        info!(interval_seconds = self.interval.as_secs(), "scheduler started");
        loop {
            match self.tick().await {
                Ok(count) => debug!(samples = count, "tick complete"),
                Err(err) => match self.policy {
                    FailurePolicy::Abort => {
                        error!(error = %err, "tick failed, aborting");
                        return Err(err.into());
                    }
                    FailurePolicy::Continue => {
                        warn!(error = %err, "tick failed, skipping");
                    }
                },
            }

            if tracing::enabled!(Level::DEBUG) {
                for (key, value) in self.store.snapshot() {
                    debug!(%key, value, "store entry");
                }
            }

            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => {
                    info!("scheduler received shutdown signal");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        Ok(())
    }
}
