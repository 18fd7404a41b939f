#![allow(dead_code)]
//! A gauge sink that records every published value.

use logrow_exporter::exposition::GaugeSink;
use logrow_exporter::smoothing::MetricKey;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Records (key, value) pairs in publication order.
#[derive(Clone, Default)]
pub struct RecordingSink {
    sets: Arc<Mutex<Vec<(MetricKey, f64)>>>,
    notifier: Arc<Notify>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sets(&self) -> Vec<(MetricKey, f64)> {
        self.sets.lock().unwrap().clone()
    }

    /// Latest value published for `key`, if any.
    pub fn latest(&self, key: &MetricKey) -> Option<f64> {
        self.sets
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    pub async fn wait_for_count(&self, target: usize, timeout: Duration) {
        let wait = async {
            while self.sets.lock().unwrap().len() < target {
                self.notifier.notified().await;
            }
        };
        tokio::time::timeout(timeout, wait)
            .await
            .expect("timed out waiting for gauge sets");
    }
}

impl GaugeSink for RecordingSink {
    fn set(&self, key: &MetricKey, value: f64) {
        self.sets.lock().unwrap().push((key.clone(), value));
        self.notifier.notify_one();
    }
}
