//! Process-level resource gauges.
//!
//! A small background task that periodically refreshes CPU and memory usage
//! for this process via `sysinfo` and publishes them as gauges, so a scrape
//! also shows the exporter's own footprint.

use std::time::Duration;
use sysinfo::System;
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, error};

const REFRESH_INTERVAL: Duration = Duration::from_secs(10);

pub struct SystemCollector {
    system: System,
}

impl SystemCollector {
    pub fn new() -> Self {
        Self {
            system: System::new_all(),
        }
    }

    /// Collection loop; spawn as a background task.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => pid,
            Err(e) => {
                error!("failed to determine current pid: {e}");
                return;
            }
        };

        let mut interval = time::interval(REFRESH_INTERVAL);
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => {
                    debug!("system collector received shutdown signal");
                    break;
                }
                _ = interval.tick() => {}
            }

            self.system.refresh_cpu();
            if self.system.refresh_process(pid) {
                if let Some(process) = self.system.process(pid) {
                    metrics::gauge!("process_cpu_usage_percent").set(process.cpu_usage() as f64);
                    metrics::gauge!("process_memory_usage_bytes").set(process.memory() as f64);
                }
            } else {
                error!("process {pid} no longer visible, stopping system collector");
                break;
            }
        }
    }
}

impl Default for SystemCollector {
    fn default() -> Self {
        Self::new()
    }
}
