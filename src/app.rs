//! Application composition, decoupled from the entry point.
//!
//! `AppBuilder` wires the collector, the scheduler and the exposition layer
//! together and offers overrides so integration tests can substitute a
//! scripted collector or a recording sink without a subprocess or a global
//! metrics recorder.

use crate::{
    collector::{Collector, CommandCollector},
    config::Config,
    exposition::{system::SystemCollector, GaugeSink, MetricsBuilder, PrometheusGauges},
    scheduler::{FailurePolicy, Scheduler},
    task_manager::TaskManager,
};
use anyhow::{bail, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// A handle to the running application.
pub struct App {
    task_manager: TaskManager,
    scheduler_handle: JoinHandle<Result<()>>,
    metrics_addr: Option<SocketAddr>,
    // Internal shutdown signal; also fired when the scheduler aborts so the
    // background tasks can be drained.
    shutdown_tx: watch::Sender<bool>,
}

impl App {
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder::new(config)
    }

    pub fn metrics_addr(&self) -> Option<SocketAddr> {
        self.metrics_addr
    }

    /// Runs until the caller's shutdown signal fires or the scheduler aborts.
    ///
    /// A scheduler abort (a tick failure under the `Abort` policy) is
    /// propagated to the caller after the remaining tasks are drained, so the
    /// process exits non-zero.
    pub async fn run(self) -> Result<()> {
        let mut shutdown_rx = self.task_manager.get_shutdown_rx();
        let mut scheduler_handle = self.scheduler_handle;

        let early_result = tokio::select! {
            biased;
            _ = shutdown_rx.changed() => None,
            result = &mut scheduler_handle => Some(result),
        };
        let scheduler_result = match early_result {
            Some(join_result) => {
                // Fatal abort: release the background tasks before draining.
                let _ = self.shutdown_tx.send(true);
                join_result.map_err(anyhow::Error::from).and_then(|r| r)
            }
            // Graceful path: the scheduler observes the same signal and
            // finishes its current tick before returning.
            None => scheduler_handle.await.map_err(anyhow::Error::from).and_then(|r| r),
        };

        self.task_manager.shutdown().await;
        info!("all tasks shut down");
        scheduler_result
    }
}

/// Builder for the application.
pub struct AppBuilder {
    config: Config,
    collector_override: Option<Arc<dyn Collector>>,
    sink_override: Option<Arc<dyn GaugeSink>>,
    failure_policy: FailurePolicy,
}

impl AppBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            collector_override: None,
            sink_override: None,
            failure_policy: FailurePolicy::Abort,
        }
    }

    /// Overrides the collector for testing.
    pub fn collector_override(mut self, collector: Arc<dyn Collector>) -> Self {
        self.collector_override = Some(collector);
        self
    }

    /// Overrides the gauge sink for testing.
    pub fn sink_override(mut self, sink: Arc<dyn GaugeSink>) -> Self {
        self.sink_override = Some(sink);
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Builds and starts all components, returning a runnable `App`.
    pub async fn build(self, shutdown_rx: watch::Receiver<bool>) -> Result<App> {
        let config = self.config;

        // Every task listens on an app-owned channel; the caller's signal is
        // forwarded into it so an internal abort can also fan out.
        let (internal_tx, internal_rx) = watch::channel(false);
        {
            let internal_tx = internal_tx.clone();
            let mut external_rx = shutdown_rx;
            tokio::spawn(async move {
                if external_rx.changed().await.is_ok() {
                    let _ = internal_tx.send(true);
                }
            });
        }

        let task_manager = TaskManager::new(internal_rx.clone());

        let metrics_addr =
            match MetricsBuilder::new(config.metrics.clone()).build(internal_rx.clone())? {
                Some((server, addr)) => {
                    info!(%addr, "metrics endpoint listening");
                    task_manager.spawn("MetricsServer", server.run());
                    if config.metrics.system_metrics_enabled {
                        let system_collector = SystemCollector::new();
                        let rx = internal_rx.clone();
                        task_manager.spawn("SystemCollector", system_collector.run(rx));
                    }
                    Some(addr)
                }
                None => None,
            };

        let collector: Arc<dyn Collector> = match self.collector_override {
            Some(collector) => collector,
            None => {
                // Fail fast before the first tick if the command is missing.
                let path = &config.collector.command_path;
                if !path.exists() {
                    bail!("command path {} does not exist", path.display());
                }
                let collector = CommandCollector::new(path.clone());
                info!(command = %collector.path().display(), "collector ready");
                Arc::new(collector)
            }
        };
        let sink: Arc<dyn GaugeSink> = self
            .sink_override
            .unwrap_or_else(|| Arc::new(PrometheusGauges));

        let scheduler = Scheduler::new(
            collector,
            sink,
            Duration::from_secs(config.collector.interval_seconds),
            config
                .collector
                .eviction_ttl_seconds
                .map(Duration::from_secs),
            self.failure_policy,
        );
        let scheduler_handle = tokio::spawn(scheduler.run(internal_rx));

        Ok(App {
            task_manager,
            scheduler_handle,
            metrics_addr,
            shutdown_tx: internal_tx,
        })
    }
}
