//! Prometheus exposition for smoothed row counts.
//!
//! Two halves live here:
//!
//! - [`GaugeSink`], the seam between the scheduler and the metrics backend.
//!   Production uses [`PrometheusGauges`], which writes the `logrowcount`
//!   gauge through the `metrics` facade; tests substitute a recording sink.
//! - [`MetricsBuilder`], which wires up the `metrics-exporter-prometheus`
//!   recorder and the axum `/metrics` server (in `server.rs`).

use crate::config::MetricsConfig;
use crate::exposition::server::MetricsServer;
use crate::smoothing::MetricKey;
use anyhow::{Context, Result};
use metrics::Unit;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;

pub mod server;
pub mod system;

/// Receives (label tuple, smoothed value) pairs from the scheduler.
pub trait GaugeSink: Send + Sync {
    fn set(&self, key: &MetricKey, value: f64);
}

/// Sets one `logrowcount` time series per observed key.
pub struct PrometheusGauges;

impl GaugeSink for PrometheusGauges {
    fn set(&self, key: &MetricKey, value: f64) {
        metrics::gauge!(
            "logrowcount",
            "namespace" => key.namespace.clone(),
            "pod_name" => key.pod_name.clone(),
            "container_log" => key.container_log.clone(),
        )
        .set(value);
    }
}

/// Registers descriptions for every metric this process emits.
fn describe_metrics() {
    metrics::describe_gauge!(
        "logrowcount",
        Unit::Count,
        "Smoothed log row count per namespace, pod and container."
    );
    metrics::describe_counter!(
        "collections_total",
        Unit::Count,
        "Total number of completed collection ticks."
    );
    metrics::describe_counter!(
        "samples_collected_total",
        Unit::Count,
        "Total number of samples parsed from the external command."
    );
    metrics::describe_histogram!(
        "collection_duration_seconds",
        Unit::Seconds,
        "Wall-clock duration of each external command invocation."
    );
    metrics::describe_gauge!(
        "smoothing_keys",
        Unit::Count,
        "Number of metric keys currently held in the smoothing store."
    );
    metrics::describe_gauge!(
        "process_cpu_usage_percent",
        Unit::Percent,
        "CPU usage of the exporter process."
    );
    metrics::describe_gauge!(
        "process_memory_usage_bytes",
        Unit::Bytes,
        "Resident set size of the exporter process, in bytes."
    );
}

/// Builds the Prometheus recorder and the scrape server.
pub struct MetricsBuilder {
    config: MetricsConfig,
}

impl MetricsBuilder {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// Installs the global recorder and returns the scrape server with the
    /// address it is bound to, or `None` when exposition is disabled.
    ///
    /// The listener is bound before the recorder is installed so a bad listen
    /// address fails startup instead of leaving a half-initialized process.
    pub fn build(self, shutdown_rx: watch::Receiver<bool>) -> Result<Option<(MetricsServer, SocketAddr)>> {
        if !self.config.enabled {
            return Ok(None);
        }

        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
            )
            .context("invalid histogram buckets")?
            .build_recorder();
        let handle = recorder.handle();

        let listener = std::net::TcpListener::bind(self.config.listen_address)
            .with_context(|| format!("failed to bind metrics server to {}", self.config.listen_address))?;
        let addr = listener.local_addr()?;
        listener.set_nonblocking(true)?;
        let listener = TcpListener::from_std(listener)?;

        metrics::set_global_recorder(recorder)
            .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {e}"))?;
        describe_metrics();

        Ok(Some((MetricsServer::new(listener, handle, shutdown_rx), addr)))
    }
}
