//! The axum server behind the `/metrics` scrape endpoint.

use axum::{routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::future::Future;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, trace};

/// Serves the Prometheus exposition format until shutdown is signalled.
pub struct MetricsServer {
    listener: TcpListener,
    prom_handle: PrometheusHandle,
    shutdown_rx: watch::Receiver<bool>,
}

impl MetricsServer {
    /// Takes an already-bound listener so the caller can report the final
    /// address before the server task starts.
    pub fn new(
        listener: TcpListener,
        prom_handle: PrometheusHandle,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            listener,
            prom_handle,
            shutdown_rx,
        }
    }

    /// Returns a future that runs the server until a shutdown signal arrives.
    pub fn run(mut self) -> impl Future<Output = ()> {
        let app = Router::new().route(
            "/metrics",
            get(move || async move { self.prom_handle.render() }),
        );

        async move {
            tokio::select! {
                biased;
                _ = self.shutdown_rx.changed() => {
                    trace!("metrics server received shutdown signal");
                }
                result = axum::serve(self.listener, app.into_make_service()) => {
                    if let Err(e) = result {
                        error!("metrics server error: {e}");
                    }
                }
            }
            trace!("metrics server task finished");
        }
    }
}
