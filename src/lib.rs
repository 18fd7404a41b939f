//! logrow-exporter - periodic log row-count collector with Prometheus exposition.
//!
//! Runs a configured external command on a fixed interval, parses its JSON
//! output into samples, smooths each row count against its prior value with a
//! two-point moving average, and serves the smoothed values on a `/metrics`
//! scrape endpoint.

pub mod app;
pub mod cli;
pub mod collector;
pub mod config;
pub mod exposition;
pub mod scheduler;
pub mod smoothing;
pub mod task_manager;

pub use collector::{Collector, CollectorError, CommandCollector, Sample};
pub use scheduler::{FailurePolicy, Scheduler};
pub use smoothing::{MetricKey, SmoothingStore};
