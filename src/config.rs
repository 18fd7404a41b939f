//! Configuration for the exporter.
//!
//! Settings are read once at startup and never change for the process
//! lifetime. `figment` layers them in increasing precedence: built-in
//! defaults, a `logrow-exporter.toml` file, `LOGROW_`-prefixed environment
//! variables, then command-line arguments.

use crate::cli::Cli;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "logrow-exporter.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Log level filter (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,
    pub collector: CollectorConfig,
    pub metrics: MetricsConfig,
}

/// Settings for the collection loop.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CollectorConfig {
    /// Path to the external command producing the JSON sample array.
    pub command_path: PathBuf,
    /// Sleep between ticks, in seconds.
    pub interval_seconds: u64,
    /// Optional TTL after which keys without updates are evicted from the
    /// smoothing store. Unset preserves the original behavior of keeping
    /// every key for the process lifetime.
    #[serde(default)]
    pub eviction_ttl_seconds: Option<u64>,
}

/// Settings for the Prometheus scrape endpoint.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub listen_address: SocketAddr,
    /// Publish process CPU/memory gauges alongside the row-count metric.
    pub system_metrics_enabled: bool,
}

impl Config {
    /// Loads the layered configuration, with CLI arguments on top.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_file = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed("LOGROW_").split("__"))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            collector: CollectorConfig {
                command_path: PathBuf::from("./scripts/job.sh"),
                interval_seconds: 10,
                eviction_ttl_seconds: None,
            },
            metrics: MetricsConfig {
                enabled: true,
                listen_address: "0.0.0.0:9300".parse().expect("valid default address"),
                system_metrics_enabled: true,
            },
        }
    }
}
