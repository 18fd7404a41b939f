//! Command-line argument parsing.
//!
//! Arguments are parsed with `clap` and then merged on top of the file and
//! environment layers by implementing `figment::Provider`, so the CLI always
//! has the final word. Flag names follow the original exporter
//! (`--web.listen-address`, `--interval`, `--pathname`, `--debug`).

use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Prometheus exporter for smoothed log row counts.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address on which to expose metrics.
    #[arg(long = "web.listen-address", value_name = "ADDR")]
    pub listen_address: Option<SocketAddr>,

    /// Interval for metrics collection in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub interval: Option<u64>,

    /// Path to the external command producing the JSON sample array.
    #[arg(long, value_name = "PATH")]
    pub pathname: Option<PathBuf>,

    /// Force debug-level logging.
    #[arg(long)]
    pub debug: bool,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(addr) = self.listen_address {
            dict.insert(
                "metrics.listen_address".into(),
                Value::from(addr.to_string()),
            );
        }

        if let Some(interval) = self.interval {
            dict.insert("collector.interval_seconds".into(), Value::from(interval));
        }

        if let Some(path) = &self.pathname {
            dict.insert(
                "collector.command_path".into(),
                Value::from(path.display().to_string()),
            );
        }

        if self.debug {
            dict.insert("log_level".into(), Value::from("debug"));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
