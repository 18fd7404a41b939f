//! Invocation of the external row-count command and parsing of its output.
//!
//! The collector runs a configured executable with no arguments, captures its
//! entire stdout and parses it as a JSON array of samples. Parsing is
//! all-or-nothing: one malformed element or trailing garbage rejects the
//! whole batch.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use thiserror::Error;
use tokio::process::Command;

/// One measurement parsed from a single command invocation.
///
/// The container-identity field has two historical JSON spellings
/// (`container_log` and `container_name`); both deserialize into the same
/// field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sample {
    pub namespace: String,
    pub pod_name: String,
    #[serde(alias = "container_name")]
    pub container_log: String,
    pub row_count: u64,
}

/// Errors surfaced by a collection attempt.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// The command could not be spawned at all.
    #[error("failed to execute {path}: {source}")]
    Execution {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The command ran but exited with a non-zero status.
    #[error("{path} exited with {status}")]
    Failed { path: String, status: ExitStatus },
    /// Stdout was not a well-formed JSON array of samples.
    #[error("invalid collector output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Produces a batch of samples on demand.
#[async_trait]
pub trait Collector: Send + Sync {
    async fn collect(&self) -> Result<Vec<Sample>, CollectorError>;
}

/// Parses a captured stdout buffer into samples.
///
/// Whole-buffer semantics: `serde_json` rejects trailing bytes after the
/// array, so a partially valid buffer never yields a partial batch.
pub fn parse_samples(buf: &[u8]) -> Result<Vec<Sample>, CollectorError> {
    Ok(serde_json::from_slice(buf)?)
}

/// A [`Collector`] that runs an external executable and parses its stdout.
pub struct CommandCollector {
    path: PathBuf,
}

impl CommandCollector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Collector for CommandCollector {
    async fn collect(&self) -> Result<Vec<Sample>, CollectorError> {
        let output = Command::new(&self.path).output().await.map_err(|source| {
            CollectorError::Execution {
                path: self.path.display().to_string(),
                source,
            }
        })?;

        if !output.status.success() {
            return Err(CollectorError::Failed {
                path: self.path.display().to_string(),
                status: output.status,
            });
        }

        parse_samples(&output.stdout)
    }
}
