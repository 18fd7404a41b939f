#![allow(dead_code)]
//! Scripted collectors for driving the scheduler without a subprocess.

use async_trait::async_trait;
use logrow_exporter::collector::{Collector, CollectorError, Sample};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One pre-scripted response per collection tick.
pub enum Response {
    Samples(Vec<Sample>),
    ExecutionFailure,
    ParseFailure,
}

/// A [`Collector`] that replays a fixed sequence of responses.
///
/// Once the script is exhausted it keeps returning empty batches, so a
/// scheduler running in the background stays harmless until shutdown.
pub struct ScriptedCollector {
    responses: Mutex<VecDeque<Response>>,
}

impl ScriptedCollector {
    pub fn new(responses: Vec<Response>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl Collector for ScriptedCollector {
    async fn collect(&self) -> Result<Vec<Sample>, CollectorError> {
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Response::Samples(samples)) => Ok(samples),
            Some(Response::ExecutionFailure) => Err(CollectorError::Execution {
                path: "scripted".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "scripted failure"),
            }),
            Some(Response::ParseFailure) => {
                Err(logrow_exporter::collector::parse_samples(b"not json").unwrap_err())
            }
            None => Ok(Vec::new()),
        }
    }
}

/// Builds a sample with the standard test triple.
pub fn sample(ns: &str, pod: &str, container: &str, row_count: u64) -> Sample {
    serde_json::from_value(serde_json::json!({
        "namespace": ns,
        "pod_name": pod,
        "container_log": container,
        "row_count": row_count,
    }))
    .unwrap()
}
