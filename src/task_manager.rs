//! Lifecycle tracking for background tasks.

use futures::future::join_all;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Keeps the `JoinHandle` of every spawned background task so shutdown can
/// await them all and report any panics.
#[derive(Clone, Debug)]
pub struct TaskManager {
    handles: Arc<Mutex<Vec<(&'static str, JoinHandle<()>)>>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl TaskManager {
    pub fn new(shutdown_rx: watch::Receiver<bool>) -> Self {
        Self {
            handles: Arc::new(Mutex::new(Vec::new())),
            shutdown_rx,
        }
    }

    /// Spawns a named task and tracks its handle.
    pub fn spawn<F>(&self, name: &'static str, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        debug!(task_name = name, "spawning task");
        let handle = tokio::spawn(future);
        self.handles
            .lock()
            .expect("task handle lock poisoned")
            .push((name, handle));
    }

    pub fn get_shutdown_rx(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// Awaits every tracked task.
    pub async fn shutdown(self) {
        let handles: Vec<_> = self
            .handles
            .lock()
            .expect("task handle lock poisoned")
            .drain(..)
            .collect();
        info!(tasks = handles.len(), "waiting for background tasks");

        let names: Vec<&'static str> = handles.iter().map(|(name, _)| *name).collect();
        let results = join_all(handles.into_iter().map(|(_, handle)| handle)).await;
        for (name, result) in names.into_iter().zip(results) {
            match result {
                Ok(()) => debug!(task_name = name, "task shut down"),
                Err(e) => error!(task_name = name, "task panicked during shutdown: {e}"),
            }
        }
    }
}
