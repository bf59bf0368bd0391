// src/exec/control.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Shared abort / kill state of a single run.
///
/// `aborted` records an explicit cancellation. `kill_requested` is also set
/// when an error line is judged fatal; only the former changes how the run
/// is classified.
#[derive(Debug, Default)]
pub(crate) struct RunControl {
    aborted: AtomicBool,
    kill_requested: AtomicBool,
    kill: Notify,
}

impl RunControl {
    pub(crate) fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
        self.request_kill();
    }

    pub(crate) fn request_kill(&self) {
        if !self.kill_requested.swap(true, Ordering::SeqCst) {
            // Stores a permit if the exit watcher isn't waiting yet.
            self.kill.notify_one();
        }
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    pub(crate) fn kill_requested(&self) -> bool {
        self.kill_requested.load(Ordering::SeqCst)
    }

    /// Resolves once a kill has been requested.
    pub(crate) async fn killed(&self) {
        if self.kill_requested() {
            return;
        }
        self.kill.notified().await;
    }
}

/// Cloneable, thread-safe handle that aborts one run.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    control: Arc<RunControl>,
}

impl AbortHandle {
    pub(crate) fn new(control: Arc<RunControl>) -> Self {
        Self { control }
    }

    /// Mark the run as aborted and kill the process (best effort).
    pub fn abort(&self) {
        self.control.abort();
    }

    pub fn is_aborted(&self) -> bool {
        self.control.is_aborted()
    }
}
