// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`request`] describes what to run ([`Request`]) and splits the argument
//!   string.
//! - [`runner`] owns [`ProcessRunner`]: blocking `execute`, non-blocking
//!   `execute_async`, and `abort`.
//! - [`streams`] contains the per-stream line readers used by the async path.
//! - [`watchdog`] bounds the wait for both streams to close after exit.
//! - [`outcome`] classifies a finished run ([`RunOutcome`]).

use std::time::Duration;

pub mod control;
pub mod outcome;
pub mod request;
pub mod runner;
mod streams;
mod watchdog;

pub use control::AbortHandle;
pub use outcome::{RunOutcome, finalize};
pub use request::{Request, split_args};
pub use runner::{ProcessRunner, RunHandle, RunHandlers};

/// Timing knobs for [`ProcessRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// How long async finalization waits for both streams to close after the
    /// process exited.
    pub watchdog_timeout: Duration,
    /// Poll interval of that wait.
    pub watchdog_poll: Duration,
    /// Poll interval of the blocking path while waiting for exit.
    pub sync_poll: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            watchdog_timeout: Duration::from_millis(2000),
            watchdog_poll: Duration::from_millis(50),
            sync_poll: Duration::from_millis(10),
        }
    }
}
