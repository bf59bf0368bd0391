use std::sync::Arc;

use hostexec::dispatch::{Dispatcher, NoopTickSource};
use hostexec::exec::{ProcessRunner, Request, RunnerOptions};

use crate::recording_tick::RecordingTickSource;

/// Request that runs `script` through `sh -c`.
///
/// The script is wrapped in double quotes, so it must not contain any
/// itself; use single quotes inside.
pub fn sh(script: &str) -> Request {
    assert!(
        !script.contains('"'),
        "sh() scripts must not contain double quotes: {script}"
    );
    Request::new("sh", format!("-c \"{script}\""))
}

/// Runner for a `sh -c` script with the given options.
pub fn sh_runner(script: &str, options: RunnerOptions) -> ProcessRunner {
    ProcessRunner::new(sh(script)).with_options(options)
}

/// Dispatcher plus the tick source it reports to.
pub fn recording_dispatcher() -> (Dispatcher, Arc<RecordingTickSource>) {
    let tick = Arc::new(RecordingTickSource::new());
    (Dispatcher::new(tick.clone()), tick)
}

pub fn noop_dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(NoopTickSource))
}
