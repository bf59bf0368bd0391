// src/exec/watchdog.rs

use std::time::Duration;

use tokio::time::{Instant, sleep};

use super::streams::StreamsClosed;

/// Poll until both streams report end-of-stream or `timeout` elapses.
///
/// Returns `false` when the cap was hit; the caller finalizes with whatever
/// was captured so far.
pub(crate) async fn wait_for_streams(closed: &StreamsClosed, timeout: Duration, poll: Duration) -> bool {
    let started = Instant::now();

    loop {
        if closed.both() {
            return true;
        }
        if started.elapsed() >= timeout {
            return false;
        }
        sleep(poll).await;
    }
}
