// src/exec/streams.rs

//! Line readers for the async path.
//!
//! Each output stream of a child gets its own Tokio task that splits the
//! stream into lines, hands them to a per-stream callback and finally flips a
//! "closed" flag that the watchdog waits on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, trace};

use crate::types::StreamKind;

/// Output accumulated over the lifetime of an async run.
#[derive(Debug, Default)]
pub(crate) struct Captured {
    stdout: Mutex<String>,
    stderr: Mutex<String>,
}

impl Captured {
    pub(crate) fn append(&self, kind: StreamKind, line: &str) {
        let buf = match kind {
            StreamKind::Stdout => &self.stdout,
            StreamKind::Stderr => &self.stderr,
        };
        let mut buf = buf.lock().unwrap_or_else(PoisonError::into_inner);
        buf.push_str(line);
        buf.push('\n');
    }

    /// Take both buffers, leaving them empty.
    pub(crate) fn take(&self) -> (String, String) {
        let stdout = std::mem::take(&mut *self.stdout.lock().unwrap_or_else(PoisonError::into_inner));
        let stderr = std::mem::take(&mut *self.stderr.lock().unwrap_or_else(PoisonError::into_inner));
        (stdout, stderr)
    }
}

/// End-of-stream flags for both pipes of one run.
#[derive(Debug, Default)]
pub(crate) struct StreamsClosed {
    stdout: AtomicBool,
    stderr: AtomicBool,
}

impl StreamsClosed {
    pub(crate) fn mark(&self, kind: StreamKind) {
        match kind {
            StreamKind::Stdout => self.stdout.store(true, Ordering::Release),
            StreamKind::Stderr => self.stderr.store(true, Ordering::Release),
        }
    }

    pub(crate) fn both(&self) -> bool {
        self.stdout.load(Ordering::Acquire) && self.stderr.load(Ordering::Acquire)
    }
}

/// Spawn a reader for one child stream.
///
/// Lines are decoded lossily and stripped of their line terminator. A missing
/// pipe counts as already closed; a read error is logged and treated as end
/// of stream.
pub(crate) fn spawn_line_reader<R, F>(
    kind: StreamKind,
    stream: Option<R>,
    closed: Arc<StreamsClosed>,
    mut on_line: F,
) where
    R: AsyncRead + Unpin + Send + 'static,
    F: FnMut(&str) + Send + 'static,
{
    let Some(stream) = stream else {
        debug!(stream = %kind, "no pipe attached; marking stream closed");
        closed.mark(kind);
        return;
    };

    tokio::spawn(async move {
        let mut segments = BufReader::new(stream).split(b'\n');

        loop {
            match segments.next_segment().await {
                Ok(Some(mut bytes)) => {
                    if bytes.last() == Some(&b'\r') {
                        bytes.pop();
                    }
                    let line = String::from_utf8_lossy(&bytes);
                    trace!(stream = %kind, "{}", line);
                    on_line(&line);
                }
                Ok(None) => break,
                Err(e) => {
                    debug!(stream = %kind, error = %e, "stream read failed; treating as closed");
                    break;
                }
            }
        }

        closed.mark(kind);
        debug!(stream = %kind, "stream closed");
    });
}
