use std::sync::atomic::{AtomicUsize, Ordering};

use hostexec::dispatch::TickSource;

/// Tick source that only counts attach / detach calls.
///
/// Tests drive `Dispatcher::drain` themselves and use the counters to check
/// that the dispatcher attaches and detaches at the right moments.
#[derive(Debug, Default)]
pub struct RecordingTickSource {
    attaches: AtomicUsize,
    detaches: AtomicUsize,
}

impl RecordingTickSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attaches(&self) -> usize {
        self.attaches.load(Ordering::SeqCst)
    }

    pub fn detaches(&self) -> usize {
        self.detaches.load(Ordering::SeqCst)
    }
}

impl TickSource for RecordingTickSource {
    fn attach(&self) {
        self.attaches.fetch_add(1, Ordering::SeqCst);
    }

    fn detach(&self) {
        self.detaches.fetch_add(1, Ordering::SeqCst);
    }
}
