use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::ThreadId;

use hostexec::progress::ProgressHook;

/// One call to `render` / `render_cancelable`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub title: String,
    pub status: String,
    pub fraction: f32,
    pub cancelable: bool,
    pub thread: ThreadId,
}

/// Progress hook that records every frame and can be scripted to report a
/// cancel request on the n-th cancelable render.
#[derive(Debug, Default)]
pub struct RecordingHook {
    frames: Mutex<Vec<Frame>>,
    clears: AtomicUsize,
    cancel_on_render: Mutex<Option<usize>>,
}

impl RecordingHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report "cancel" from the `n`-th (1-based) cancelable render.
    pub fn cancel_on_render(self, n: usize) -> Self {
        *self.cancel_on_render.lock().unwrap() = Some(n);
        self
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.frames.lock().unwrap().last().cloned()
    }

    pub fn render_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    fn record(&self, title: &str, status: &str, fraction: f32, cancelable: bool) -> usize {
        let mut frames = self.frames.lock().unwrap();
        frames.push(Frame {
            title: title.to_string(),
            status: status.to_string(),
            fraction,
            cancelable,
            thread: std::thread::current().id(),
        });
        frames.iter().filter(|f| f.cancelable).count()
    }
}

impl ProgressHook for RecordingHook {
    fn render(&self, title: &str, status: &str, fraction: f32) {
        self.record(title, status, fraction, false);
    }

    fn render_cancelable(&self, title: &str, status: &str, fraction: f32) -> bool {
        let cancelable_renders = self.record(title, status, fraction, true);
        *self.cancel_on_render.lock().unwrap() == Some(cancelable_renders)
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}
