// src/host/terminal.rs

//! Progress hook that draws a single status line on stderr.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::progress::ProgressHook;

const BAR_WIDTH: usize = 24;

/// Renders `title [#####     ]  42% status` on stderr, redrawing in place.
///
/// There is no button to press in a terminal; [`request_cancel`] (wired to
/// Ctrl-C by the CLI) plays that role and is reported by the next
/// `render_cancelable`.
///
/// [`request_cancel`]: TerminalProgress::request_cancel
#[derive(Debug, Default)]
pub struct TerminalProgress {
    cancel_requested: AtomicBool,
    last_line: Mutex<String>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    fn draw(&self, title: &str, status: &str, fraction: f32, cancelable: bool) {
        let line = format_line(title, status, fraction, cancelable);
        let mut last = self.last_line.lock().unwrap_or_else(PoisonError::into_inner);
        if *last == line {
            return;
        }

        let mut err = std::io::stderr().lock();
        // Write failures are not actionable for a status line.
        let _ = write!(err, "\r\x1b[2K{line}");
        let _ = err.flush();
        *last = line;
    }
}

impl ProgressHook for TerminalProgress {
    fn render(&self, title: &str, status: &str, fraction: f32) {
        self.draw(title, status, fraction, false);
    }

    fn render_cancelable(&self, title: &str, status: &str, fraction: f32) -> bool {
        self.draw(title, status, fraction, true);
        self.cancel_requested.swap(false, Ordering::SeqCst)
    }

    fn clear(&self) {
        let mut last = self.last_line.lock().unwrap_or_else(PoisonError::into_inner);
        if last.is_empty() {
            return;
        }
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\r\x1b[2K");
        let _ = err.flush();
        last.clear();
    }
}

/// Build the status line for one frame.
pub fn format_line(title: &str, status: &str, fraction: f32, cancelable: bool) -> String {
    let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
    let filled = (fraction * BAR_WIDTH as f32).round() as usize;
    let percent = (fraction * 100.0).round() as u32;

    let mut line = format!(
        "{title} [{}{}] {percent:>3}% {status}",
        "#".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
    );
    if cancelable {
        line.push_str("  (Ctrl-C to cancel)");
    }
    line
}
