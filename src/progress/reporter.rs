// src/progress/reporter.rs

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::dispatch::{Dispatcher, Step};

use super::hook::ProgressHook;
use super::pattern::PercentPattern;

/// Status shown right after `show` until the first update.
pub const DEFAULT_WAITING_STATUS: &str = "Please, wait...";

type CancelCallback = Box<dyn FnOnce() + Send>;

/// Read-only copy of the current progress state.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub title: String,
    pub status: String,
    pub fraction: f32,
    pub cancelable: bool,
    pub closed: bool,
}

struct ProgressState {
    title: String,
    status: String,
    fraction: f32,
    on_cancel: Option<CancelCallback>,
    closed: bool,
    /// A polling task is queued on the dispatcher.
    polling: bool,
}

struct Shared {
    state: Mutex<ProgressState>,
    hook: Arc<dyn ProgressHook>,
    dispatcher: Dispatcher,
    waiting_status: String,
}

/// Progress / status display for one operation at a time.
///
/// `show` opens a session and registers a polling task on the dispatcher
/// that re-renders the state through the [`ProgressHook`] on every host tick.
/// `update*` may be called from any thread; rendering only ever happens on
/// the host thread. Sessions are not isolated: a second `show` while one is
/// open simply takes over the shared state.
#[derive(Clone)]
pub struct ProgressReporter {
    inner: Arc<Shared>,
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl ProgressReporter {
    pub fn new(dispatcher: Dispatcher, hook: Arc<dyn ProgressHook>) -> Self {
        Self::with_waiting_status(dispatcher, hook, DEFAULT_WAITING_STATUS)
    }

    pub fn with_waiting_status(
        dispatcher: Dispatcher,
        hook: Arc<dyn ProgressHook>,
        waiting_status: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Shared {
                state: Mutex::new(ProgressState {
                    title: String::new(),
                    status: String::new(),
                    fraction: 0.0,
                    on_cancel: None,
                    closed: true,
                    polling: false,
                }),
                hook,
                dispatcher,
                waiting_status: waiting_status.into(),
            }),
        }
    }

    /// Open a session without a cancel affordance.
    pub fn show(&self, title: impl Into<String>) {
        self.open(title.into(), None);
    }

    /// Open a session the user can cancel. `on_cancel` runs at most once, on
    /// the host thread, after the session was closed.
    pub fn show_cancelable<F>(&self, title: impl Into<String>, on_cancel: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.open(title.into(), Some(Box::new(on_cancel)));
    }

    pub fn update(&self, status: impl Into<String>) {
        self.lock_state().status = status.into();
    }

    /// Set the status and, if `pattern` finds a number in it, the progress.
    pub fn update_with_pattern(&self, status: impl Into<String>, pattern: &PercentPattern) {
        let status = status.into();
        let fraction = pattern.extract(&status);

        let mut state = self.lock_state();
        if let Some(fraction) = fraction {
            state.fraction = fraction;
        }
        state.status = status;
    }

    /// Set the status and progress (`0.0..=1.0`, clamped).
    pub fn update_fraction(&self, status: impl Into<String>, fraction: f32) {
        let mut state = self.lock_state();
        if fraction.is_finite() {
            state.fraction = fraction.clamp(0.0, 1.0);
        }
        state.status = status.into();
    }

    /// Close the session and schedule the hook to clear the bar.
    pub fn close(&self) {
        self.lock_state().closed = true;
        self.schedule_clear();
    }

    pub fn is_open(&self) -> bool {
        !self.lock_state().closed
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.lock_state();
        ProgressSnapshot {
            title: state.title.clone(),
            status: state.status.clone(),
            fraction: state.fraction,
            cancelable: state.on_cancel.is_some(),
            closed: state.closed,
        }
    }

    fn open(&self, title: String, on_cancel: Option<CancelCallback>) {
        let start_polling = {
            let mut state = self.lock_state();
            state.title = title;
            state.status = self.inner.waiting_status.clone();
            state.fraction = 0.0;
            state.on_cancel = on_cancel;
            state.closed = false;
            !std::mem::replace(&mut state.polling, true)
        };

        if start_polling {
            // Weak, so a dropped reporter does not keep its own dispatcher alive.
            let shared = Arc::downgrade(&self.inner);
            self.inner.dispatcher.push_task(move || match shared.upgrade() {
                Some(inner) => ProgressReporter { inner }.poll(),
                None => Step::Done,
            });
            debug!("progress session opened; polling task registered");
        } else {
            debug!("progress session replaced the active one");
        }
    }

    /// One host tick of the polling task.
    fn poll(&self) -> Step {
        let (title, status, fraction, cancelable) = {
            let mut state = self.lock_state();
            if state.closed {
                state.polling = false;
                return Step::Done;
            }
            (
                state.title.clone(),
                state.status.clone(),
                state.fraction,
                state.on_cancel.is_some(),
            )
        };

        if !cancelable {
            self.inner.hook.render(&title, &status, fraction);
            return Step::Pending;
        }

        if !self.inner.hook.render_cancelable(&title, &status, fraction) {
            return Step::Pending;
        }

        info!(title = %title, "progress cancelled by user");
        let on_cancel = {
            let mut state = self.lock_state();
            state.closed = true;
            state.polling = false;
            state.on_cancel.take()
        };
        self.schedule_clear();

        if let Some(on_cancel) = on_cancel {
            on_cancel();
        }
        Step::Done
    }

    fn schedule_clear(&self) {
        let hook = Arc::clone(&self.inner.hook);
        self.inner.dispatcher.push(move || hook.clear());
    }

    fn lock_state(&self) -> MutexGuard<'_, ProgressState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
