// src/dispatch/queue.rs

//! The host-thread work queue.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use tracing::{debug, trace};

use super::task::{DispatchEntry, ResumableTask};
use super::tick::TickSource;

/// Thread-safe queue of work that must run on the host thread.
///
/// Any thread may [`push`](Dispatcher::push); only the host calls
/// [`drain`](Dispatcher::drain), once per tick. While the queue holds work the
/// dispatcher keeps itself attached to the host [`TickSource`]; once a drain
/// pass leaves the queue empty it detaches, so an idle host is never polled.
///
/// Cloning is cheap and every clone shares the same queue.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<QueueState>,
    /// Held for the duration of a drain pass. Entries never run concurrently.
    drain_lock: Mutex<()>,
    tick: Arc<dyn TickSource>,
}

struct QueueState {
    entries: VecDeque<DispatchEntry>,
    attached: bool,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock_state();
        f.debug_struct("Dispatcher")
            .field("pending", &state.entries.len())
            .field("attached", &state.attached)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(tick: Arc<dyn TickSource>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState {
                    entries: VecDeque::new(),
                    attached: false,
                }),
                drain_lock: Mutex::new(()),
                tick,
            }),
        }
    }

    /// Queue a one-shot action for the next drain pass.
    pub fn push<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.enqueue(DispatchEntry::Once(Box::new(action)));
    }

    /// Queue a task that is advanced once per drain pass until it reports
    /// [`Step::Done`](super::Step::Done).
    pub fn push_task<T>(&self, task: T)
    where
        T: ResumableTask + 'static,
    {
        self.enqueue(DispatchEntry::Resumable(Box::new(task)));
    }

    /// Run one drain pass. Host thread only.
    ///
    /// Executes at most as many entries as were queued when the pass started,
    /// in FIFO order. Resumable tasks that are still pending go back to the
    /// tail; entries pushed during the pass wait for the next one. The queue
    /// lock is released while an entry runs, so entries may push.
    ///
    /// Returns the number of entries executed. A nested call from inside an
    /// entry is ignored and returns 0.
    pub fn drain(&self) -> usize {
        let _pass = match self.inner.drain_lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                debug!("drain already in progress; skipping nested drain");
                return 0;
            }
        };

        let snapshot = self.lock_state().entries.len();
        let mut executed = 0;

        for _ in 0..snapshot {
            let Some(entry) = self.lock_state().entries.pop_front() else {
                break;
            };

            trace!(kind = entry.kind(), "running dispatch entry");
            if let Some(pending) = entry.run() {
                self.lock_state().entries.push_back(pending);
            }
            executed += 1;
        }

        let mut state = self.lock_state();
        if state.entries.is_empty() && state.attached {
            state.attached = false;
            self.inner.tick.detach();
            debug!(executed, "dispatch queue empty; detached from host tick");
        }

        executed
    }

    pub fn len(&self) -> usize {
        self.lock_state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the dispatcher currently wants host ticks.
    pub fn is_attached(&self) -> bool {
        self.lock_state().attached
    }

    fn enqueue(&self, entry: DispatchEntry) {
        let kind = entry.kind();
        let mut state = self.lock_state();
        state.entries.push_back(entry);

        if !state.attached {
            state.attached = true;
            self.inner.tick.attach();
            debug!(kind, "dispatch entry pushed; attached to host tick");
        } else {
            trace!(kind, pending = state.entries.len(), "dispatch entry pushed");
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
