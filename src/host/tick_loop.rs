// src/host/tick_loop.rs

//! Tokio-based host tick source.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::trace;

use crate::dispatch::{Dispatcher, TickSource};

/// Host tick loop for programs whose "host thread" is a Tokio task.
///
/// While a dispatcher is attached the loop drains it every `interval`; while
/// detached it sleeps until the next `attach`. Whatever thread awaits
/// [`run_until`](TickLoop::run_until) is the host thread.
#[derive(Debug)]
pub struct TickLoop {
    interval: Duration,
    attached: AtomicBool,
    wake: Notify,
    ticks: AtomicU64,
}

impl TickLoop {
    pub fn new(interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            interval,
            attached: AtomicBool::new(false),
            wake: Notify::new(),
            ticks: AtomicU64::new(0),
        })
    }

    /// Number of drain passes performed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Drive `dispatcher` until `until` completes, then return its output.
    ///
    /// Drains happen on the calling task between polls of `until`.
    pub async fn run_until<F>(&self, dispatcher: &Dispatcher, until: F) -> F::Output
    where
        F: Future,
    {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(until);

        loop {
            tokio::select! {
                biased;
                out = &mut until => return out,
                _ = self.next_tick(&mut ticker) => {
                    let executed = dispatcher.drain();
                    self.ticks.fetch_add(1, Ordering::Relaxed);
                    trace!(executed, "host tick");
                }
            }
        }
    }

    async fn next_tick(&self, ticker: &mut Interval) {
        while !self.is_attached() {
            self.wake.notified().await;
        }
        ticker.tick().await;
    }
}

impl TickSource for TickLoop {
    fn attach(&self) {
        if !self.attached.swap(true, Ordering::SeqCst) {
            self.wake.notify_one();
        }
    }

    fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }
}
