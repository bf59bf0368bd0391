// src/dispatch/tick.rs

//! Host tick source abstraction.
//!
//! The dispatcher only needs to tell the host "please start calling
//! `drain()` on every tick" and "you can stop now". How ticks are produced
//! (an editor update hook, a tokio interval, a test harness calling `drain`
//! by hand) is up to the implementation.

/// Periodic callback source the dispatcher attaches to while it has work.
///
/// - `attach` must be idempotent.
/// - after `detach`, the host should stop draining until the next `attach`.
pub trait TickSource: Send + Sync {
    fn attach(&self);
    fn detach(&self);
}

/// Tick source for hosts that drain unconditionally (or tests that drive
/// `drain` by hand and don't care about attach/detach).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTickSource;

impl TickSource for NoopTickSource {
    fn attach(&self) {}
    fn detach(&self) {}
}
