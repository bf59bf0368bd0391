// src/dispatch/mod.rs

//! Host-thread dispatch.
//!
//! Work produced on background threads (process readers, exit watchers,
//! progress updates) is never applied to host-owned state directly. It is
//! pushed into a [`Dispatcher`], and the host drains that queue from its own
//! tick loop.
//!
//! - [`task`] defines the one-step [`ResumableTask`] interface used for
//!   multi-tick work such as the progress polling loop.
//! - [`queue`] owns the [`Dispatcher`] itself.
//! - [`tick`] defines the [`TickSource`] seam the dispatcher attaches to.

pub mod queue;
pub mod task;
pub mod tick;

pub use queue::Dispatcher;
pub use task::{ResumableTask, Step};
pub use tick::{NoopTickSource, TickSource};
