// src/host/mod.rs

//! Host-side plumbing: the explicit context object, a Tokio tick loop that
//! plays the host tick source, and a terminal progress hook.

pub mod context;
pub mod terminal;
pub mod tick_loop;

pub use context::HostContext;
pub use terminal::TerminalProgress;
pub use tick_loop::TickLoop;
