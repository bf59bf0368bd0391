// src/progress/mod.rs

//! Progress reporting for long-running operations.
//!
//! - [`hook`]: the host UI seam ([`ProgressHook`]).
//! - [`pattern`]: percent extraction from status lines ([`PercentPattern`]).
//! - [`reporter`]: the session state and its dispatcher-driven polling task
//!   ([`ProgressReporter`]).

pub mod hook;
pub mod pattern;
pub mod reporter;

pub use hook::ProgressHook;
pub use pattern::{DEFAULT_SCALE, PercentPattern};
pub use reporter::{DEFAULT_WAITING_STATUS, ProgressReporter, ProgressSnapshot};
