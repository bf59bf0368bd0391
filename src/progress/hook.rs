// src/progress/hook.rs

/// Host UI surface the progress reporter draws on.
///
/// All methods are called from inside dispatcher drains, i.e. on the host
/// thread.
pub trait ProgressHook: Send + Sync {
    /// Draw a progress bar without a cancel affordance.
    fn render(&self, title: &str, status: &str, fraction: f32);

    /// Draw a progress bar with a cancel affordance. Returns `true` if the
    /// user asked to cancel since the last call.
    fn render_cancelable(&self, title: &str, status: &str, fraction: f32) -> bool;

    /// Dismiss the progress bar.
    fn clear(&self);
}
