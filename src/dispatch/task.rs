// src/dispatch/task.rs

/// Result of advancing a resumable task by one drain pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Re-run the task on the next drain pass.
    Pending,
    /// The task is finished and will be dropped.
    Done,
}

impl Step {
    pub fn is_done(self) -> bool {
        matches!(self, Step::Done)
    }
}

/// A unit of host-thread work that may span several ticks.
///
/// The dispatcher calls [`advance`](ResumableTask::advance) exactly once per
/// drain pass until it returns [`Step::Done`].
pub trait ResumableTask: Send {
    fn advance(&mut self) -> Step;
}

impl<F> ResumableTask for F
where
    F: FnMut() -> Step + Send,
{
    fn advance(&mut self) -> Step {
        self()
    }
}

/// One queued dispatcher entry.
pub(crate) enum DispatchEntry {
    Once(Box<dyn FnOnce() + Send>),
    Resumable(Box<dyn ResumableTask>),
}

impl DispatchEntry {
    /// Run the entry once. Returns the entry back if it wants another pass.
    pub(crate) fn run(self) -> Option<DispatchEntry> {
        match self {
            DispatchEntry::Once(action) => {
                action();
                None
            }
            DispatchEntry::Resumable(mut task) => {
                if task.advance().is_done() {
                    None
                } else {
                    Some(DispatchEntry::Resumable(task))
                }
            }
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            DispatchEntry::Once(_) => "once",
            DispatchEntry::Resumable(_) => "resumable",
        }
    }
}
