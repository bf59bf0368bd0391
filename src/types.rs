use std::fmt;
use std::str::FromStr;

/// Which output pipe of a child process a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

/// How a CLI invocation ended, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failed,
    Aborted,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::Failed => 1,
            RunStatus::Aborted => 130,
        }
    }
}

/// Execution mode selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecMode {
    /// Stream output line by line; completion goes through the dispatcher.
    #[default]
    Async,
    /// Block a worker thread until exit and read both streams at the end.
    Sync,
}

impl FromStr for ExecMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "async" => Ok(ExecMode::Async),
            "sync" => Ok(ExecMode::Sync),
            other => Err(format!("invalid mode: {other} (expected \"async\" or \"sync\")")),
        }
    }
}
