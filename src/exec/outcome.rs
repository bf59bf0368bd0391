// src/exec/outcome.rs

//! Run classification.

use crate::errors::{ExternalProcessError, HostexecError, Result};

/// Terminal state of one process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Exit code 0 and nothing on the error stream.
    Success { stdout: String },
    /// Non-zero exit or error output.
    Failed(ExternalProcessError),
    /// The run was aborted. Never reported as a program failure.
    Aborted { stdout: String, stderr: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success { .. })
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, RunOutcome::Aborted { .. })
    }

    pub fn stdout(&self) -> &str {
        match self {
            RunOutcome::Success { stdout } | RunOutcome::Aborted { stdout, .. } => stdout,
            RunOutcome::Failed(err) => &err.stdout,
        }
    }

    pub fn stderr(&self) -> &str {
        match self {
            RunOutcome::Success { .. } => "",
            RunOutcome::Aborted { stderr, .. } => stderr,
            RunOutcome::Failed(err) => &err.stderr,
        }
    }

    pub fn into_result(self) -> Result<String> {
        match self {
            RunOutcome::Success { stdout } => Ok(stdout),
            RunOutcome::Failed(err) => Err(HostexecError::ExternalProcess(err)),
            RunOutcome::Aborted { .. } => Err(HostexecError::Aborted),
        }
    }
}

/// Turn captured streams and exit status into a [`RunOutcome`].
///
/// Aborted wins over everything else. Otherwise a run fails when the exit
/// code is non-zero (or missing) or when anything reached the error stream.
pub fn finalize(exit_code: Option<i32>, aborted: bool, stdout: String, stderr: String) -> RunOutcome {
    if aborted {
        return RunOutcome::Aborted { stdout, stderr };
    }

    if exit_code != Some(0) || !stderr.is_empty() {
        return RunOutcome::Failed(ExternalProcessError {
            stdout,
            stderr,
            exit_code,
        });
    }

    RunOutcome::Success { stdout }
}
