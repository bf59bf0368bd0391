// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

/// A run that the finalization rule rejected: non-zero exit code (when not
/// aborted) or anything written to the error stream.
///
/// Both captured streams are kept so callers can show diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("\nOutput:\n{stdout}\nError Output:\n{stderr}")]
pub struct ExternalProcessError {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

#[derive(Error, Debug)]
pub enum HostexecError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("external process failed: {0}")]
    ExternalProcess(#[from] ExternalProcessError),

    #[error("process run was aborted")]
    Aborted,

    #[error("process runner was already started")]
    AlreadyStarted,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid progress pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, HostexecError>;
