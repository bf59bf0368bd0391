// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::ExecMode;

/// Command-line arguments for `hostexec`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hostexec",
    version,
    about = "Run an external program under a host tick loop, with live progress and cancellation.",
    long_about = None
)]
pub struct CliArgs {
    /// Program to run (looked up on PATH if not a path).
    #[arg(value_name = "PROGRAM")]
    pub program: String,

    /// Single argument string for the program.
    ///
    /// Split on whitespace; double quotes group, `\"` is a literal quote.
    /// No shell is involved.
    #[arg(value_name = "ARGS", default_value = "", allow_hyphen_values = true)]
    pub args: String,

    /// Path to a config file (TOML). Default: `Hostexec.toml` if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Working directory for the program. Default: current directory.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// `async` streams output line by line; `sync` blocks a worker thread
    /// until exit and prints the captured output at the end.
    #[arg(long, value_name = "MODE", default_value = "async")]
    pub mode: ExecMode,

    /// Title of the progress line. Default: "Running <PROGRAM>".
    #[arg(long)]
    pub title: Option<String>,

    /// Regex extracting a progress number from stdout lines (group 1, or
    /// the whole match).
    #[arg(long, value_name = "REGEX")]
    pub progress_pattern: Option<String>,

    /// Value treated as 100% by `--progress-pattern`.
    #[arg(long, value_name = "N")]
    pub scale: Option<f32>,

    /// Only stderr lines matching this regex abort the run. Default: every
    /// stderr line is fatal.
    #[arg(long, value_name = "REGEX")]
    pub fatal_stderr: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HOSTEXEC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve config and request, print them, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
