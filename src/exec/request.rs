// src/exec/request.rs

use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Immutable description of one external program invocation.
///
/// The argument string is split into argv by [`split_args`]; no shell is
/// involved, so globbing, pipes and variable expansion do not happen unless
/// the program itself is a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    program: PathBuf,
    args: String,
    working_dir: PathBuf,
}

impl Request {
    /// Build a request that runs in the current working directory.
    pub fn new(program: impl Into<PathBuf>, args: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: args.into(),
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &str {
        &self.args
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn argv(&self) -> Vec<String> {
        split_args(&self.args)
    }

    pub fn display_program(&self) -> String {
        self.program.display().to_string()
    }

    /// Blocking command with both output streams piped and stdin closed.
    pub(crate) fn std_command(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(self.argv())
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        cmd
    }

    pub(crate) fn tokio_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::from(self.std_command());
        cmd.kill_on_drop(true);
        cmd
    }
}

/// Split a single argument string into individual arguments.
///
/// - runs of whitespace separate arguments
/// - double quotes group text (including whitespace) into one argument
/// - `\"` produces a literal quote
/// - `""` produces an empty argument
pub fn split_args(s: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
                has_token = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if has_token {
        args.push(current);
    }

    args
}
