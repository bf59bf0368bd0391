// src/exec/runner.rs

//! External process runner.

use std::io::Read;
use std::process::{Child, ExitStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::dispatch::Dispatcher;
use crate::errors::{HostexecError, Result};
use crate::types::StreamKind;

use super::RunnerOptions;
use super::control::{AbortHandle, RunControl};
use super::outcome::{RunOutcome, finalize};
use super::request::Request;
use super::streams::{Captured, StreamsClosed, spawn_line_reader};
use super::watchdog::wait_for_streams;

type OutputHandler = Box<dyn FnMut(&str) + Send>;
type ErrorHandler = Box<dyn FnMut(&str) -> bool + Send>;
type ExitHandler = Box<dyn FnOnce(&RunOutcome) + Send>;

/// Callbacks for [`ProcessRunner::execute_async`].
///
/// `on_output` and `on_error` run on background reader tasks. `on_exited`
/// runs on the host thread, from inside a dispatcher drain.
#[derive(Default)]
pub struct RunHandlers {
    on_output: Option<OutputHandler>,
    on_error: Option<ErrorHandler>,
    on_exited: Option<ExitHandler>,
}

impl RunHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called for each stdout line.
    pub fn on_output<F>(mut self, f: F) -> Self
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_output = Some(Box::new(f));
        self
    }

    /// Called for each stderr line. Return `true` to treat the line as fatal:
    /// the line is recorded and the process is killed. Without this handler
    /// every error line is fatal.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: FnMut(&str) -> bool + Send + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn on_exited<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&RunOutcome) + Send + 'static,
    {
        self.on_exited = Some(Box::new(f));
        self
    }
}

/// Handle to an async run.
///
/// The outcome becomes available only after the dispatcher drained the
/// completion entry, so whoever reads it is on the host thread.
#[derive(Debug)]
pub struct RunHandle {
    abort: AbortHandle,
    pid: Option<u32>,
    outcome: oneshot::Receiver<RunOutcome>,
}

impl RunHandle {
    pub fn abort(&self) {
        self.abort.abort();
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Non-blocking check for the delivered outcome.
    pub fn try_outcome(&mut self) -> Option<RunOutcome> {
        self.outcome.try_recv().ok()
    }

    /// Wait for the delivered outcome. `None` if the completion entry was
    /// dropped without running (e.g. the dispatcher went away).
    pub async fn outcome(self) -> Option<RunOutcome> {
        self.outcome.await.ok()
    }
}

/// Runs one external program, once.
///
/// A runner is single-use: the second call to either `execute` or
/// `execute_async` fails with [`HostexecError::AlreadyStarted`]. `abort` may
/// be called from any thread at any time.
#[derive(Debug)]
pub struct ProcessRunner {
    request: Request,
    options: RunnerOptions,
    control: Arc<RunControl>,
    started: AtomicBool,
}

impl ProcessRunner {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            options: RunnerOptions::default(),
            control: Arc::new(RunControl::default()),
            started: AtomicBool::new(false),
        }
    }

    pub fn with_options(mut self, options: RunnerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn abort(&self) {
        info!(program = %self.request.display_program(), "aborting process run");
        self.control.abort();
    }

    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle::new(Arc::clone(&self.control))
    }

    pub fn is_aborted(&self) -> bool {
        self.control.is_aborted()
    }

    /// Run the program and block the calling thread until it exited and both
    /// streams were read to the end.
    ///
    /// Not meant for the host thread.
    pub fn execute(&self) -> Result<String> {
        self.mark_started()?;
        let program = self.request.display_program();

        info!(
            program = %program,
            args = %self.request.args(),
            cwd = %self.request.working_dir().display(),
            "starting process (sync)"
        );

        let mut child = self
            .request
            .std_command()
            .spawn()
            .map_err(|source| HostexecError::Spawn {
                program: program.clone(),
                source,
            })?;

        let readers = spawn_blocking_readers(&mut child);
        let (stdout_reader, stderr_reader) = match readers {
            Ok(readers) => readers,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e.into());
            }
        };

        let status = self.wait_blocking(&mut child)?;
        let stdout = join_reader(stdout_reader);
        let stderr = join_reader(stderr_reader);

        let exit_code = status.code();
        info!(program = %program, ?exit_code, "process exited (sync)");

        finalize(exit_code, self.control.is_aborted(), stdout, stderr).into_result()
    }

    /// Start the program and return immediately.
    ///
    /// Must be called from within a Tokio runtime. The outcome is pushed to
    /// `dispatcher` once the process exited and both streams closed (or the
    /// watchdog cap elapsed); `on_exited` runs inside that entry.
    pub fn execute_async(&self, dispatcher: &Dispatcher, handlers: RunHandlers) -> Result<RunHandle> {
        self.mark_started()?;
        let program = self.request.display_program();

        info!(
            program = %program,
            args = %self.request.args(),
            cwd = %self.request.working_dir().display(),
            "starting process (async)"
        );

        let mut child = self
            .request
            .tokio_command()
            .spawn()
            .map_err(|source| HostexecError::Spawn {
                program: program.clone(),
                source,
            })?;
        let pid = child.id();

        let RunHandlers {
            on_output,
            on_error,
            on_exited,
        } = handlers;

        let captured = Arc::new(Captured::default());
        let closed = Arc::new(StreamsClosed::default());

        {
            let captured = Arc::clone(&captured);
            let control = Arc::clone(&self.control);
            let mut on_output = on_output;
            spawn_line_reader(StreamKind::Stdout, child.stdout.take(), Arc::clone(&closed), move |line| {
                if control.kill_requested() {
                    return;
                }
                captured.append(StreamKind::Stdout, line);
                if let Some(f) = on_output.as_mut() {
                    f(line);
                }
            });
        }

        {
            let captured = Arc::clone(&captured);
            let control = Arc::clone(&self.control);
            let mut on_error = on_error;
            let program = program.clone();
            spawn_line_reader(StreamKind::Stderr, child.stderr.take(), Arc::clone(&closed), move |line| {
                if control.kill_requested() {
                    return;
                }
                let fatal = on_error.as_mut().is_none_or(|f| f(line));
                if fatal {
                    warn!(program = %program, line, "fatal error output; killing process");
                    captured.append(StreamKind::Stderr, line);
                    control.request_kill();
                }
            });
        }

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let control = Arc::clone(&self.control);
        let options = self.options;
        let dispatcher = dispatcher.clone();

        tokio::spawn(async move {
            let exit_code = wait_for_exit(child, &control, &program).await;

            if !wait_for_streams(&closed, options.watchdog_timeout, options.watchdog_poll).await {
                warn!(
                    program = %program,
                    timeout_ms = options.watchdog_timeout.as_millis() as u64,
                    "output streams still open after watchdog cap; finalizing with partial output"
                );
            }

            let (stdout, stderr) = captured.take();
            let outcome = finalize(exit_code, control.is_aborted(), stdout, stderr);

            info!(
                program = %program,
                ?exit_code,
                success = outcome.is_success(),
                aborted = outcome.is_aborted(),
                "process run finalized"
            );

            dispatcher.push(move || {
                if let Some(on_exited) = on_exited {
                    on_exited(&outcome);
                }
                if outcome_tx.send(outcome).is_err() {
                    debug!("run handle dropped before outcome delivery");
                }
            });
        });

        Ok(RunHandle {
            abort: self.abort_handle(),
            pid,
            outcome: outcome_rx,
        })
    }

    fn mark_started(&self) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(HostexecError::AlreadyStarted);
        }
        Ok(())
    }

    /// Wait for a blocking child, killing it once a kill was requested.
    fn wait_blocking(&self, child: &mut Child) -> Result<ExitStatus> {
        let mut kill_sent = false;

        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }

            if !kill_sent && self.control.kill_requested() {
                kill_sent = true;
                if let Err(e) = child.kill() {
                    debug!(error = %e, "failed to kill process (ignored)");
                }
            }

            std::thread::sleep(self.options.sync_poll);
        }
    }
}

/// Wait for an async child to exit, or kill it when requested.
async fn wait_for_exit(mut child: tokio::process::Child, control: &RunControl, program: &str) -> Option<i32> {
    let status = tokio::select! {
        status = child.wait() => status,
        _ = control.killed() => {
            debug!(program = %program, "kill requested; killing process");
            if let Err(e) = child.start_kill() {
                debug!(program = %program, error = %e, "failed to kill process (ignored)");
            }
            child.wait().await
        }
    };

    match status {
        Ok(status) => status.code(),
        Err(e) => {
            warn!(program = %program, error = %e, "failed to wait for process");
            None
        }
    }
}

type BlockingReader = Option<JoinHandle<String>>;

fn spawn_blocking_readers(child: &mut Child) -> std::io::Result<(BlockingReader, BlockingReader)> {
    let stdout = child
        .stdout
        .take()
        .map(|s| spawn_blocking_reader(StreamKind::Stdout, s))
        .transpose()?;
    let stderr = child
        .stderr
        .take()
        .map(|s| spawn_blocking_reader(StreamKind::Stderr, s))
        .transpose()?;
    Ok((stdout, stderr))
}

fn spawn_blocking_reader<R>(kind: StreamKind, mut stream: R) -> std::io::Result<JoinHandle<String>>
where
    R: Read + Send + 'static,
{
    std::thread::Builder::new()
        .name(format!("hostexec-{kind}"))
        .spawn(move || {
            let mut buf = Vec::new();
            if let Err(e) = stream.read_to_end(&mut buf) {
                debug!(stream = %kind, error = %e, "stream read failed (ignored)");
            }
            String::from_utf8_lossy(&buf).into_owned()
        })
}

fn join_reader(reader: BlockingReader) -> String {
    reader
        .map(|handle| handle.join().unwrap_or_default())
        .unwrap_or_default()
}
