// src/lib.rs

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod exec;
pub mod host;
pub mod logging;
pub mod progress;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default};
use crate::errors::HostexecError;
use crate::exec::{ProcessRunner, Request, RunHandlers, RunOutcome};
use crate::host::{HostContext, TerminalProgress, TickLoop};
use crate::progress::PercentPattern;
use crate::types::{ExecMode, RunStatus};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the host context (dispatcher + progress reporter)
/// - the Tokio tick loop that acts as host thread
/// - the process runner
/// - Ctrl-C → progress cancel → abort
pub async fn run(args: CliArgs) -> Result<RunStatus> {
    let config = load_or_default(args.config.as_deref())?;

    let mut request = Request::new(&args.program, args.args.clone());
    if let Some(ref cwd) = args.cwd {
        request = request.with_working_dir(cwd);
    }

    let pattern = match args.progress_pattern {
        Some(ref p) => Some(
            PercentPattern::new(p)?
                .with_scale(args.scale.unwrap_or(config.progress.default_scale))?,
        ),
        None => None,
    };
    let fatal = args
        .fatal_stderr
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("invalid --fatal-stderr pattern")?;

    if args.dry_run {
        print_dry_run(&config, &request, &args, pattern.as_ref(), fatal.as_ref());
        return Ok(RunStatus::Success);
    }

    let tick = TickLoop::new(config.tick_interval());
    let terminal = Arc::new(TerminalProgress::new());
    let ctx = HostContext::from_config(&config, tick.clone(), terminal.clone());
    let runner = Arc::new(ctx.runner(request));

    let title = args
        .title
        .clone()
        .unwrap_or_else(|| format!("Running {}", args.program));
    {
        let abort = runner.abort_handle();
        ctx.progress().show_cancelable(title, move || abort.abort());
    }

    // Ctrl-C → cancel button of the progress line.
    {
        let terminal = Arc::clone(&terminal);
        tokio::spawn(async move {
            loop {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "failed to listen for Ctrl+C");
                    return;
                }
                terminal.request_cancel();
            }
        });
    }

    let outcome = match args.mode {
        ExecMode::Async => run_async(&ctx, &tick, &runner, pattern, fatal).await?,
        ExecMode::Sync => run_sync(&ctx, &tick, &runner).await?,
    };

    // Close the bar and run the scheduled clear right away; we are the host.
    ctx.progress().close();
    ctx.dispatcher().drain();

    Ok(report(outcome, args.mode))
}

async fn run_async(
    ctx: &HostContext,
    tick: &TickLoop,
    runner: &ProcessRunner,
    pattern: Option<PercentPattern>,
    fatal: Option<Regex>,
) -> Result<RunOutcome> {
    let progress = ctx.progress().clone();

    let handlers = RunHandlers::new()
        .on_output(move |line| {
            println!("{line}");
            match pattern {
                Some(ref p) => progress.update_with_pattern(line, p),
                None => progress.update(line),
            }
        })
        .on_error(move |line| {
            let is_fatal = fatal.as_ref().is_none_or(|re| re.is_match(line));
            if !is_fatal {
                warn!(line, "error output (not fatal)");
            }
            is_fatal
        })
        .on_exited(|outcome| {
            debug!(success = outcome.is_success(), "run outcome delivered on host thread");
        });

    let handle = runner.execute_async(ctx.dispatcher(), handlers)?;
    tick.run_until(ctx.dispatcher(), handle.outcome())
        .await
        .ok_or_else(|| anyhow!("run outcome was never delivered"))
}

async fn run_sync(ctx: &HostContext, tick: &TickLoop, runner: &Arc<ProcessRunner>) -> Result<RunOutcome> {
    let worker = Arc::clone(runner);
    let job = tokio::task::spawn_blocking(move || worker.execute());

    let result = tick
        .run_until(ctx.dispatcher(), job)
        .await
        .context("sync worker thread panicked")?;

    match result {
        Ok(stdout) => Ok(RunOutcome::Success { stdout }),
        Err(HostexecError::ExternalProcess(err)) => Ok(RunOutcome::Failed(err)),
        Err(HostexecError::Aborted) => Ok(RunOutcome::Aborted {
            stdout: String::new(),
            stderr: String::new(),
        }),
        Err(e) => Err(e.into()),
    }
}

fn report(outcome: RunOutcome, mode: ExecMode) -> RunStatus {
    match outcome {
        RunOutcome::Success { stdout } => {
            if mode == ExecMode::Sync {
                print!("{stdout}");
            }
            info!("process finished successfully");
            RunStatus::Success
        }
        RunOutcome::Failed(err) => {
            error!(exit_code = ?err.exit_code, "process failed");
            if mode == ExecMode::Sync && !err.stdout.is_empty() {
                print!("{}", err.stdout);
            }
            if !err.stderr.is_empty() {
                eprintln!("{}", err.stderr.trim_end());
            }
            RunStatus::Failed
        }
        RunOutcome::Aborted { .. } => {
            warn!("process run aborted");
            RunStatus::Aborted
        }
    }
}

/// Dry-run output: print the resolved request and timing config.
fn print_dry_run(
    cfg: &ConfigFile,
    request: &Request,
    args: &CliArgs,
    pattern: Option<&PercentPattern>,
    fatal: Option<&Regex>,
) {
    println!("hostexec dry-run");
    println!("  program: {}", request.display_program());
    println!("  argv: {:?}", request.argv());
    println!("  cwd: {}", request.working_dir().display());
    println!("  mode: {:?}", args.mode);
    if let Some(p) = pattern {
        println!("  progress_pattern: {} (scale {})", p.as_str(), p.scale());
    }
    if let Some(re) = fatal {
        println!("  fatal_stderr: {}", re.as_str());
    }
    println!();

    println!("config:");
    println!("  runner.watchdog_timeout_ms = {}", cfg.runner.watchdog_timeout_ms);
    println!("  runner.watchdog_poll_ms = {}", cfg.runner.watchdog_poll_ms);
    println!("  runner.sync_poll_ms = {}", cfg.runner.sync_poll_ms);
    println!("  progress.waiting_status = {:?}", cfg.progress.waiting_status);
    println!("  progress.default_scale = {}", cfg.progress.default_scale);
    println!("  host.tick_interval_ms = {}", cfg.host.tick_interval_ms);

    debug!("dry-run complete (no execution)");
}
