// src/host/context.rs

use std::sync::Arc;

use crate::config::ConfigFile;
use crate::dispatch::{Dispatcher, TickSource};
use crate::exec::{ProcessRunner, Request, RunnerOptions};
use crate::progress::{ProgressHook, ProgressReporter};

/// Everything a component needs to schedule host-thread work or report
/// progress, owned by the host and passed around explicitly.
///
/// Independent contexts never share state, so tests can create as many as
/// they like.
#[derive(Debug, Clone)]
pub struct HostContext {
    dispatcher: Dispatcher,
    progress: ProgressReporter,
    runner_options: RunnerOptions,
}

impl HostContext {
    pub fn new(tick: Arc<dyn TickSource>, hook: Arc<dyn ProgressHook>) -> Self {
        Self::from_config(&ConfigFile::default(), tick, hook)
    }

    pub fn from_config(
        config: &ConfigFile,
        tick: Arc<dyn TickSource>,
        hook: Arc<dyn ProgressHook>,
    ) -> Self {
        let dispatcher = Dispatcher::new(tick);
        let progress = ProgressReporter::with_waiting_status(
            dispatcher.clone(),
            hook,
            config.progress.waiting_status.clone(),
        );

        Self {
            dispatcher,
            progress,
            runner_options: config.runner_options(),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    pub fn runner_options(&self) -> RunnerOptions {
        self.runner_options
    }

    /// A fresh runner for `request` using this context's timing options.
    pub fn runner(&self, request: Request) -> ProcessRunner {
        ProcessRunner::new(request).with_options(self.runner_options)
    }
}
