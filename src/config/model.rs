// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::exec::RunnerOptions;
use crate::progress::{DEFAULT_SCALE, DEFAULT_WAITING_STATUS};

/// Configuration as read from TOML, before validation.
///
/// ```toml
/// [runner]
/// watchdog_timeout_ms = 2000
/// watchdog_poll_ms = 50
/// sync_poll_ms = 10
///
/// [progress]
/// waiting_status = "Please, wait..."
/// default_scale = 100.0
///
/// [host]
/// tick_interval_ms = 16
/// ```
///
/// All sections and keys are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub runner: RunnerSection,

    #[serde(default)]
    pub progress: ProgressSection,

    #[serde(default)]
    pub host: HostSection,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub runner: RunnerSection,
    pub progress: ProgressSection,
    pub host: HostSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        runner: RunnerSection,
        progress: ProgressSection,
        host: HostSection,
    ) -> Self {
        Self {
            runner,
            progress,
            host,
        }
    }

    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            watchdog_timeout: Duration::from_millis(self.runner.watchdog_timeout_ms),
            watchdog_poll: Duration::from_millis(self.runner.watchdog_poll_ms),
            sync_poll: Duration::from_millis(self.runner.sync_poll_ms),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.host.tick_interval_ms)
    }
}

/// `[runner]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    /// Upper bound on waiting for stdout/stderr to close after exit.
    #[serde(default = "default_watchdog_timeout_ms")]
    pub watchdog_timeout_ms: u64,

    #[serde(default = "default_watchdog_poll_ms")]
    pub watchdog_poll_ms: u64,

    #[serde(default = "default_sync_poll_ms")]
    pub sync_poll_ms: u64,
}

fn default_watchdog_timeout_ms() -> u64 {
    2000
}

fn default_watchdog_poll_ms() -> u64 {
    50
}

fn default_sync_poll_ms() -> u64 {
    10
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            watchdog_timeout_ms: default_watchdog_timeout_ms(),
            watchdog_poll_ms: default_watchdog_poll_ms(),
            sync_poll_ms: default_sync_poll_ms(),
        }
    }
}

/// `[progress]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressSection {
    #[serde(default = "default_waiting_status")]
    pub waiting_status: String,

    /// Value treated as 100% by `--progress-pattern` when `--scale` is not
    /// given.
    #[serde(default = "default_scale")]
    pub default_scale: f32,
}

fn default_waiting_status() -> String {
    DEFAULT_WAITING_STATUS.to_string()
}

fn default_scale() -> f32 {
    DEFAULT_SCALE
}

impl Default for ProgressSection {
    fn default() -> Self {
        Self {
            waiting_status: default_waiting_status(),
            default_scale: default_scale(),
        }
    }
}

/// `[host]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct HostSection {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval_ms() -> u64 {
    16
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}
