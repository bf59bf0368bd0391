// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{HostexecError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::HostexecError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.runner, raw.progress, raw.host))
    }
}

pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_runner(cfg)?;
    validate_progress(cfg)?;
    validate_host(cfg)?;
    Ok(())
}

fn validate_runner(cfg: &RawConfigFile) -> Result<()> {
    let runner = &cfg.runner;

    if runner.watchdog_timeout_ms == 0 {
        return Err(HostexecError::ConfigError(
            "[runner].watchdog_timeout_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if runner.watchdog_poll_ms == 0 {
        return Err(HostexecError::ConfigError(
            "[runner].watchdog_poll_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if runner.watchdog_poll_ms > runner.watchdog_timeout_ms {
        return Err(HostexecError::ConfigError(format!(
            "[runner].watchdog_poll_ms ({}) must not exceed watchdog_timeout_ms ({})",
            runner.watchdog_poll_ms, runner.watchdog_timeout_ms
        )));
    }
    if runner.sync_poll_ms == 0 {
        return Err(HostexecError::ConfigError(
            "[runner].sync_poll_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_progress(cfg: &RawConfigFile) -> Result<()> {
    let scale = cfg.progress.default_scale;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(HostexecError::ConfigError(format!(
            "[progress].default_scale must be a positive number (got {scale})"
        )));
    }
    Ok(())
}

fn validate_host(cfg: &RawConfigFile) -> Result<()> {
    if cfg.host.tick_interval_ms == 0 {
        return Err(HostexecError::ConfigError(
            "[host].tick_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
