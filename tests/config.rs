use std::fs;
use std::time::Duration;

use hostexec::config::{ConfigFile, load_and_validate, load_from_path, load_or_default};
use hostexec::errors::HostexecError;
use tempfile::tempdir;

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Hostexec.toml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

fn config_error(contents: &str) -> String {
    let (_dir, path) = write_config(contents);
    match load_and_validate(&path) {
        Err(HostexecError::ConfigError(msg)) => msg,
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn defaults_match_the_documented_values() {
    let cfg = ConfigFile::default();

    let options = cfg.runner_options();
    assert_eq!(options.watchdog_timeout, Duration::from_millis(2000));
    assert_eq!(options.watchdog_poll, Duration::from_millis(50));
    assert_eq!(options.sync_poll, Duration::from_millis(10));
    assert_eq!(cfg.progress.waiting_status, "Please, wait...");
    assert_eq!(cfg.progress.default_scale, 100.0);
    assert_eq!(cfg.tick_interval(), Duration::from_millis(16));
}

#[test]
fn empty_file_yields_defaults() {
    let (_dir, path) = write_config("");
    let cfg = load_and_validate(&path).unwrap();

    assert_eq!(cfg.runner.watchdog_timeout_ms, 2000);
    assert_eq!(cfg.host.tick_interval_ms, 16);
}

#[test]
fn partial_sections_keep_defaults_for_missing_keys() {
    let (_dir, path) = write_config(
        r#"
[runner]
watchdog_timeout_ms = 500

[progress]
waiting_status = "Hold on..."
default_scale = 1.0

[host]
tick_interval_ms = 5
"#,
    );

    let cfg = load_and_validate(&path).unwrap();
    assert_eq!(cfg.runner.watchdog_timeout_ms, 500);
    assert_eq!(cfg.runner.watchdog_poll_ms, 50);
    assert_eq!(cfg.progress.waiting_status, "Hold on...");
    assert_eq!(cfg.progress.default_scale, 1.0);
    assert_eq!(cfg.tick_interval(), Duration::from_millis(5));
}

#[test]
fn zero_durations_are_rejected() {
    assert!(config_error("[runner]\nwatchdog_timeout_ms = 0\n").contains("watchdog_timeout_ms"));
    assert!(config_error("[runner]\nwatchdog_poll_ms = 0\n").contains("watchdog_poll_ms"));
    assert!(config_error("[runner]\nsync_poll_ms = 0\n").contains("sync_poll_ms"));
    assert!(config_error("[host]\ntick_interval_ms = 0\n").contains("tick_interval_ms"));
}

#[test]
fn poll_interval_longer_than_timeout_is_rejected() {
    let msg = config_error("[runner]\nwatchdog_timeout_ms = 100\nwatchdog_poll_ms = 200\n");
    assert!(msg.contains("must not exceed"), "{msg}");
}

#[test]
fn non_positive_scale_is_rejected() {
    assert!(config_error("[progress]\ndefault_scale = 0.0\n").contains("default_scale"));
    assert!(config_error("[progress]\ndefault_scale = -5.0\n").contains("default_scale"));
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let (_dir, path) = write_config("[runner\nwatchdog_timeout_ms = ");
    assert!(matches!(load_from_path(&path), Err(HostexecError::TomlError(_))));
}

#[test]
fn explicit_missing_path_is_an_io_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    assert!(matches!(
        load_or_default(Some(&missing)),
        Err(HostexecError::IoError(_))
    ));
}

#[test]
fn explicit_path_is_loaded_and_validated() {
    let (_dir, path) = write_config("[host]\ntick_interval_ms = 3\n");
    let cfg = load_or_default(Some(&path)).unwrap();
    assert_eq!(cfg.host.tick_interval_ms, 3);

    let (_dir, bad) = write_config("[host]\ntick_interval_ms = 0\n");
    assert!(load_or_default(Some(&bad)).is_err());
}
