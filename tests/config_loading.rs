// tests/config_loading.rs

use std::fs;
use std::time::Duration;

use respawn::config::{DEFAULT_CONFIG_FILE, DEFAULT_GRACE_PERIOD, load_and_validate, load_for_root};
use respawn::errors::RespawnError;
use tempfile::TempDir;

fn root_with_layout(layout: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(DEFAULT_CONFIG_FILE), layout).unwrap();
    dir
}

#[test]
fn without_layout_file_defaults_apply() {
    let dir = tempfile::tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();

    let cfg = load_for_root(dir.path(), None).unwrap();

    assert_eq!(cfg.root, root);
    assert_eq!(cfg.app_dir, root.join("app"));
    assert_eq!(cfg.executable, root.join("app/bin/app"));
    assert_eq!(cfg.status_file, root.join("app/bin/.state/instance.properties"));
    assert_eq!(cfg.stdout_log, root.join("process.log"));
    assert_eq!(cfg.stderr_log, root.join("process-error.log"));
    assert_eq!(cfg.archive_dir, root.join("LogArchive"));
    assert_eq!(cfg.updates_dir, root.join("updates"));
    assert_eq!(cfg.extract_command, vec!["unzip", "-o"]);
    assert_eq!(cfg.grace_period, DEFAULT_GRACE_PERIOD);
    assert_eq!(cfg.flags.no_color, "--no-colorize");
}

#[test]
fn layout_file_in_root_is_picked_up() {
    let dir = root_with_layout(
        r#"
[layout]
app_dir = "bot"
executable = "bot/run.sh"

[logs]
archive_dir = "old-logs"

[supervisor]
grace_period = "250ms"
"#,
    );
    let root = fs::canonicalize(dir.path()).unwrap();

    let cfg = load_for_root(dir.path(), None).unwrap();

    assert_eq!(cfg.app_dir, root.join("bot"));
    assert_eq!(cfg.executable, root.join("bot/run.sh"));
    assert_eq!(cfg.archive_dir, root.join("old-logs"));
    assert_eq!(cfg.grace_period, Duration::from_millis(250));
    // Untouched sections keep their defaults.
    assert_eq!(cfg.updates_dir, root.join("updates"));
}

#[test]
fn explicit_layout_file_wins() {
    let dir = root_with_layout("[logs]\narchive_dir = \"from-root\"\n");
    let other = tempfile::tempdir().unwrap();
    let explicit = other.path().join("custom.toml");
    fs::write(&explicit, "[logs]\narchive_dir = \"from-flag\"\n").unwrap();

    let cfg = load_for_root(dir.path(), Some(&explicit)).unwrap();

    assert!(cfg.archive_dir.ends_with("from-flag"));
    assert!(cfg.archive_dir.starts_with(fs::canonicalize(dir.path()).unwrap()));
}

#[test]
fn missing_explicit_layout_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    match load_for_root(dir.path(), Some(&missing)) {
        Err(RespawnError::ConfigError(msg)) => assert!(msg.contains("does not exist")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn malformed_toml_is_reported() {
    let dir = root_with_layout("[layout\napp_dir = ");

    let result = load_for_root(dir.path(), None);

    assert!(matches!(result, Err(RespawnError::TomlError(_))));
}

#[test]
fn bad_grace_period_is_config_error() {
    let dir = root_with_layout("[supervisor]\ngrace_period = \"soon\"\n");

    match load_and_validate(dir.path().join(DEFAULT_CONFIG_FILE), dir.path()) {
        Err(RespawnError::ConfigError(msg)) => assert!(msg.contains("grace_period")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn empty_extract_command_is_rejected() {
    let dir = root_with_layout("[update]\nextract_command = []\n");

    let result = load_for_root(dir.path(), None);

    assert!(matches!(result, Err(RespawnError::ConfigError(_))));
}

#[test]
fn stdout_and_stderr_must_differ() {
    let dir = root_with_layout("[logs]\nstdout = \"out.log\"\nstderr = \"out.log\"\n");

    let result = load_for_root(dir.path(), None);

    assert!(matches!(result, Err(RespawnError::ConfigError(_))));
}
