// src/logging.rs

//! Supervisor logging via `tracing`.
//!
//! The filter comes from `--log-level` if given, else from `RESPAWN_LOG`
//! (any `EnvFilter` directive, e.g. `respawn::logs=debug`), else `info`.
//!
//! Output goes to stderr since stdout and stderr of the managed process are
//! redirected to their own files. Events inside one launch of the managed
//! process carry a `run{n=..}` span.

use std::io::IsTerminal;

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "RESPAWN_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = env_filter(cli_level);
    let stderr = std::io::stderr();

    fmt()
        .with_env_filter(filter)
        .with_ansi(stderr.is_terminal())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}

/// Filter for the current process environment.
pub fn env_filter(cli_level: Option<LogLevel>) -> EnvFilter {
    filter_from(cli_level, std::env::var(LOG_ENV_VAR).ok().as_deref())
}

fn filter_from(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(directive(level));
    }
    env.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_beats_environment() {
        let filter = filter_from(Some(LogLevel::Debug), Some("respawn=trace"));
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn environment_accepts_per_module_directives() {
        let filter = filter_from(None, Some(" respawn::logs=debug "));
        assert_eq!(filter.to_string(), "respawn::logs=debug");
    }

    #[test]
    fn falls_back_to_info() {
        assert_eq!(filter_from(None, None).to_string(), "info");
        assert_eq!(filter_from(None, Some("  ")).to_string(), "info");
    }
}
