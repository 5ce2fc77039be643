// src/config/validate.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::model::{DEFAULT_GRACE_PERIOD, LaunchFlags, RawConfigFile, SupervisorConfig};
use crate::errors::{RespawnError, Result};

impl RawConfigFile {
    /// Validate and resolve every path against `root`.
    pub fn into_config(self, root: impl AsRef<Path>) -> Result<SupervisorConfig> {
        validate_raw_config(&self)?;

        let root = root.as_ref().to_path_buf();
        let grace_period = match self.supervisor.grace_period.as_deref() {
            Some(s) => parse_duration(s).map_err(|e| {
                RespawnError::ConfigError(format!("[supervisor].grace_period: {e}"))
            })?,
            None => DEFAULT_GRACE_PERIOD,
        };

        let resolve = |p: &Path| -> PathBuf { root.join(p) };

        Ok(SupervisorConfig {
            app_dir: resolve(&self.layout.app_dir),
            work_dir: resolve(&self.layout.work_dir),
            executable: resolve(&self.layout.executable),
            data_dir: resolve(&self.layout.data_dir),
            status_file: resolve(&self.layout.status_file),
            stdout_log: resolve(&self.logs.stdout),
            stderr_log: resolve(&self.logs.stderr),
            archive_dir: resolve(&self.logs.archive_dir),
            updates_dir: resolve(&self.update.dir),
            unpack_log: resolve(&self.update.unpack_log),
            extract_command: self.update.extract_command,
            supported_extensions: self
                .update
                .supported_extensions
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            grace_period,
            flags: LaunchFlags {
                no_color: self.supervisor.no_color_flag,
                full_log: self.supervisor.full_log_flag,
                checks: self.supervisor.checks_flag,
            },
            root,
        })
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_extract_command(cfg)?;
    validate_log_files(cfg)?;
    validate_flags(cfg)?;
    Ok(())
}

fn validate_extract_command(cfg: &RawConfigFile) -> Result<()> {
    match cfg.update.extract_command.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(RespawnError::ConfigError(
            "[update].extract_command must name a program".to_string(),
        )),
    }
}

fn validate_log_files(cfg: &RawConfigFile) -> Result<()> {
    for (key, path) in [("stdout", &cfg.logs.stdout), ("stderr", &cfg.logs.stderr)] {
        if path.file_name().is_none() {
            return Err(RespawnError::ConfigError(format!(
                "[logs].{key} must name a file (got {:?})",
                path
            )));
        }
    }

    if cfg.logs.stdout == cfg.logs.stderr {
        return Err(RespawnError::ConfigError(format!(
            "[logs].stdout and [logs].stderr must differ (both {:?})",
            cfg.logs.stdout
        )));
    }

    Ok(())
}

fn validate_flags(cfg: &RawConfigFile) -> Result<()> {
    let flags = [
        ("no_color_flag", &cfg.supervisor.no_color_flag),
        ("full_log_flag", &cfg.supervisor.full_log_flag),
        ("checks_flag", &cfg.supervisor.checks_flag),
    ];
    for (key, value) in flags {
        if value.trim().is_empty() {
            return Err(RespawnError::ConfigError(format!(
                "[supervisor].{key} must not be empty"
            )));
        }
    }
    Ok(())
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_under_root() {
        let cfg = RawConfigFile::default().into_config("/srv/bot").unwrap();
        assert_eq!(cfg.app_dir, PathBuf::from("/srv/bot/app"));
        assert_eq!(
            cfg.status_file,
            PathBuf::from("/srv/bot/app/bin/.state/instance.properties")
        );
        assert_eq!(cfg.archive_dir, PathBuf::from("/srv/bot/LogArchive"));
        assert_eq!(cfg.grace_period, DEFAULT_GRACE_PERIOD);
        assert_eq!(cfg.extract_command, vec!["unzip", "-o"]);
    }

    #[test]
    fn absolute_paths_are_kept() {
        let mut raw = RawConfigFile::default();
        raw.logs.archive_dir = PathBuf::from("/var/log/bot");
        let cfg = raw.into_config("/srv/bot").unwrap();
        assert_eq!(cfg.archive_dir, PathBuf::from("/var/log/bot"));
    }

    #[test]
    fn rejects_empty_extract_command() {
        let mut raw = RawConfigFile::default();
        raw.update.extract_command.clear();
        assert!(matches!(
            raw.into_config("."),
            Err(RespawnError::ConfigError(msg)) if msg.contains("extract_command")
        ));
    }

    #[test]
    fn rejects_shared_log_file() {
        let mut raw = RawConfigFile::default();
        raw.logs.stderr = raw.logs.stdout.clone();
        assert!(matches!(raw.into_config("."), Err(RespawnError::ConfigError(_))));
    }

    #[test]
    fn parses_grace_period_units() {
        assert_eq!(parse_duration("10s"), Ok(Duration::from_secs(10)));
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("5 days").is_err());
    }

    #[test]
    fn extensions_are_normalised() {
        let mut raw = RawConfigFile::default();
        raw.update.supported_extensions = vec![".ZIP".into(), "tar".into()];
        let cfg = raw.into_config(".").unwrap();
        assert_eq!(cfg.supported_extensions, vec!["zip", "tar"]);
    }
}
