// src/logs/archiver.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::fs::FileSystem;

/// `uuuuMMdd_HHmmss`, always in UTC.
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// What an [`LogArchiver::archive`] call moved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    pub timestamp: String,
    pub moved: Vec<PathBuf>,
}

/// Moves the managed process's stdout/stderr logs into the archive folder
/// before they can be overwritten by the next launch.
#[derive(Debug)]
pub struct LogArchiver {
    fs: Arc<dyn FileSystem>,
    archive_dir: PathBuf,
    logs: Vec<PathBuf>,
}

impl LogArchiver {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        archive_dir: impl Into<PathBuf>,
        logs: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        Self {
            fs,
            archive_dir: archive_dir.into(),
            logs: logs.into_iter().collect(),
        }
    }

    /// Modification time of the first log file that exists, if any.
    ///
    /// Unreadable times come back as `0`, which [`archive`](Self::archive)
    /// treats as unknown.
    pub fn reference_timestamp(&self) -> Option<u64> {
        self.logs
            .iter()
            .find(|log| self.fs.exists(log))
            .map(|log| self.fs.modified_millis(log).unwrap_or(0))
    }

    /// Archive whatever logs exist, dated by their own modification time.
    /// No-op if there are none.
    pub fn archive_current(&self) -> Result<ArchiveReport> {
        match self.reference_timestamp() {
            Some(ts) => self.archive(ts),
            None => {
                debug!("no logs to archive");
                Ok(ArchiveReport::default())
            }
        }
    }

    /// Move every existing log to `<archive_dir>/<timestamp>_<file name>`.
    ///
    /// `reference_ms == 0` means the time is unknown; the current time is
    /// used instead.
    pub fn archive(&self, reference_ms: u64) -> Result<ArchiveReport> {
        let timestamp = format_timestamp(reference_ms);

        if !self.fs.is_dir(&self.archive_dir) {
            self.fs
                .create_dir_all(&self.archive_dir)
                .with_context(|| format!("creating log archive {:?}", self.archive_dir))?;
        }

        let mut report = ArchiveReport {
            timestamp: timestamp.clone(),
            moved: Vec::new(),
        };

        for log in &self.logs {
            if !self.fs.exists(log) {
                continue;
            }
            let Some(name) = log.file_name() else {
                continue;
            };

            let target = self.unused_target(&format!("{timestamp}_{}", name.to_string_lossy()));
            self.fs.rename(log, &target)?;
            debug!(from = %log.display(), to = %target.display(), "log archived");
            report.moved.push(target);
        }

        if !report.moved.is_empty() {
            info!(
                timestamp = %report.timestamp,
                files = report.moved.len(),
                "archived managed process logs"
            );
        }

        Ok(report)
    }

    /// Runs finishing within the same second would otherwise overwrite each
    /// other's archives.
    fn unused_target(&self, name: &str) -> PathBuf {
        let target = self.archive_dir.join(name);
        if !self.fs.exists(&target) {
            return target;
        }
        (1u32..)
            .map(|n| self.archive_dir.join(format!("{name}.{n}")))
            .find(|candidate| !self.fs.exists(candidate))
            .unwrap_or(target)
    }
}

fn format_timestamp(reference_ms: u64) -> String {
    let when = if reference_ms == 0 {
        warn!("no timestamp given for log archive, using current time instead");
        Utc::now()
    } else {
        i64::try_from(reference_ms)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or_else(|| {
                warn!(reference_ms, "log timestamp out of range, using current time instead");
                Utc::now()
            })
    };
    when.format(ARCHIVE_TIMESTAMP_FORMAT).to_string()
}
