// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// How long to wait after an unexpected state before looking at the status
/// record one more time.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Layout file as read from TOML, before paths are resolved.
///
/// ```toml
/// [layout]
/// app_dir = "app"
/// executable = "app/bin/app"
///
/// [logs]
/// archive_dir = "LogArchive"
///
/// [update]
/// extract_command = ["unzip", "-o"]
///
/// [supervisor]
/// grace_period = "10s"
/// ```
///
/// Every section is optional. Relative paths are taken relative to the
/// installation root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub layout: LayoutSection,

    #[serde(default)]
    pub logs: LogsSection,

    #[serde(default)]
    pub update: UpdateSection,

    #[serde(default)]
    pub supervisor: SupervisorSection,
}

/// `[layout]`: where the managed application lives.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutSection {
    /// Installation tree; its absence means "not installed".
    #[serde(default = "default_app_dir")]
    pub app_dir: PathBuf,

    /// Working directory of the managed process.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    #[serde(default = "default_executable")]
    pub executable: PathBuf,

    /// Data folder the managed process creates on its first run.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_status_file")]
    pub status_file: PathBuf,
}

fn default_app_dir() -> PathBuf {
    PathBuf::from("app")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("app/bin")
}

fn default_executable() -> PathBuf {
    PathBuf::from("app/bin/app")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("app/bin/.state")
}

fn default_status_file() -> PathBuf {
    PathBuf::from("app/bin/.state/instance.properties")
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            app_dir: default_app_dir(),
            work_dir: default_work_dir(),
            executable: default_executable(),
            data_dir: default_data_dir(),
            status_file: default_status_file(),
        }
    }
}

/// `[logs]`
#[derive(Debug, Clone, Deserialize)]
pub struct LogsSection {
    #[serde(default = "default_stdout_log")]
    pub stdout: PathBuf,

    #[serde(default = "default_stderr_log")]
    pub stderr: PathBuf,

    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,
}

fn default_stdout_log() -> PathBuf {
    PathBuf::from("process.log")
}

fn default_stderr_log() -> PathBuf {
    PathBuf::from("process-error.log")
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("LogArchive")
}

impl Default for LogsSection {
    fn default() -> Self {
        Self {
            stdout: default_stdout_log(),
            stderr: default_stderr_log(),
            archive_dir: default_archive_dir(),
        }
    }
}

/// `[update]`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSection {
    /// Incoming-updates folder.
    #[serde(default = "default_updates_dir")]
    pub dir: PathBuf,

    /// Combined output of the extraction command ends up here.
    #[serde(default = "default_unpack_log")]
    pub unpack_log: PathBuf,

    /// Program and leading arguments; the artifact path is appended.
    #[serde(default = "default_extract_command")]
    pub extract_command: Vec<String>,

    /// File extensions the extraction command is known to handle.
    #[serde(default = "default_supported_extensions")]
    pub supported_extensions: Vec<String>,
}

fn default_updates_dir() -> PathBuf {
    PathBuf::from("updates")
}

fn default_unpack_log() -> PathBuf {
    PathBuf::from("unpack.log")
}

fn default_extract_command() -> Vec<String> {
    vec!["unzip".to_string(), "-o".to_string()]
}

fn default_supported_extensions() -> Vec<String> {
    vec!["zip".to_string()]
}

impl Default for UpdateSection {
    fn default() -> Self {
        Self {
            dir: default_updates_dir(),
            unpack_log: default_unpack_log(),
            extract_command: default_extract_command(),
            supported_extensions: default_supported_extensions(),
        }
    }
}

/// `[supervisor]`
#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorSection {
    /// Duration string such as `"10s"` or `"500ms"`.
    ///
    /// If `None`, [`DEFAULT_GRACE_PERIOD`] is used.
    #[serde(default)]
    pub grace_period: Option<String>,

    #[serde(default = "default_no_color_flag")]
    pub no_color_flag: String,

    #[serde(default = "default_full_log_flag")]
    pub full_log_flag: String,

    #[serde(default = "default_checks_flag")]
    pub checks_flag: String,
}

fn default_no_color_flag() -> String {
    "--no-colorize".to_string()
}

fn default_full_log_flag() -> String {
    "--fullog".to_string()
}

fn default_checks_flag() -> String {
    "--checks".to_string()
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            grace_period: None,
            no_color_flag: default_no_color_flag(),
            full_log_flag: default_full_log_flag(),
            checks_flag: default_checks_flag(),
        }
    }
}

/// Flags handed to the managed process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchFlags {
    /// Always passed: output goes to files, not a terminal.
    pub no_color: String,
    pub full_log: String,
    pub checks: String,
}

/// Validated configuration with every path resolved against the
/// installation root.
///
/// Built once at startup and shared by every component.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub root: PathBuf,

    pub app_dir: PathBuf,
    pub work_dir: PathBuf,
    pub executable: PathBuf,
    pub data_dir: PathBuf,
    pub status_file: PathBuf,

    pub stdout_log: PathBuf,
    pub stderr_log: PathBuf,
    pub archive_dir: PathBuf,

    pub updates_dir: PathBuf,
    pub unpack_log: PathBuf,
    pub extract_command: Vec<String>,
    pub supported_extensions: Vec<String>,

    pub grace_period: Duration,
    pub flags: LaunchFlags,
}

impl SupervisorConfig {
    /// All-defaults layout under `root`.
    pub fn with_defaults(root: impl AsRef<Path>) -> crate::errors::Result<Self> {
        RawConfigFile::default().into_config(root)
    }

    /// Log files in archive order (stdout first).
    pub fn log_files(&self) -> [&Path; 2] {
        [self.stdout_log.as_path(), self.stderr_log.as_path()]
    }
}
