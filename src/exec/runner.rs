// src/exec/runner.rs

//! Runs the managed process to completion.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::info;

use crate::config::SupervisorConfig;

/// Everything needed to start one run of the managed process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub work_dir: PathBuf,
    pub stdout_log: PathBuf,
    pub stderr_log: PathBuf,
}

/// Optional passthrough flags requested on the supervisor's command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    pub full_log: bool,
    pub checks: bool,
}

impl LaunchSpec {
    pub fn from_config(cfg: &SupervisorConfig, options: LaunchOptions) -> Self {
        let mut args = vec![cfg.flags.no_color.clone()];
        if options.full_log {
            args.push(cfg.flags.full_log.clone());
        }
        if options.checks {
            args.push(cfg.flags.checks.clone());
        }

        Self {
            program: cfg.executable.clone(),
            args,
            work_dir: cfg.work_dir.clone(),
            stdout_log: cfg.stdout_log.clone(),
            stderr_log: cfg.stderr_log.clone(),
        }
    }
}

/// How a run ended, as far as the OS can tell us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub success: bool,
}

fn open_log(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating dir {:?}", parent))?;
    }
    File::create(path).with_context(|| format!("opening log file {:?}", path))
}

/// Start the process with stdout/stderr redirected to the log files and
/// wait for it to exit. There is no timeout.
pub async fn run_to_exit(spec: &LaunchSpec) -> Result<ProcessExit> {
    let stdout = open_log(&spec.stdout_log)?;
    let stderr = open_log(&spec.stderr_log)?;

    info!(
        program = %spec.program.display(),
        args = ?spec.args,
        cwd = %spec.work_dir.display(),
        "starting managed process"
    );

    let mut child = Command::new(&spec.program)
        .args(&spec.args)
        .current_dir(&spec.work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .spawn()
        .with_context(|| format!("spawning managed process {:?}", spec.program))?;

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for managed process {:?}", spec.program))?;

    let exit = ProcessExit {
        code: status.code(),
        success: status.success(),
    };

    info!(
        exit_code = ?exit.code,
        success = exit.success,
        "managed process exited"
    );

    Ok(exit)
}
