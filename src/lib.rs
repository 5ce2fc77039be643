// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod logs;
pub mod status;
pub mod supervisor;
pub mod types;
pub mod update;

use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{SupervisorConfig, load_for_root};
use crate::errors::Result;
use crate::exec::{LaunchOptions, LaunchSpec, RealLauncher};
use crate::fs::{FileSystem, RealFileSystem};
use crate::status::StateClassifier;
use crate::supervisor::{SupervisionSummary, Supervisor, SupervisorOptions};
use crate::update::CommandExtractor;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - layout loading
/// - the real filesystem, launcher and extraction command
/// - the supervisor
///
/// Returns `None` for `--dry-run`.
pub async fn run(args: CliArgs) -> Result<Option<SupervisionSummary>> {
    let config = Arc::new(load_for_root(&args.root, args.config.as_deref())?);
    info!(root = %config.root.display(), "installation root");

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    if args.dry_run {
        print_dry_run(&config, Arc::clone(&fs), launch_options(&args));
        return Ok(None);
    }

    let extractor = Arc::new(CommandExtractor::new(
        config.extract_command.clone(),
        config.unpack_log.clone(),
    ));

    let mut supervisor = Supervisor::new(
        config,
        fs,
        extractor,
        RealLauncher,
        supervisor_options(&args),
    );

    supervisor.run().await.map(Some)
}

pub fn supervisor_options(args: &CliArgs) -> SupervisorOptions {
    SupervisorOptions {
        install: args.install,
        update_first: args.update,
        launch: launch_options(args),
    }
}

fn launch_options(args: &CliArgs) -> LaunchOptions {
    LaunchOptions {
        full_log: args.full_log,
        checks: args.checks,
    }
}

/// Simple dry-run output: resolved layout, launch command and current state.
fn print_dry_run(cfg: &SupervisorConfig, fs: Arc<dyn FileSystem>, options: LaunchOptions) {
    let spec = LaunchSpec::from_config(cfg, options);
    let state = StateClassifier::new(Arc::clone(&fs), cfg.status_file.clone()).classify();

    println!("respawn dry-run");
    println!("  root        = {}", cfg.root.display());
    println!("  app_dir     = {} (exists: {})", cfg.app_dir.display(), fs.exists(&cfg.app_dir));
    println!("  data_dir    = {} (exists: {})", cfg.data_dir.display(), fs.exists(&cfg.data_dir));
    println!("  status_file = {}", cfg.status_file.display());
    println!("  stdout      = {}", cfg.stdout_log.display());
    println!("  stderr      = {}", cfg.stderr_log.display());
    println!("  archive_dir = {}", cfg.archive_dir.display());
    println!("  updates_dir = {}", cfg.updates_dir.display());
    println!("  extract     = {:?}", cfg.extract_command);
    println!("  grace       = {:?}", cfg.grace_period);
    println!();
    println!("launch:");
    println!("  cwd: {}", spec.work_dir.display());
    println!("  cmd: {} {}", spec.program.display(), spec.args.join(" "));
    println!();

    let caps = state.capabilities();
    println!("state: {state}");
    println!(
        "  allow_start={} should_update={} should_restart={} is_unexpected={}",
        caps.allow_start, caps.should_update, caps.should_restart, caps.is_unexpected
    );

    debug!("dry-run complete (nothing launched)");
}
