// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Unknown flags make `clap` print usage and exit before anything on disk is
//! touched.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `respawn`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "respawn",
    version,
    about = "Keep a long-running program alive across updates and crashes, archiving its logs.",
    long_about = None
)]
pub struct CliArgs {
    /// Check the updates folder before the first launch.
    #[arg(short = 'u', long)]
    pub update: bool,

    /// Install the application from the updates folder if it is not present.
    #[arg(short = 'i', long)]
    pub install: bool,

    /// Ask the managed process for full logging.
    #[arg(short = 'f', long = "fullog")]
    pub full_log: bool,

    /// Ask the managed process to run its checks and quit without going online.
    #[arg(short = 'c', long)]
    pub checks: bool,

    /// Installation root; all layout paths are resolved against it.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Layout file (TOML).
    ///
    /// Default: `respawn.toml` inside the installation root, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RESPAWN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the resolved layout and current state, but launch nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
