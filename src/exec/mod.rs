// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`runner`] spawns the managed process with `tokio::process::Command`
//!   (argument vector, never a shell) and waits for it.
//! - [`backend`] provides the `ProcessLauncher` trait and the concrete
//!   `RealLauncher` used in production, which tests replace with a fake.

pub mod backend;
pub mod runner;

pub use backend::{ProcessLauncher, RealLauncher};
pub use runner::{LaunchOptions, LaunchSpec, ProcessExit, run_to_exit};
