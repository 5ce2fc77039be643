// src/exec/backend.rs

//! Pluggable launcher abstraction.
//!
//! The supervision loop talks to a `ProcessLauncher` instead of spawning the
//! managed process directly. Production uses [`RealLauncher`]; tests provide
//! their own implementation that, for example, records launches and writes
//! a status record the way the managed process would.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;

use super::runner::{LaunchSpec, ProcessExit, run_to_exit};

/// Trait abstracting how one run of the managed process happens.
pub trait ProcessLauncher: Send {
    /// Start the process described by `spec` and resolve once it has exited.
    fn launch<'a>(
        &'a mut self,
        spec: &'a LaunchSpec,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessExit>> + Send + 'a>>;
}

/// Launcher backed by real OS processes.
#[derive(Debug, Clone, Default)]
pub struct RealLauncher;

impl ProcessLauncher for RealLauncher {
    fn launch<'a>(
        &'a mut self,
        spec: &'a LaunchSpec,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessExit>> + Send + 'a>> {
        Box::pin(run_to_exit(spec))
    }
}
