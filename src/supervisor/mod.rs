// src/supervisor/mod.rs

//! The supervision loop.
//!
//! [`Supervisor`] owns one instance of each component (classifier, log
//! archiver, update installer, launcher) and drives them strictly one after
//! another:
//!
//! - [`preflight`]: installation checks, initial classification, optional
//!   upfront update.
//! - [`run_loop`]: archive → launch → classify → (grace re-check) →
//!   archive → (update), repeated while the state asks for a restart.

pub mod preflight;
pub mod run_loop;

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::SupervisorConfig;
use crate::errors::Result;
use crate::exec::{LaunchOptions, LaunchSpec, ProcessLauncher};
use crate::fs::FileSystem;
use crate::logs::LogArchiver;
use crate::status::StateClassifier;
use crate::types::{ResponseState, SupervisorPhase};
use crate::update::{Extractor, UpdateInstaller};

/// Caller-controlled switches (normally from the command line).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorOptions {
    /// Install from the updates folder if the application is missing.
    pub install: bool,
    /// Check the updates folder before the first launch.
    pub update_first: bool,
    pub launch: LaunchOptions,
}

/// How supervision ended when it was not aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisionSummary {
    pub final_state: ResponseState,
    pub launches: usize,
}

pub struct Supervisor<L: ProcessLauncher> {
    config: Arc<SupervisorConfig>,
    fs: Arc<dyn FileSystem>,
    classifier: StateClassifier,
    archiver: LogArchiver,
    installer: UpdateInstaller,
    launcher: L,
    launch_spec: LaunchSpec,
    options: SupervisorOptions,
    phase: SupervisorPhase,
    launches: usize,
}

impl<L: ProcessLauncher> Supervisor<L> {
    pub fn new(
        config: Arc<SupervisorConfig>,
        fs: Arc<dyn FileSystem>,
        extractor: Arc<dyn Extractor>,
        launcher: L,
        options: SupervisorOptions,
    ) -> Self {
        let classifier = StateClassifier::new(Arc::clone(&fs), config.status_file.clone());
        let archiver = LogArchiver::new(
            Arc::clone(&fs),
            config.archive_dir.clone(),
            config.log_files().map(|p| p.to_path_buf()),
        );
        let installer = UpdateInstaller::new(
            Arc::clone(&fs),
            extractor,
            config.updates_dir.clone(),
            config.root.clone(),
            config.supported_extensions.clone(),
        );
        let launch_spec = LaunchSpec::from_config(&config, options.launch);

        Self {
            config,
            fs,
            classifier,
            archiver,
            installer,
            launcher,
            launch_spec,
            options,
            phase: SupervisorPhase::NotInstalled,
            launches: 0,
        }
    }

    pub fn phase(&self) -> SupervisorPhase {
        self.phase
    }

    /// Number of times the managed process has been started.
    pub fn launches(&self) -> usize {
        self.launches
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Run preflight checks and then the run loop until the managed process
    /// no longer asks to be restarted.
    ///
    /// `Err` means supervision was aborted (not installed, startup blocked,
    /// an update that could not be installed, ...).
    pub async fn run(&mut self) -> Result<SupervisionSummary> {
        self.preflight().await?;

        let final_state = self.run_loop().await?;

        self.set_phase(SupervisorPhase::Stopped);
        info!(state = %final_state, launches = self.launches, "quit");

        Ok(SupervisionSummary {
            final_state,
            launches: self.launches,
        })
    }

    fn set_phase(&mut self, phase: SupervisorPhase) {
        if self.phase != phase {
            debug!(from = %self.phase, to = %phase, "supervisor phase");
            self.phase = phase;
        }
    }
}
