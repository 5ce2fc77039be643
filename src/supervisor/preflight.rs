// src/supervisor/preflight.rs

use tracing::{error, info, warn};

use crate::errors::{RespawnError, Result};
use crate::exec::ProcessLauncher;
use crate::types::{Outcome, SupervisorPhase};

use super::Supervisor;

impl<L: ProcessLauncher> Supervisor<L> {
    /// Everything that has to hold before the first launch.
    pub(crate) async fn preflight(&mut self) -> Result<()> {
        self.ensure_installed().await?;
        self.check_data_folder()?;
        self.set_phase(SupervisorPhase::Ready);

        let state = self.classifier.classify();
        if !state.allows_start() {
            error!(%state, "managed process state does not allow a start");
            return Err(RespawnError::StartupBlocked(state));
        }
        info!(%state, "initial state allows start");

        if self.options.update_first {
            if let Outcome::Failed(reason) = self.installer.install_pending_update().await {
                return Err(RespawnError::UpdateFailed(reason));
            }
        }

        Ok(())
    }

    async fn ensure_installed(&mut self) -> Result<()> {
        let app_dir = self.config.app_dir.clone();
        if self.fs.exists(&app_dir) {
            return Ok(());
        }

        self.set_phase(SupervisorPhase::NotInstalled);
        warn!(path = %app_dir.display(), "application folder not found");

        if !self.options.install {
            return Err(RespawnError::NotInstalled(app_dir.display().to_string()));
        }

        info!(
            updates = %self.installer.updates_dir().display(),
            "installing from updates folder"
        );
        if let Outcome::Failed(reason) = self.installer.install_pending_update().await {
            return Err(RespawnError::UpdateFailed(format!(
                "installation from updates folder failed: {reason}"
            )));
        }

        if !self.fs.exists(&app_dir) {
            return Err(RespawnError::PackagingError(app_dir.display().to_string()));
        }

        info!(path = %app_dir.display(), "application installed");
        Ok(())
    }

    /// A missing data folder is fine on the very first run, as long as
    /// there is something to run.
    fn check_data_folder(&mut self) -> Result<()> {
        if self.fs.exists(&self.config.data_dir) {
            return Ok(());
        }

        self.set_phase(SupervisorPhase::DataMissing);
        info!(path = %self.config.data_dir.display(), "data folder not found");

        if !self.fs.exists(&self.config.executable) {
            return Err(RespawnError::IncompleteInstallation(
                self.config.executable.display().to_string(),
            ));
        }

        info!("proceeding with first launch");
        Ok(())
    }
}
