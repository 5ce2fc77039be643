// src/supervisor/run_loop.rs

use tracing::{Instrument, error, info, info_span, warn};

use crate::errors::{RespawnError, Result};
use crate::exec::ProcessLauncher;
use crate::types::{Outcome, ResponseState, SupervisorPhase};

use super::Supervisor;

impl<L: ProcessLauncher> Supervisor<L> {
    /// Launch repeatedly while the state asks for a restart; return the
    /// state the loop ended in.
    pub(crate) async fn run_loop(&mut self) -> Result<ResponseState> {
        loop {
            self.set_phase(SupervisorPhase::Running);
            let run = info_span!("run", n = self.launches + 1);
            let state = self.run_once().instrument(run).await;

            if state.should_update() {
                if let Outcome::Failed(reason) = self.apply_requested_update().await {
                    error!(%state, "update failed; not restarting");
                    return Err(RespawnError::UpdateFailed(reason));
                }
            }

            if !state.should_restart() {
                return Ok(state);
            }
            info!(%state, "restarting managed process");
        }
    }

    /// One archive → launch → classify cycle. Returns the authoritative
    /// state for this iteration.
    async fn run_once(&mut self) -> ResponseState {
        if let Err(e) = self.archiver.archive_current() {
            error!(error = %e, "log backup failed; not launching");
            return ResponseState::WrapperError;
        }

        self.launch_managed_process().await;

        let state = self.classifier.classify();
        if state.is_unexpected() {
            return self.recheck_after_grace(state).await;
        }

        if let Err(e) = self.archiver.archive_current() {
            error!(error = %e, "log backup failed");
            return ResponseState::WrapperError;
        }

        state
    }

    /// Launch and launch/wait failures are logged only; the status record
    /// decides what happens next.
    async fn launch_managed_process(&mut self) {
        self.launches += 1;
        match self.launcher.launch(&self.launch_spec).await {
            Ok(exit) => info!(
                exit_code = ?exit.code,
                success = exit.success,
                "managed process finished"
            ),
            Err(e) => error!(
                error = %e,
                "error while trying to run the managed process"
            ),
        }
    }

    /// A slow-exiting process may write its final status a little late, so
    /// wait once and take whatever is there then.
    async fn recheck_after_grace(&mut self, observed: ResponseState) -> ResponseState {
        let grace = self.config.grace_period;
        error!(
            state = %observed,
            grace_ms = grace.as_millis() as u64,
            "managed process terminated in unexpected state"
        );

        tokio::time::sleep(grace).await;

        let state = self.classifier.classify();
        warn!(
            %state,
            grace_ms = grace.as_millis() as u64,
            "state after grace period"
        );
        state
    }

    /// Install the update the managed process asked for and mark the status
    /// record as `UPDATED`.
    ///
    /// Installer failure is fatal; failing to rewrite the record is not.
    async fn apply_requested_update(&mut self) -> Outcome {
        self.set_phase(SupervisorPhase::Updating);

        let installed = self.installer.install_pending_update().await;
        if installed.is_fatal() {
            return installed;
        }

        match self.classifier.persist_state(ResponseState::Updated) {
            Outcome::Succeeded => installed,
            degraded => {
                warn!("could not set status record to UPDATED");
                degraded
            }
        }
    }
}
