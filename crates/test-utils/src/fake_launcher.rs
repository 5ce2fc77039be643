use std::collections::VecDeque;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use respawn::exec::{LaunchSpec, ProcessExit, ProcessLauncher};
use respawn::fs::mock::MockFileSystem;
use respawn::fs::FileSystem;

/// What one fake run of the managed process does.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRun {
    /// Status record contents written at exit; `None` leaves it untouched.
    pub status: Option<String>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    /// Simulate a process that cannot be started.
    pub fail_to_start: bool,
}

impl ScriptedRun {
    /// A run that exits after writing `state=<state>`.
    pub fn exits_with(state: &str) -> Self {
        Self {
            status: Some(format!("state={state}\n")),
            stdout: Some(format!("running until {state}\n")),
            ..Self::default()
        }
    }

    pub fn cannot_start() -> Self {
        Self {
            fail_to_start: true,
            ..Self::default()
        }
    }
}

/// A fake launcher that:
/// - records every `LaunchSpec` it is given
/// - plays back scripted runs against the shared mock filesystem
///
/// Once the script is exhausted every further run writes `state=SHUTDOWN`,
/// so a misbehaving loop still terminates.
pub struct FakeLauncher {
    fs: MockFileSystem,
    status_file: PathBuf,
    script: VecDeque<ScriptedRun>,
    launched: Arc<Mutex<Vec<LaunchSpec>>>,
}

impl FakeLauncher {
    pub fn new(
        fs: MockFileSystem,
        status_file: impl Into<PathBuf>,
        script: impl IntoIterator<Item = ScriptedRun>,
    ) -> Self {
        Self {
            fs,
            status_file: status_file.into(),
            script: script.into_iter().collect(),
            launched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the recorded launches.
    pub fn launched(&self) -> Arc<Mutex<Vec<LaunchSpec>>> {
        Arc::clone(&self.launched)
    }

    fn play(&mut self, spec: &LaunchSpec) -> anyhow::Result<ProcessExit> {
        self.launched.lock().unwrap().push(spec.clone());

        let run = self
            .script
            .pop_front()
            .unwrap_or_else(|| ScriptedRun::exits_with("SHUTDOWN"));

        if run.fail_to_start {
            return Err(anyhow!("No such file or directory: {:?}", spec.program));
        }

        // Redirected outputs are truncated at start, like a real launch.
        self.fs
            .write(&spec.stdout_log, run.stdout.unwrap_or_default().as_bytes())?;
        self.fs
            .write(&spec.stderr_log, run.stderr.unwrap_or_default().as_bytes())?;

        if let Some(status) = run.status {
            self.fs.write(&self.status_file, status.as_bytes())?;
        }

        Ok(ProcessExit {
            code: Some(0),
            success: true,
        })
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch<'a>(
        &'a mut self,
        spec: &'a LaunchSpec,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ProcessExit>> + Send + 'a>> {
        let result = self.play(spec);
        Box::pin(async move { result })
    }
}
