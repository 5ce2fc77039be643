use std::sync::Arc;

use respawn::config::{RawConfigFile, SupervisorConfig};
use respawn::fs::mock::MockFileSystem;

/// Installation root used by the in-memory fixtures.
pub const ROOT: &str = "/srv/bot";

/// A mock filesystem plus the layout that describes it.
#[derive(Debug, Clone)]
pub struct Installation {
    pub fs: MockFileSystem,
    pub config: Arc<SupervisorConfig>,
}

/// Builder for an in-memory installation tree.
///
/// Defaults: application and data folder present, no status record, no
/// logs, no updates folder, zero grace period.
pub struct InstallationBuilder {
    raw: RawConfigFile,
    installed: bool,
    with_data_dir: bool,
    status: Option<String>,
    stdout_log: Option<(String, u64)>,
    updates: Option<Vec<String>>,
}

impl InstallationBuilder {
    pub fn new() -> Self {
        let mut raw = RawConfigFile::default();
        raw.supervisor.grace_period = Some("0ms".to_string());
        Self {
            raw,
            installed: true,
            with_data_dir: true,
            status: None,
            stdout_log: None,
            updates: None,
        }
    }

    pub fn not_installed(mut self) -> Self {
        self.installed = false;
        self.with_data_dir = false;
        self
    }

    pub fn without_data_dir(mut self) -> Self {
        self.with_data_dir = false;
        self
    }

    /// Raw status record contents, e.g. `"state=SHUTDOWN\n"`.
    pub fn with_status(mut self, contents: &str) -> Self {
        self.status = Some(contents.to_string());
        self
    }

    pub fn with_stdout_log(mut self, contents: &str, modified_ms: u64) -> Self {
        self.stdout_log = Some((contents.to_string(), modified_ms));
        self
    }

    /// Create the updates folder holding the given artifact names.
    pub fn with_updates(mut self, names: &[&str]) -> Self {
        self.updates = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn with_grace_period(mut self, grace: &str) -> Self {
        self.raw.supervisor.grace_period = Some(grace.to_string());
        self
    }

    pub fn build(self) -> Installation {
        let config = self
            .raw
            .into_config(ROOT)
            .expect("Failed to build valid layout from builder");
        let fs = MockFileSystem::new();
        fs.add_dir(ROOT);

        if self.installed {
            fs.add_dir(&config.app_dir);
            fs.add_dir(&config.work_dir);
            fs.add_file(&config.executable, "#!/bin/sh\n");
        }
        if self.with_data_dir {
            fs.add_dir(&config.data_dir);
        }
        if let Some(status) = self.status {
            fs.add_file(&config.status_file, status);
        }
        if let Some((contents, modified_ms)) = self.stdout_log {
            fs.add_file(&config.stdout_log, contents);
            fs.set_modified(&config.stdout_log, modified_ms);
        }
        if let Some(updates) = self.updates {
            fs.add_dir(&config.updates_dir);
            for name in updates {
                fs.add_file(config.updates_dir.join(name), "PK\u{3}\u{4}");
            }
        }

        Installation {
            fs,
            config: Arc::new(config),
        }
    }
}

impl Default for InstallationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Archived file names in the mock archive folder.
pub fn archived(installation: &Installation) -> Vec<String> {
    installation.fs.list(&installation.config.archive_dir)
}
