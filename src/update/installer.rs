// src/update/installer.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::fs::FileSystem;
use crate::types::Outcome;
use crate::update::extractor::Extractor;

/// Installs the single pending artifact from the incoming-updates folder.
#[derive(Debug)]
pub struct UpdateInstaller {
    fs: Arc<dyn FileSystem>,
    extractor: Arc<dyn Extractor>,
    updates_dir: PathBuf,
    install_root: PathBuf,
    supported_extensions: Vec<String>,
}

impl UpdateInstaller {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        extractor: Arc<dyn Extractor>,
        updates_dir: impl Into<PathBuf>,
        install_root: impl Into<PathBuf>,
        supported_extensions: Vec<String>,
    ) -> Self {
        Self {
            fs,
            extractor,
            updates_dir: updates_dir.into(),
            install_root: install_root.into(),
            supported_extensions,
        }
    }

    pub fn updates_dir(&self) -> &Path {
        &self.updates_dir
    }

    /// Install whatever is waiting in the updates folder.
    ///
    /// - nothing waiting (or the folder had to be created): `Succeeded`
    /// - one artifact, extracted and removed: `Succeeded`
    /// - one artifact, extracted but not removed: `Degraded`
    /// - folder not creatable/listable, extraction failed, or more than one
    ///   artifact: `Failed`, with nothing extracted or deleted
    pub async fn install_pending_update(&self) -> Outcome {
        if !self.fs.exists(&self.updates_dir) {
            return match self.fs.create_dir_all(&self.updates_dir) {
                Ok(()) => {
                    info!(dir = %self.updates_dir.display(), "created updates folder; nothing to install");
                    Outcome::Succeeded
                }
                Err(e) => {
                    error!(error = %e, "updates folder does not exist and cannot be created");
                    Outcome::Failed(format!(
                        "cannot create updates folder {:?}: {e:#}",
                        self.updates_dir
                    ))
                }
            };
        }

        let mut pending = match self.fs.read_dir(&self.updates_dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!(error = %e, "could not list updates folder contents");
                return Outcome::Failed(format!(
                    "cannot list updates folder {:?}: {e:#}",
                    self.updates_dir
                ));
            }
        };

        let artifact = match pending.len() {
            0 => {
                debug!("no update pending");
                return Outcome::Succeeded;
            }
            1 => pending.remove(0),
            n => {
                pending.sort();
                error!(
                    count = n,
                    artifacts = ?pending,
                    "more than one update found; remove all but one"
                );
                return Outcome::Failed(format!(
                    "{n} updates pending in {:?}; only one at a time is supported",
                    self.updates_dir
                ));
            }
        };

        if !self.is_supported(&artifact) {
            warn!(
                artifact = %artifact.display(),
                supported = ?self.supported_extensions,
                "update has an unexpected file type; trying anyway"
            );
        }

        if let Err(e) = self.extractor.extract(&artifact, &self.install_root).await {
            error!(artifact = %artifact.display(), error = %e, "could not unpack update");
            return Outcome::Failed(format!("unpacking {:?} failed: {e:#}", artifact));
        }

        info!(artifact = %artifact.display(), "update installed");

        match self.fs.remove_file(&artifact) {
            Ok(()) => Outcome::Succeeded,
            Err(e) => {
                warn!(artifact = %artifact.display(), error = %e, "update was not deleted after unpacking");
                Outcome::Degraded(format!("installed update {:?} left in place: {e:#}", artifact))
            }
        }
    }

    fn is_supported(&self, artifact: &Path) -> bool {
        artifact
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.supported_extensions.iter().any(|s| *s == ext)
            })
            .unwrap_or(false)
    }
}
