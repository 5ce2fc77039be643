// src/update/extractor.rs

//! Pluggable archive extraction.
//!
//! The installer talks to an `Extractor` instead of spawning `unzip` itself,
//! so tests can count and fake extractions without touching the disk.

use std::fmt::Debug;
use std::fs::{self, File};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{anyhow, bail, Context, Result};
use tokio::process::Command;
use tracing::{debug, info};

/// Unpacks one update artifact over a destination directory.
pub trait Extractor: Send + Sync + Debug {
    fn extract<'a>(
        &'a self,
        artifact: &'a Path,
        destination: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Runs an external extraction program, e.g. `unzip -o <artifact>`, inside
/// the destination directory.
///
/// stdout and stderr both go to the unpack log, which is truncated on every
/// extraction.
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    command: Vec<String>,
    unpack_log: PathBuf,
}

impl CommandExtractor {
    /// `command` is the program followed by its leading arguments; the
    /// artifact path is appended as the last argument.
    pub fn new(command: Vec<String>, unpack_log: impl Into<PathBuf>) -> Self {
        Self {
            command,
            unpack_log: unpack_log.into(),
        }
    }

    fn open_unpack_log(&self) -> Result<(Stdio, Stdio)> {
        if let Some(parent) = self.unpack_log.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating dir {:?}", parent))?;
        }
        let out = File::create(&self.unpack_log)
            .with_context(|| format!("creating unpack log {:?}", self.unpack_log))?;
        let err = out
            .try_clone()
            .with_context(|| format!("sharing unpack log {:?}", self.unpack_log))?;
        Ok((Stdio::from(out), Stdio::from(err)))
    }

    async fn run(&self, artifact: &Path, destination: &Path) -> Result<()> {
        let (program, leading_args) = self
            .command
            .split_first()
            .ok_or_else(|| anyhow!("no extraction command configured"))?;

        let (stdout, stderr) = self.open_unpack_log()?;

        info!(
            program = %program,
            artifact = %artifact.display(),
            destination = %destination.display(),
            "extracting update"
        );

        let status = Command::new(program)
            .args(leading_args)
            .arg(artifact)
            .current_dir(destination)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .status()
            .await
            .with_context(|| format!("running extraction command '{program}'"))?;

        debug!(?status, "extraction command exited");

        if !status.success() {
            bail!(
                "'{program}' exited with {status}; see {}",
                self.unpack_log.display()
            );
        }
        Ok(())
    }
}

impl Extractor for CommandExtractor {
    fn extract<'a>(
        &'a self,
        artifact: &'a Path,
        destination: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(self.run(artifact, destination))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("unpack.log");
        let extractor = CommandExtractor::new(vec!["false".into()], &log);

        let result = extractor
            .extract(&dir.path().join("update.zip"), dir.path())
            .await;

        assert!(result.is_err());
        assert!(log.exists());
    }

    #[tokio::test]
    async fn output_is_captured_in_unpack_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("logs/unpack.log");
        let extractor = CommandExtractor::new(vec!["echo".into(), "unpacking".into()], &log);

        extractor
            .extract(Path::new("update.zip"), dir.path())
            .await
            .unwrap();

        let captured = fs::read_to_string(&log).unwrap();
        assert_eq!(captured.trim(), "unpacking update.zip");
    }

    #[tokio::test]
    async fn artifact_name_is_never_shell_interpreted() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("unpack.log");
        let extractor = CommandExtractor::new(vec!["echo".into()], &log);

        extractor
            .extract(Path::new("a.zip; touch pwned"), dir.path())
            .await
            .unwrap();

        assert!(!dir.path().join("pwned").exists());
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = CommandExtractor::new(
            vec!["definitely-not-an-extractor-4711".into()],
            dir.path().join("unpack.log"),
        );
        assert!(extractor
            .extract(Path::new("update.zip"), dir.path())
            .await
            .is_err());
    }
}
