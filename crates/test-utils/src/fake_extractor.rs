use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use respawn::fs::mock::MockFileSystem;
use respawn::update::Extractor;

/// A fake extractor that:
/// - records `(artifact, destination)` for every call
/// - succeeds or fails as configured
/// - on success, optionally drops files into the mock filesystem (relative
///   to the destination), standing in for the unpacked archive
#[derive(Debug, Clone)]
pub struct FakeExtractor {
    fs: MockFileSystem,
    succeed: bool,
    unpacks: Vec<(PathBuf, String)>,
    calls: Arc<Mutex<Vec<(PathBuf, PathBuf)>>>,
}

impl FakeExtractor {
    pub fn succeeding(fs: MockFileSystem) -> Self {
        Self {
            fs,
            succeed: true,
            unpacks: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(fs: MockFileSystem) -> Self {
        Self {
            succeed: false,
            ..Self::succeeding(fs)
        }
    }

    /// File the fake archive contains, relative to the destination.
    pub fn unpacks(mut self, rel: &str, contents: &str) -> Self {
        self.unpacks.push((PathBuf::from(rel), contents.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Extractor for FakeExtractor {
    fn extract<'a>(
        &'a self,
        artifact: &'a Path,
        destination: &'a Path,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push((artifact.to_path_buf(), destination.to_path_buf()));

            if !self.succeed {
                return Err(anyhow!("unzip: cannot find zipfile directory in {:?}", artifact));
            }
            for (rel, contents) in &self.unpacks {
                self.fs.add_file(destination.join(rel), contents.as_str());
            }
            Ok(())
        })
    }
}
