// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use tracing::debug;

pub mod mock;

/// Abstract filesystem interface.
///
/// Everything the supervisor does to the installation tree goes through this
/// trait, so whole supervision cycles can run against [`mock::MockFileSystem`].
pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Return a list of entries in a directory.
    /// Returns full paths.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;

    /// Last modification time in milliseconds since the Unix epoch.
    fn modified_millis(&self, path: &Path) -> Result<u64>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading file {:?}", path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating dir {:?}", parent))?;
        }
        let mut file = fs::File::create(path).with_context(|| format!("creating file {:?}", path))?;
        file.write_all(contents).with_context(|| format!("writing to file {:?}", path))?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("creating dir {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry?;
            entries.push(entry.path());
        }
        Ok(entries)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                debug!(from = %from.display(), to = %to.display(), "target on another filesystem; copying");
                move_across_devices(from, to)
            }
            Err(e) => Err(e).with_context(|| format!("moving {:?} to {:?}", from, to)),
        }
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).with_context(|| format!("removing file {:?}", path))
    }

    fn modified_millis(&self, path: &Path) -> Result<u64> {
        let modified = fs::metadata(path)
            .and_then(|m| m.modified())
            .with_context(|| format!("reading modification time of {:?}", path))?;
        // Clocks set before 1970 report as "unknown".
        let millis = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Ok(millis)
    }
}

/// Copy, flush the copy to disk, then delete the source.
fn move_across_devices(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).with_context(|| format!("copying {:?} to {:?}", from, to))?;
    fs::File::open(to)
        .and_then(|copy| copy.sync_all())
        .with_context(|| format!("syncing {:?}", to))?;
    fs::remove_file(from).with_context(|| format!("removing {:?} after copying it", from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_fs_rename_and_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFileSystem;
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("nested/b.txt");

        fs.write(&src, b"hello").unwrap();
        assert!(fs.modified_millis(&src).unwrap() > 0);

        fs.create_dir_all(dst.parent().unwrap()).unwrap();
        fs.rename(&src, &dst).unwrap();
        assert!(!fs.exists(&src));
        assert_eq!(fs.read_to_string(&dst).unwrap(), "hello");

        fs.remove_file(&dst).unwrap();
        assert!(fs.read_dir(&dir.path().join("nested")).unwrap().is_empty());
    }

    #[test]
    fn copy_fallback_moves_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("process.log");
        let dst = dir.path().join("archive.log");
        std::fs::write(&src, "line\n").unwrap();

        move_across_devices(&src, &dst).unwrap();

        assert!(!src.exists());
        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "line\n");
    }

    // Needs a tmpfs at /dev/shm on a different device than the temp dir;
    // skipped where the two share a filesystem.
    #[cfg(target_os = "linux")]
    #[test]
    fn rename_onto_another_filesystem() {
        use std::os::unix::fs::MetadataExt;

        let shm = Path::new("/dev/shm");
        let here = tempfile::tempdir().unwrap();
        let Ok(there) = tempfile::tempdir_in(shm) else {
            return;
        };
        let device = |p: &Path| std::fs::metadata(p).unwrap().dev();
        if device(here.path()) == device(there.path()) {
            return;
        }

        let fs = RealFileSystem;
        let src = here.path().join("process.log");
        let dst = there.path().join("20240305_140709_process.log");
        fs.write(&src, b"hello").unwrap();

        fs.rename(&src, &dst).unwrap();

        assert!(!fs.exists(&src));
        assert_eq!(fs.read_to_string(&dst).unwrap(), "hello");
    }
}
