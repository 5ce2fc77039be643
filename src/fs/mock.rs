// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { content: Vec<u8>, modified_ms: u64 },
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    failing: HashSet<PathBuf>,
}

/// In-memory filesystem shared between clones.
///
/// Fake launchers and extractors hold a clone so that "the managed process"
/// and the supervisor see the same tree.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn parent_of(path: &Path) -> Option<&Path> {
    path.parent().map(|parent| {
        if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        }
    })
}

fn child_name(path: &Path) -> Option<String> {
    path.file_name().and_then(|n| n.to_str()).map(str::to_string)
}

impl MockState {
    fn ensure_dir_entry(&mut self, path: &Path) {
        if self.entries.contains_key(path) {
            return;
        }
        self.entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        if let Some(parent) = parent_of(path) {
            if parent != path {
                self.ensure_dir_entry(parent);
                self.link_child(parent, path);
            }
        }
    }

    fn link_child(&mut self, parent: &Path, path: &Path) {
        if let (Some(MockEntry::Dir(children)), Some(name)) =
            (self.entries.get_mut(parent), child_name(path))
        {
            if !children.contains(&name) {
                children.push(name);
            }
        }
    }

    fn unlink_child(&mut self, path: &Path) {
        if let (Some(parent), Some(name)) = (parent_of(path), child_name(path)) {
            if let Some(MockEntry::Dir(children)) = self.entries.get_mut(parent) {
                children.retain(|c| c != &name);
            }
        }
    }

    fn put_file(&mut self, path: &Path, content: Vec<u8>, modified_ms: u64) {
        self.entries.insert(
            path.to_path_buf(),
            MockEntry::File {
                content,
                modified_ms,
            },
        );
        if let Some(parent) = parent_of(path) {
            self.ensure_dir_entry(parent);
            self.link_child(parent, path);
        }
    }

    fn check(&self, path: &Path) -> Result<()> {
        if self.failing.contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        Ok(())
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let fs = Self::default();
        // Ensure root exists
        fs.state
            .lock()
            .unwrap()
            .entries
            .insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));
        fs
    }

    /// Add a file (and its parent directories) stamped with the current time.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let mut state = self.state.lock().unwrap();
        state.put_file(path.as_ref(), content.into(), now_millis());
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.state.lock().unwrap().ensure_dir_entry(path.as_ref());
    }

    /// Override a file's modification time; `0` means "unknown".
    pub fn set_modified(&self, path: impl AsRef<Path>, modified: u64) {
        let mut state = self.state.lock().unwrap();
        if let Some(MockEntry::File { modified_ms, .. }) = state.entries.get_mut(path.as_ref()) {
            *modified_ms = modified;
        }
    }

    /// Make every operation touching `path` fail, as if permission were denied.
    pub fn fail_on(&self, path: impl AsRef<Path>) {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(path.as_ref().to_path_buf());
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path.as_ref()) {
            Some(MockEntry::File { content, .. }) => {
                Some(String::from_utf8_lossy(content).into_owned())
            }
            _ => None,
        }
    }

    /// Sorted child names of a directory (empty if it does not exist).
    pub fn list(&self, path: impl AsRef<Path>) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut names = match state.entries.get(path.as_ref()) {
            Some(MockEntry::Dir(children)) => children.clone(),
            _ => Vec::new(),
        };
        names.sort();
        names
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let state = self.state.lock().unwrap();
        state.check(path)?;
        match state.entries.get(path) {
            Some(MockEntry::File { content, .. }) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.check(path)?;
        state.put_file(path, contents.to_vec(), now_millis());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.state.lock().unwrap().entries.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        matches!(state.entries.get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        matches!(state.entries.get(path), Some(MockEntry::Dir(_)))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.check(path)?;
        if matches!(state.entries.get(path), Some(MockEntry::File { .. })) {
            return Err(anyhow!("File exists: {:?}", path));
        }
        state.ensure_dir_entry(path);
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.state.lock().unwrap();
        state.check(path)?;
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.check(from)?;
        state.check(to)?;
        let target_dir_exists = matches!(
            parent_of(to).and_then(|parent| state.entries.get(parent)),
            Some(MockEntry::Dir(_))
        );
        if !target_dir_exists {
            return Err(anyhow!("Target directory missing for {:?}", to));
        }
        let entry = state
            .entries
            .remove(from)
            .ok_or_else(|| anyhow!("File not found: {:?}", from))?;
        state.unlink_child(from);
        match entry {
            MockEntry::File {
                content,
                modified_ms,
            } => state.put_file(to, content, modified_ms),
            dir @ MockEntry::Dir(_) => {
                state.entries.insert(to.to_path_buf(), dir);
                if let Some(parent) = parent_of(to) {
                    state.link_child(parent, to);
                }
            }
        }
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.check(path)?;
        match state.entries.get(path) {
            Some(MockEntry::File { .. }) => {}
            Some(MockEntry::Dir(_)) => return Err(anyhow!("Is a directory: {:?}", path)),
            None => return Err(anyhow!("File not found: {:?}", path)),
        }
        state.entries.remove(path);
        state.unlink_child(path);
        Ok(())
    }

    fn modified_millis(&self, path: &Path) -> Result<u64> {
        let state = self.state.lock().unwrap();
        state.check(path)?;
        match state.entries.get(path) {
            Some(MockEntry::File { modified_ms, .. }) => Ok(*modified_ms),
            Some(MockEntry::Dir(_)) => Ok(0),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_moves_between_directories() {
        let fs = MockFileSystem::new();
        fs.add_file("/srv/a.log", "line");
        fs.add_dir("/srv/archive");

        fs.rename(Path::new("/srv/a.log"), Path::new("/srv/archive/x_a.log"))
            .unwrap();

        assert!(!fs.exists(Path::new("/srv/a.log")));
        assert_eq!(fs.list("/srv/archive"), vec!["x_a.log"]);
        assert_eq!(fs.contents("/srv/archive/x_a.log").as_deref(), Some("line"));
        assert_eq!(fs.list("/srv"), vec!["archive"]);
    }

    #[test]
    fn rename_into_missing_directory_fails() {
        let fs = MockFileSystem::new();
        fs.add_file("/srv/a.log", "line");
        assert!(fs
            .rename(Path::new("/srv/a.log"), Path::new("/srv/nope/a.log"))
            .is_err());
        assert!(fs.exists(Path::new("/srv/a.log")));
    }

    #[test]
    fn failing_paths_reject_reads() {
        let fs = MockFileSystem::new();
        fs.add_file("/srv/status", "state=UPDATE");
        fs.fail_on("/srv/status");
        assert!(fs.exists(Path::new("/srv/status")));
        assert!(fs.read_to_string(Path::new("/srv/status")).is_err());
    }

    #[test]
    fn modified_time_can_be_pinned() {
        let fs = MockFileSystem::new();
        fs.add_file("/srv/a.log", "");
        fs.set_modified("/srv/a.log", 1_000);
        assert_eq!(fs.modified_millis(Path::new("/srv/a.log")).unwrap(), 1_000);
    }
}
