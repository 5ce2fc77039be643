// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{RawConfigFile, SupervisorConfig};
use crate::errors::{RespawnError, Result};

/// File name looked up inside the installation root when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "respawn.toml";

/// Load a layout file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to get
/// a usable [`SupervisorConfig`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a layout file and resolve it against `root`.
pub fn load_and_validate(path: impl AsRef<Path>, root: impl AsRef<Path>) -> Result<SupervisorConfig> {
    let raw = load_from_path(&path)?;
    raw.into_config(root)
}

/// Resolve the configuration for an installation root.
///
/// - An explicit `config` path must exist.
/// - Otherwise `<root>/respawn.toml` is used if present, else all defaults.
pub fn load_for_root(root: &Path, config: Option<&Path>) -> Result<SupervisorConfig> {
    let root = absolute_root(root);

    match config {
        Some(path) => {
            if !path.is_file() {
                return Err(RespawnError::ConfigError(format!(
                    "layout file {:?} does not exist",
                    path
                )));
            }
            load_and_validate(path, &root)
        }
        None => {
            let path = default_config_path(&root);
            if path.is_file() {
                debug!(path = %path.display(), "using layout file from installation root");
                load_and_validate(&path, &root)
            } else {
                debug!("no layout file; using default layout");
                RawConfigFile::default().into_config(&root)
            }
        }
    }
}

/// `<root>/respawn.toml`.
pub fn default_config_path(root: &Path) -> PathBuf {
    root.join(DEFAULT_CONFIG_FILE)
}

/// Child processes get their own working directory, so relative paths must
/// be anchored before anything is spawned.
fn absolute_root(root: &Path) -> PathBuf {
    fs::canonicalize(root).unwrap_or_else(|_| {
        std::env::current_dir()
            .map(|cwd| cwd.join(root))
            .unwrap_or_else(|_| root.to_path_buf())
    })
}
