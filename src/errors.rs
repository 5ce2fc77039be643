// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::types::ResponseState;

#[derive(Error, Debug)]
pub enum RespawnError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("application folder {0} not found; pass --install to install it from the updates folder")]
    NotInstalled(String),

    #[error("application folder {0} still missing after installing from the updates folder; check the package placed there")]
    PackagingError(String),

    #[error("installation incomplete: neither data folder nor executable {0} present")]
    IncompleteInstallation(String),

    #[error("managed process is \"{0}\"; startup aborted")]
    StartupBlocked(ResponseState),

    #[error("update failed: {0}")]
    UpdateFailed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RespawnError>;
