// src/config/mod.rs

//! Layout configuration: which paths the supervisor works with and how the
//! managed process and the extraction command are invoked.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{DEFAULT_CONFIG_FILE, load_and_validate, load_for_root};
pub use model::{
    DEFAULT_GRACE_PERIOD, LaunchFlags, LayoutSection, LogsSection, RawConfigFile,
    SupervisorConfig, SupervisorSection, UpdateSection,
};
pub use validate::parse_duration;
