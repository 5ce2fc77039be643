// src/update/mod.rs

//! Update installation.
//!
//! - [`installer`] decides whether there is exactly one artifact to apply and
//!   cleans it up afterwards.
//! - [`extractor`] provides the `Extractor` trait and the `CommandExtractor`
//!   used in production.

pub mod extractor;
pub mod installer;

pub use extractor::{CommandExtractor, Extractor};
pub use installer::UpdateInstaller;
