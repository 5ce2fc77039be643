// src/logs/mod.rs

//! Archiving of the managed process's stdout/stderr log files.

pub mod archiver;

pub use archiver::{ARCHIVE_TIMESTAMP_FORMAT, ArchiveReport, LogArchiver};
