// src/status/mod.rs

//! Status record handling: parsing the key/value file the managed process
//! writes, and classifying it into a [`ResponseState`](crate::types::ResponseState).

pub mod classifier;
pub mod record;

pub use classifier::StateClassifier;
pub use record::{STATE_KEY, StatusRecord};
