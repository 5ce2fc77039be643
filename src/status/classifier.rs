// src/status/classifier.rs

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::fs::FileSystem;
use crate::status::record::{STATE_KEY, StatusRecord};
use crate::types::{Outcome, ResponseState};

const RECORD_HEADER: &str = "managed process instance status";

/// Reads the status record and turns it into a [`ResponseState`].
///
/// Keeps the last successfully loaded record in memory so that the
/// supervisor can rewrite the `state` key without dropping the rest.
#[derive(Debug)]
pub struct StateClassifier {
    fs: Arc<dyn FileSystem>,
    status_file: PathBuf,
    record: StatusRecord,
}

impl StateClassifier {
    pub fn new(fs: Arc<dyn FileSystem>, status_file: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            status_file: status_file.into(),
            record: StatusRecord::new(),
        }
    }

    /// The record as of the last successful read.
    pub fn record(&self) -> &StatusRecord {
        &self.record
    }

    /// Classify the current status record. Never fails: every problem maps
    /// to `EMPTY` or `UNKNOWN`.
    pub fn classify(&mut self) -> ResponseState {
        if !self.fs.exists(&self.status_file) {
            debug!(path = %self.status_file.display(), "no status record");
            return ResponseState::Empty;
        }

        let contents = match self.fs.read_to_string(&self.status_file) {
            Ok(contents) => contents,
            Err(e) => {
                error!(
                    path = %self.status_file.display(),
                    error = %e,
                    "couldn't read status record"
                );
                return ResponseState::Unknown;
            }
        };

        self.record = StatusRecord::parse(&contents);

        if self.record.is_empty() {
            return ResponseState::Empty;
        }

        let Some(name) = self.record.state() else {
            warn!(path = %self.status_file.display(), "status record has no `state` entry");
            return ResponseState::Unknown;
        };

        match name.parse::<ResponseState>() {
            Ok(state) => {
                debug!(%state, "classified status record");
                state
            }
            Err(e) => {
                error!(error = %e, "could not classify status record");
                ResponseState::Unknown
            }
        }
    }

    /// Set `state` in the cached record and write it back.
    ///
    /// The managed process may have rewritten the file since the last
    /// [`classify`](Self::classify); those changes are overwritten.
    pub fn persist_state(&mut self, state: ResponseState) -> Outcome {
        self.record.set(STATE_KEY, state.name());
        let text = self.record.render(RECORD_HEADER);

        match self.fs.write(&self.status_file, text.as_bytes()) {
            Ok(()) => {
                debug!(%state, path = %self.status_file.display(), "status record written");
                Outcome::Succeeded
            }
            Err(e) => {
                error!(
                    %state,
                    path = %self.status_file.display(),
                    error = %e,
                    "could not write status record"
                );
                Outcome::Degraded(format!("could not set state to {state}: {e:#}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    const STATUS: &str = "/srv/app/bin/.state/instance.properties";

    fn classifier(fs: &MockFileSystem) -> StateClassifier {
        StateClassifier::new(Arc::new(fs.clone()), STATUS)
    }

    #[test]
    fn missing_file_is_empty() {
        let fs = MockFileSystem::new();
        assert_eq!(classifier(&fs).classify(), ResponseState::Empty);
    }

    #[test]
    fn blank_file_is_empty() {
        let fs = MockFileSystem::new();
        fs.add_file(STATUS, "# only a comment\n");
        assert_eq!(classifier(&fs).classify(), ResponseState::Empty);
    }

    #[test]
    fn unreadable_file_is_unknown() {
        let fs = MockFileSystem::new();
        fs.add_file(STATUS, "state=SHUTDOWN\n");
        fs.fail_on(STATUS);
        assert_eq!(classifier(&fs).classify(), ResponseState::Unknown);
    }

    #[test]
    fn missing_state_key_is_unknown() {
        let fs = MockFileSystem::new();
        fs.add_file(STATUS, "version=3\n");
        assert_eq!(classifier(&fs).classify(), ResponseState::Unknown);
    }

    #[test]
    fn unrecognized_state_is_unknown() {
        let fs = MockFileSystem::new();
        fs.add_file(STATUS, "state=NOT_A_REAL_STATE\n");
        assert_eq!(classifier(&fs).classify(), ResponseState::Unknown);
    }

    #[test]
    fn state_names_are_case_sensitive() {
        let fs = MockFileSystem::new();
        fs.add_file(STATUS, "state=shutdown\n");
        assert_eq!(classifier(&fs).classify(), ResponseState::Unknown);
    }

    #[test]
    fn classify_is_idempotent() {
        let fs = MockFileSystem::new();
        fs.add_file(STATUS, "state=RESTART\n");
        let mut c = classifier(&fs);
        let first = c.classify();
        assert_eq!(first, ResponseState::Restart);
        assert_eq!(c.classify(), first);
        assert_eq!(c.classify(), first);
    }

    #[test]
    fn persisted_updated_state_classifies_back() {
        let fs = MockFileSystem::new();
        fs.add_file(STATUS, "state=UPDATE\nguild=1234\n");
        let mut c = classifier(&fs);
        assert_eq!(c.classify(), ResponseState::Update);

        assert_eq!(c.persist_state(ResponseState::Updated), Outcome::Succeeded);

        let state = c.classify();
        assert_eq!(state, ResponseState::Updated);
        assert!(state.should_update());
        assert!(!state.should_restart());
        assert_eq!(c.record().get("guild"), Some("1234"));
    }

    #[test]
    fn failed_persist_is_degraded_not_fatal() {
        let fs = MockFileSystem::new();
        fs.add_file(STATUS, "state=UPDATE\n");
        let mut c = classifier(&fs);
        c.classify();
        fs.fail_on(STATUS);

        let outcome = c.persist_state(ResponseState::Updated);
        assert!(matches!(outcome, Outcome::Degraded(_)));
        assert!(outcome.is_success());
    }
}
