// src/types.rs

use std::fmt;
use std::str::FromStr;

/// What a response state permits the supervisor to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub allow_start: bool,
    pub should_update: bool,
    pub should_restart: bool,
    pub is_unexpected: bool,
}

impl Capabilities {
    const fn new(
        allow_start: bool,
        should_update: bool,
        should_restart: bool,
        is_unexpected: bool,
    ) -> Self {
        Self {
            allow_start,
            should_update,
            should_restart,
            is_unexpected,
        }
    }
}

const START_ONLY: Capabilities = Capabilities::new(true, false, false, false);
const UPDATE_AND_RESTART: Capabilities = Capabilities::new(true, true, true, false);
const UPDATE_ONLY: Capabilities = Capabilities::new(false, true, false, false);
const RESTART_ONLY: Capabilities = Capabilities::new(false, false, true, false);
const UNEXPECTED: Capabilities = Capabilities::new(false, false, false, true);

/// Last known lifecycle state of the managed process, as reported through its
/// status record.
///
/// The capability set of each variant is fixed; see [`ResponseState::capabilities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseState {
    Override,
    Update,
    Updated,
    Shutdown,
    Restart,
    WrapperError,
    /// No status record found.
    Empty,
    /// Status record could not be read or classified.
    Unknown,
}

impl ResponseState {
    pub const ALL: [ResponseState; 8] = [
        ResponseState::Override,
        ResponseState::Update,
        ResponseState::Updated,
        ResponseState::Shutdown,
        ResponseState::Restart,
        ResponseState::WrapperError,
        ResponseState::Empty,
        ResponseState::Unknown,
    ];

    pub const fn capabilities(self) -> Capabilities {
        match self {
            ResponseState::Override => START_ONLY,
            ResponseState::Update => UPDATE_AND_RESTART,
            ResponseState::Updated => UPDATE_ONLY,
            ResponseState::Shutdown => START_ONLY,
            ResponseState::Restart => RESTART_ONLY,
            ResponseState::WrapperError => UNEXPECTED,
            ResponseState::Empty => START_ONLY,
            ResponseState::Unknown => UNEXPECTED,
        }
    }

    pub fn allows_start(self) -> bool {
        self.capabilities().allow_start
    }

    pub fn should_update(self) -> bool {
        self.capabilities().should_update
    }

    pub fn should_restart(self) -> bool {
        self.capabilities().should_restart
    }

    pub fn is_unexpected(self) -> bool {
        self.capabilities().is_unexpected
    }

    /// Name as written in the status record.
    pub fn name(self) -> &'static str {
        match self {
            ResponseState::Override => "OVERRIDE",
            ResponseState::Update => "UPDATE",
            ResponseState::Updated => "UPDATED",
            ResponseState::Shutdown => "SHUTDOWN",
            ResponseState::Restart => "RESTART",
            ResponseState::WrapperError => "WRAPPER_ERROR",
            ResponseState::Empty => "EMPTY",
            ResponseState::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ResponseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResponseState {
    type Err = String;

    /// Exact, case-sensitive match on the variant name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResponseState::ALL
            .into_iter()
            .find(|state| state.name() == s)
            .ok_or_else(|| format!("unrecognized instance state \"{s}\""))
    }
}

/// Result of a best-effort step.
///
/// - `Succeeded`: the step did everything it set out to do.
/// - `Degraded`: something went wrong, but the caller may carry on.
/// - `Failed`: the caller must not continue with whatever depended on this step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Degraded(String),
    Failed(String),
}

impl Outcome {
    /// Collapse to the boolean "did it work" contract: degraded still counts.
    pub fn is_success(&self) -> bool {
        !self.is_fatal()
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// Where the supervisor currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorPhase {
    NotInstalled,
    DataMissing,
    Ready,
    Running,
    Updating,
    Stopped,
}

impl fmt::Display for SupervisorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SupervisorPhase::NotInstalled => "not-installed",
            SupervisorPhase::DataMissing => "data-missing",
            SupervisorPhase::Ready => "ready",
            SupervisorPhase::Running => "running",
            SupervisorPhase::Updating => "updating",
            SupervisorPhase::Stopped => "stopped",
        };
        f.write_str(s)
    }
}
