//! Coordinator state machine — tracks where one email-check run is.

use serde::{Deserialize, Serialize};

/// The states of a single coordinator run.
///
/// Start → DecideBranch → (AwaitAcknowledgment → Cancelling →) Done.
/// The bracketed leg is skipped when there is nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorState {
    Start,
    DecideBranch,
    AwaitAcknowledgment,
    Cancelling,
    Done,
}

impl CoordinatorState {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: CoordinatorState) -> bool {
        use CoordinatorState::*;
        matches!(
            (self, target),
            (Start, DecideBranch)
                | (DecideBranch, AwaitAcknowledgment)
                | (DecideBranch, Done)
                | (AwaitAcknowledgment, Cancelling)
                | (Cancelling, Done)
        )
    }

    /// Whether the run is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Whether the edit watcher may be alive in this state.
    pub fn watcher_alive(&self) -> bool {
        matches!(self, Self::AwaitAcknowledgment | Self::Cancelling)
    }
}

impl Default for CoordinatorState {
    fn default() -> Self {
        Self::Start
    }
}

impl std::fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::DecideBranch => "decide_branch",
            Self::AwaitAcknowledgment => "await_acknowledgment",
            Self::Cancelling => "cancelling",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}
