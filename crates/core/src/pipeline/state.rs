//! Pipeline state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a run is. Forward order is fixed; `Failed` is reachable from any
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Init,
    Identified,
    Selected,
    WorkspaceReady,
    Extracted,
    Transformed,
    Remuxed,
    CleanedUp,
    Done,
    Failed,
}

impl PipelineState {
    /// The forward path, in order.
    pub const SEQUENCE: [PipelineState; 9] = [
        PipelineState::Init,
        PipelineState::Identified,
        PipelineState::Selected,
        PipelineState::WorkspaceReady,
        PipelineState::Extracted,
        PipelineState::Transformed,
        PipelineState::Remuxed,
        PipelineState::CleanedUp,
        PipelineState::Done,
    ];

    /// The single forward successor, if any.
    pub fn next(&self) -> Option<PipelineState> {
        match self {
            PipelineState::Init => Some(PipelineState::Identified),
            PipelineState::Identified => Some(PipelineState::Selected),
            PipelineState::Selected => Some(PipelineState::WorkspaceReady),
            PipelineState::WorkspaceReady => Some(PipelineState::Extracted),
            PipelineState::Extracted => Some(PipelineState::Transformed),
            PipelineState::Transformed => Some(PipelineState::Remuxed),
            PipelineState::Remuxed => Some(PipelineState::CleanedUp),
            PipelineState::CleanedUp => Some(PipelineState::Done),
            PipelineState::Done | PipelineState::Failed => None,
        }
    }

    /// Returns true if `to` is a legal next state.
    pub fn can_transition_to(&self, to: PipelineState) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == PipelineState::Failed || self.next() == Some(to)
    }

    /// Returns true if the run is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }

    /// Returns the state as a stable string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Init => "init",
            PipelineState::Identified => "identified",
            PipelineState::Selected => "selected",
            PipelineState::WorkspaceReady => "workspace_ready",
            PipelineState::Extracted => "extracted",
            PipelineState::Transformed => "transformed",
            PipelineState::Remuxed => "remuxed",
            PipelineState::CleanedUp => "cleaned_up",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
