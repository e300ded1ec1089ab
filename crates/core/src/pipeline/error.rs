//! Error types for the pipeline module.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use super::state::PipelineState;
use crate::remux::RemuxError;
use crate::selector::SelectionError;
use crate::toolkit::ToolError;
use crate::tracks::MetadataError;

/// Coarse classification of a pipeline error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input file, option or selection. Reported before side effects.
    InputValidation,
    /// A required executable could not be resolved.
    ExternalToolMissing,
    /// An external tool ran and failed.
    ExternalInvocationFailure,
    /// The identification document could not be interpreted.
    MalformedMetadata,
    /// Workspace I/O or a bug in stage sequencing.
    Internal,
}

/// Errors that can occur during a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("input is not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("could not read track selection: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("track {track_id} has unsupported codec {codec_id}")]
    UnsupportedCodec { track_id: u32, codec_id: String },

    #[error("{stage} failed: {source}")]
    Tool {
        stage: &'static str,
        #[source]
        source: ToolError,
    },

    #[error("malformed metadata: {0}")]
    MalformedMetadata(#[from] MetadataError),

    #[error("could not build remux parameters: {0}")]
    Remux(#[from] RemuxError),

    #[error("workspace {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("illegal transition from {from} to {to}")]
    InvalidTransition {
        from: PipelineState,
        to: PipelineState,
    },

    #[error("{0} output missing from run context")]
    MissingStageOutput(&'static str),
}

impl PipelineError {
    /// Wraps a toolkit error with the stage it happened in.
    pub fn tool(stage: &'static str, source: ToolError) -> Self {
        Self::Tool { stage, source }
    }

    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InputNotFound(_)
            | Self::NotAFile(_)
            | Self::InvalidOption(_)
            | Self::Selection(_)
            | Self::UnsupportedCodec { .. } => ErrorKind::InputValidation,
            Self::Tool { source, .. } => match source {
                ToolError::NotFound { .. } => ErrorKind::ExternalToolMissing,
                _ => ErrorKind::ExternalInvocationFailure,
            },
            Self::MalformedMetadata(_) => ErrorKind::MalformedMetadata,
            Self::Prompt(_)
            | Self::Remux(_)
            | Self::Workspace { .. }
            | Self::InvalidTransition { .. }
            | Self::MissingStageOutput(_) => ErrorKind::Internal,
        }
    }

    /// Returns true if the operator can fix this by changing the invocation.
    pub fn is_input_error(&self) -> bool {
        self.kind() == ErrorKind::InputValidation
    }
}

/// A run that ended in [`PipelineState::Failed`].
#[derive(Debug, Error)]
#[error("run failed after {last_state}: {error}")]
pub struct PipelineFailure {
    /// Last state reached before failing.
    pub last_state: PipelineState,
    /// States visited, ending with `Failed`.
    pub states: Vec<PipelineState>,
    /// Workspace that was in use, already torn down.
    pub workspace: Option<PathBuf>,
    #[source]
    pub error: PipelineError,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PipelineFailure {
    /// Always [`PipelineState::Failed`].
    pub fn state(&self) -> PipelineState {
        PipelineState::Failed
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            PipelineError::InputNotFound(PathBuf::from("x.mkv")).kind(),
            ErrorKind::InputValidation
        );
        assert_eq!(
            PipelineError::from(SelectionError::EmptySelection).kind(),
            ErrorKind::InputValidation
        );
        assert_eq!(
            PipelineError::tool(
                "identify",
                ToolError::NotFound {
                    tool: "mkvmerge".to_string(),
                    path: PathBuf::from("mkvmerge"),
                }
            )
            .kind(),
            ErrorKind::ExternalToolMissing
        );
        assert_eq!(
            PipelineError::tool("transform", ToolError::invocation_failed("ffmpeg", Some(1), "bad"))
                .kind(),
            ErrorKind::ExternalInvocationFailure
        );
        assert_eq!(
            PipelineError::from(MetadataError::malformed("not json")).kind(),
            ErrorKind::MalformedMetadata
        );
        assert_eq!(
            PipelineError::InvalidTransition {
                from: PipelineState::Init,
                to: PipelineState::Done
            }
            .kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_tool_error_keeps_diagnostic() {
        let err = PipelineError::tool(
            "transform",
            ToolError::invocation_failed("ffmpeg", Some(1), "Unknown encoder 'aac'"),
        );
        assert_eq!(
            err.to_string(),
            "transform failed: ffmpeg exited with code 1: Unknown encoder 'aac'"
        );
    }

    #[test]
    fn test_empty_selection_message() {
        let err = PipelineError::from(SelectionError::EmptySelection);
        assert_eq!(err.to_string(), "no tracks selected");
        assert!(err.is_input_error());
    }
}
