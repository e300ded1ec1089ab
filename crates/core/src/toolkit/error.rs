//! Error types for the toolkit module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while invoking an external tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Executable could not be resolved.
    #[error("{tool} not found at path: {path}")]
    NotFound { tool: String, path: PathBuf },

    /// The tool ran and reported failure. `diagnostic` is its own output.
    #[error("{tool} exited with {}: {diagnostic}", exit_label(.status))]
    InvocationFailed {
        tool: String,
        status: Option<i32>,
        diagnostic: String,
    },

    /// The tool exceeded the configured time limit and was killed.
    #[error("{tool} timed out after {timeout_secs} seconds")]
    Timeout { tool: String, timeout_secs: u64 },

    /// The tool reported success but an expected file is missing.
    #[error("{tool} did not produce {path}")]
    OutputMissing { tool: String, path: PathBuf },

    /// I/O error while spawning or talking to the tool.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("code {}", code),
        None => "signal".to_string(),
    }
}

impl ToolError {
    /// Creates a new invocation failed error.
    pub fn invocation_failed(
        tool: impl Into<String>,
        status: Option<i32>,
        diagnostic: impl Into<String>,
    ) -> Self {
        Self::InvocationFailed {
            tool: tool.into(),
            status,
            diagnostic: diagnostic.into(),
        }
    }

    /// Name of the tool involved, if known.
    pub fn tool(&self) -> Option<&str> {
        match self {
            Self::NotFound { tool, .. }
            | Self::InvocationFailed { tool, .. }
            | Self::Timeout { tool, .. }
            | Self::OutputMissing { tool, .. } => Some(tool),
            Self::Io(_) => None,
        }
    }
}
