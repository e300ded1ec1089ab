//! Types for the pipeline module.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use super::state::PipelineState;
use crate::remux::RemuxSpec;
use crate::runner::ProgressSnapshot;
use crate::selector::Selection;
use crate::tracks::{ContainerInfo, Track};

/// A selected track and the extension its extracted stream gets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedTrack {
    pub track: Track,
    /// Position among the container's audio tracks.
    pub audio_index: usize,
    pub extension: &'static str,
}

/// Progress notifications sent while a run is in flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// The run moved to a new state.
    StateChanged {
        from: PipelineState,
        to: PipelineState,
    },
    /// A transform settled.
    TransformProgress(ProgressSnapshot),
    /// The run reached a terminal state.
    Finished {
        state: PipelineState,
        output: Option<PathBuf>,
    },
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub container: ContainerInfo,
    pub selection: Selection,
    /// Parameter set passed to the remuxer.
    pub remux: RemuxSpec,
    /// States visited, from `Init` to `Done`.
    pub states: Vec<PipelineState>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Number of tracks appended to the output.
    pub fn added_track_count(&self) -> usize {
        self.remux.added_tracks.len()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Final state of the run.
    pub fn state(&self) -> PipelineState {
        self.states.last().copied().unwrap_or(PipelineState::Init)
    }
}
