//! Per-run state threaded through the stages.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use super::error::PipelineError;
use super::state::PipelineState;
use super::types::{PlannedTrack, RunReport};
use crate::remux::{RemuxSpec, TrackArtifact};
use crate::selector::Selection;
use crate::tracks::ContainerInfo;

/// Everything a run has produced so far.
///
/// Each stage takes the context by value, fills in its own output and hands
/// it back advanced by one state. Later stages read earlier outputs through
/// the accessors, which fail if a stage was skipped.
#[derive(Debug, Clone)]
pub struct RunContext {
    input: PathBuf,
    state: PipelineState,
    states: Vec<PipelineState>,
    started_at: DateTime<Utc>,
    container: Option<ContainerInfo>,
    selection: Option<Selection>,
    plan: Vec<PlannedTrack>,
    workspace: Option<PathBuf>,
    extracted: Vec<TrackArtifact>,
    transformed: Vec<TrackArtifact>,
    remux: Option<RemuxSpec>,
}

impl RunContext {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            state: PipelineState::Init,
            states: vec![PipelineState::Init],
            started_at: Utc::now(),
            container: None,
            selection: None,
            plan: Vec::new(),
            workspace: None,
            extracted: Vec::new(),
            transformed: Vec::new(),
            remux: None,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn states(&self) -> &[PipelineState] {
        &self.states
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Moves to `to` if that is the legal next state.
    pub fn advance(mut self, to: PipelineState) -> Result<Self, PipelineError> {
        if !self.state.can_transition_to(to) || to == PipelineState::Failed {
            return Err(PipelineError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        self.states.push(to);
        Ok(self)
    }

    pub fn with_container(mut self, container: ContainerInfo) -> Self {
        self.container = Some(container);
        self
    }

    pub fn with_selection(mut self, selection: Selection, plan: Vec<PlannedTrack>) -> Self {
        self.selection = Some(selection);
        self.plan = plan;
        self
    }

    pub fn with_workspace(mut self, path: PathBuf) -> Self {
        self.workspace = Some(path);
        self
    }

    pub fn with_extracted(mut self, artifacts: Vec<TrackArtifact>) -> Self {
        self.extracted = artifacts;
        self
    }

    pub fn with_transformed(mut self, artifacts: Vec<TrackArtifact>) -> Self {
        self.transformed = artifacts;
        self
    }

    pub fn with_remux(mut self, spec: RemuxSpec) -> Self {
        self.remux = Some(spec);
        self
    }

    pub fn container(&self) -> Result<&ContainerInfo, PipelineError> {
        self.container
            .as_ref()
            .ok_or(PipelineError::MissingStageOutput("identify"))
    }

    pub fn selection(&self) -> Result<&Selection, PipelineError> {
        self.selection
            .as_ref()
            .ok_or(PipelineError::MissingStageOutput("select"))
    }

    /// Extraction plan, aligned with the selection.
    pub fn plan(&self) -> &[PlannedTrack] {
        &self.plan
    }

    pub fn workspace(&self) -> Result<&Path, PipelineError> {
        self.workspace
            .as_deref()
            .ok_or(PipelineError::MissingStageOutput("prepare workspace"))
    }

    pub fn extracted(&self) -> &[TrackArtifact] {
        &self.extracted
    }

    pub fn transformed(&self) -> &[TrackArtifact] {
        &self.transformed
    }

    pub fn remux(&self) -> Result<&RemuxSpec, PipelineError> {
        self.remux
            .as_ref()
            .ok_or(PipelineError::MissingStageOutput("remux"))
    }

    /// Takes the final step to `Done` and builds the report.
    ///
    /// Only valid from `CleanedUp`.
    pub fn finish(self) -> Result<RunReport, PipelineError> {
        if !self.state.can_transition_to(PipelineState::Done) {
            return Err(PipelineError::InvalidTransition {
                from: self.state,
                to: PipelineState::Done,
            });
        }
        let container = self
            .container
            .ok_or(PipelineError::MissingStageOutput("identify"))?;
        let selection = self
            .selection
            .ok_or(PipelineError::MissingStageOutput("select"))?;
        let remux = self
            .remux
            .ok_or(PipelineError::MissingStageOutput("remux"))?;

        let mut states = self.states;
        states.push(PipelineState::Done);

        Ok(RunReport {
            input: self.input,
            output: remux.output.clone(),
            container,
            selection,
            remux,
            states,
            started_at: self.started_at,
            finished_at: Utc::now(),
        })
    }
}
