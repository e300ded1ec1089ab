//! Pipeline controller.

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::config::RunConfig;
use super::context::RunContext;
use super::error::{PipelineError, PipelineFailure};
use super::state::PipelineState;
use super::types::{PipelineEvent, PlannedTrack, RunReport};
use super::workspace::{artifact_path, Workspace};
use crate::remux::{build_remux_spec, output_path_for, TrackArtifact};
use crate::runner::{run_bounded, ProgressTracker};
use crate::selector::{self, Selection, SelectionPrompt};
use crate::toolkit::{ExtractRequest, ExtractTarget, MediaToolkit, ToolError, TransformJob};
use crate::tracks::{extension_for, parse_container_info, ContainerInfo, Track};

/// Extension of streams pulled out of non-Matroska sources; ffmpeg encodes
/// them to AAC on the way out.
const FALLBACK_EXTRACT_EXTENSION: &str = "aac";

/// Extension of transformed artifacts.
const TRANSFORM_EXTENSION: &str = "aac";

/// Optional event channel.
struct EventSink {
    tx: Option<mpsc::Sender<PipelineEvent>>,
}

impl EventSink {
    async fn emit(&self, event: PipelineEvent) {
        if let Some(ref tx) = self.tx {
            let _ = tx.send(event).await;
        }
    }

    /// Non-blocking; drops the event if the receiver is behind.
    fn try_emit(&self, event: PipelineEvent) {
        if let Some(ref tx) = self.tx {
            let _ = tx.try_send(event);
        }
    }
}

/// Runs one input through identify, select, extract, transform and remux.
///
/// The workspace is removed on every exit path. A failed run reports the
/// last state it reached and the error that stopped it.
pub struct Pipeline<T: MediaToolkit> {
    toolkit: Arc<T>,
    config: RunConfig,
}

impl<T: MediaToolkit> Pipeline<T> {
    /// Creates a new pipeline.
    pub fn new(toolkit: T, config: RunConfig) -> Self {
        Self {
            toolkit: Arc::new(toolkit),
            config,
        }
    }

    /// Runs the pipeline for `input`.
    ///
    /// `prompt` is only consulted when `select_all_mono` is off. Events are
    /// sent on `events` if given; a closed receiver does not stop the run.
    pub async fn run(
        &self,
        input: &Path,
        prompt: &dyn SelectionPrompt,
        events: Option<mpsc::Sender<PipelineEvent>>,
    ) -> Result<RunReport, PipelineFailure> {
        let events = EventSink { tx: events };
        let ctx = RunContext::new(input);
        let started_at = ctx.started_at();
        let mut workspace: Option<Workspace> = None;

        info!(input = %input.display(), "Run started");

        let outcome = self.drive(ctx, prompt, &mut workspace, &events).await;

        match outcome {
            Ok(report) => {
                events
                    .emit(PipelineEvent::StateChanged {
                        from: PipelineState::CleanedUp,
                        to: PipelineState::Done,
                    })
                    .await;
                events
                    .emit(PipelineEvent::Finished {
                        state: PipelineState::Done,
                        output: Some(report.output.clone()),
                    })
                    .await;
                info!(
                    output = %report.output.display(),
                    added_tracks = report.added_track_count(),
                    "Run finished"
                );
                Ok(report)
            }
            Err((last_state, error)) => {
                let workspace_path = workspace.as_ref().map(|ws| ws.path().to_path_buf());
                if let Some(ws) = workspace.take() {
                    if let Err(e) = ws.teardown().await {
                        warn!(error = %e, "Failed to remove workspace after failure");
                    }
                }

                warn!(
                    last_state = last_state.as_str(),
                    kind = ?error.kind(),
                    error = %error,
                    "Run failed"
                );

                events
                    .emit(PipelineEvent::StateChanged {
                        from: last_state,
                        to: PipelineState::Failed,
                    })
                    .await;
                events
                    .emit(PipelineEvent::Finished {
                        state: PipelineState::Failed,
                        output: None,
                    })
                    .await;

                let mut states: Vec<PipelineState> = PipelineState::SEQUENCE
                    .iter()
                    .copied()
                    .take_while(|s| *s != last_state)
                    .collect();
                states.push(last_state);
                states.push(PipelineState::Failed);

                Err(PipelineFailure {
                    last_state,
                    states,
                    workspace: workspace_path,
                    error,
                    started_at,
                    finished_at: Utc::now(),
                })
            }
        }
    }

    /// Runs every stage in order. On failure returns the state the run was
    /// in when the failing stage started.
    async fn drive(
        &self,
        ctx: RunContext,
        prompt: &dyn SelectionPrompt,
        workspace: &mut Option<Workspace>,
        events: &EventSink,
    ) -> Result<RunReport, (PipelineState, PipelineError)> {
        use PipelineState::*;

        let ctx = self.identify(ctx, events).await.map_err(|e| (Init, e))?;
        let ctx = self
            .select(ctx, prompt, events)
            .await
            .map_err(|e| (Identified, e))?;
        let ctx = self
            .prepare_workspace(ctx, workspace, events)
            .await
            .map_err(|e| (Selected, e))?;
        let ctx = self
            .extract(ctx, events)
            .await
            .map_err(|e| (WorkspaceReady, e))?;
        let ctx = self
            .transform(ctx, events)
            .await
            .map_err(|e| (Extracted, e))?;
        let ctx = self.remux(ctx, events).await.map_err(|e| (Transformed, e))?;
        let ctx = self
            .cleanup(ctx, workspace, events)
            .await
            .map_err(|e| (Remuxed, e))?;

        ctx.finish().map_err(|e| (CleanedUp, e))
    }

    async fn advance(
        &self,
        ctx: RunContext,
        to: PipelineState,
        events: &EventSink,
    ) -> Result<RunContext, PipelineError> {
        let from = ctx.state();
        let ctx = ctx.advance(to)?;
        debug!(from = from.as_str(), to = to.as_str(), "Pipeline state changed");
        events.emit(PipelineEvent::StateChanged { from, to }).await;
        Ok(ctx)
    }

    /// Validates input and tools, then identifies the container.
    async fn identify(
        &self,
        ctx: RunContext,
        events: &EventSink,
    ) -> Result<RunContext, PipelineError> {
        self.config.validate().map_err(PipelineError::InvalidOption)?;
        check_input(ctx.input()).await?;

        self.toolkit
            .validate()
            .await
            .map_err(|e| PipelineError::tool("validate", e))?;

        let document = self
            .toolkit
            .identify(ctx.input())
            .await
            .map_err(|e| PipelineError::tool("identify", e))?;
        let container = parse_container_info(&document)?;

        info!(
            container = %container.container_type,
            tracks = container.tracks.len(),
            audio = container.audio_tracks().count(),
            mono = container.mono_audio_tracks().count(),
            chapters = container.has_chapters,
            "Container identified"
        );

        self.advance(ctx.with_container(container), PipelineState::Identified, events)
            .await
    }

    /// Resolves the selection and plans extraction. No side effects.
    async fn select(
        &self,
        ctx: RunContext,
        prompt: &dyn SelectionPrompt,
        events: &EventSink,
    ) -> Result<RunContext, PipelineError> {
        let container = ctx.container()?;
        let audio_ids = container.audio_ids();
        let mono_ids = container.mono_audio_ids();

        let raw_input = if self.config.select_all_mono {
            String::new()
        } else {
            let audio_tracks: Vec<Track> = container.audio_tracks().cloned().collect();
            prompt
                .ask(&audio_tracks, &mono_ids)
                .await
                .map_err(PipelineError::Prompt)?
        };

        let selection = selector::resolve(
            &audio_ids,
            &mono_ids,
            &raw_input,
            self.config.select_all_mono,
        )?;
        let plan = plan_extraction(container, &selection)?;

        info!(selection = %selection, "Tracks selected");

        self.advance(
            ctx.with_selection(selection, plan),
            PipelineState::Selected,
            events,
        )
        .await
    }

    async fn prepare_workspace(
        &self,
        ctx: RunContext,
        workspace: &mut Option<Workspace>,
        events: &EventSink,
    ) -> Result<RunContext, PipelineError> {
        let ws = Workspace::create(&self.config.temp_dir)
            .await
            .map_err(|source| PipelineError::Workspace {
                path: self.config.temp_dir.clone(),
                source,
            })?;
        let path = ws.path().to_path_buf();
        *workspace = Some(ws);

        info!(workspace = %path.display(), "Workspace ready");

        self.advance(ctx.with_workspace(path), PipelineState::WorkspaceReady, events)
            .await
    }

    async fn extract(
        &self,
        ctx: RunContext,
        events: &EventSink,
    ) -> Result<RunContext, PipelineError> {
        let workspace = ctx.workspace()?;
        let container = ctx.container()?;

        let targets: Vec<ExtractTarget> = ctx
            .plan()
            .iter()
            .map(|planned| ExtractTarget {
                track_id: planned.track.id,
                audio_index: planned.audio_index,
                output: artifact_path(workspace, planned.track.id, "extract", planned.extension),
            })
            .collect();

        let request = ExtractRequest {
            source: ctx.input().to_path_buf(),
            source_is_matroska: container.is_target_format,
            targets,
        };

        self.toolkit
            .extract(&request)
            .await
            .map_err(|e| PipelineError::tool("extract", e))?;

        let artifacts: Vec<TrackArtifact> = ctx
            .plan()
            .iter()
            .zip(request.targets)
            .map(|(planned, target)| TrackArtifact {
                track: planned.track.clone(),
                path: target.output,
            })
            .collect();

        info!(tracks = artifacts.len(), "Tracks extracted");

        self.advance(ctx.with_extracted(artifacts), PipelineState::Extracted, events)
            .await
    }

    /// Transforms every extracted artifact under the concurrency ceiling.
    async fn transform(
        &self,
        ctx: RunContext,
        events: &EventSink,
    ) -> Result<RunContext, PipelineError> {
        let limit = self.config.concurrency_limit().ok_or_else(|| {
            PipelineError::InvalidOption("run.max_concurrency cannot be 0".to_string())
        })?;
        let workspace = ctx.workspace()?;
        let channels = self.config.output_channels;

        let tasks: Vec<_> = ctx
            .extracted()
            .iter()
            .map(|artifact| {
                let toolkit = Arc::clone(&self.toolkit);
                let track = artifact.track.clone();
                let job = TransformJob {
                    track_id: track.id,
                    input: artifact.path.clone(),
                    output: artifact_path(workspace, track.id, "transform", TRANSFORM_EXTENSION),
                    channels,
                };
                async move {
                    toolkit.transform(&job).await?;
                    Ok::<TrackArtifact, ToolError>(TrackArtifact {
                        track,
                        path: job.output,
                    })
                }
            })
            .collect();

        let tracker = ProgressTracker::new(tasks.len());
        info!(
            tracks = tasks.len(),
            limit = limit.get(),
            channels,
            "Transforming tracks"
        );

        let transformed = run_bounded(tasks, limit, |completed, total| {
            let snapshot = tracker.snapshot(completed);
            debug!(completed, total, eta = ?snapshot.eta, "Transform progress");
            events.try_emit(PipelineEvent::TransformProgress(snapshot));
        })
        .await
        .map_err(|failure| {
            let track_id = ctx.extracted().get(failure.index).map(|a| a.track.id);
            warn!(
                track_id = ?track_id,
                succeeded = failure.succeeded().count(),
                total = failure.total,
                "Transform batch failed"
            );
            PipelineError::tool("transform", failure.into_source())
        })?;

        self.advance(ctx.with_transformed(transformed), PipelineState::Transformed, events)
            .await
    }

    async fn remux(&self, ctx: RunContext, events: &EventSink) -> Result<RunContext, PipelineError> {
        let output = output_path_for(ctx.input(), &self.config.output_suffix);
        if tokio::fs::try_exists(&output).await.unwrap_or(false) {
            warn!(output = %output.display(), "Output exists and will be overwritten");
        }

        let spec = build_remux_spec(
            ctx.input(),
            &output,
            ctx.selection()?,
            ctx.transformed(),
            &self.config.track_name_template,
        )?;

        self.toolkit
            .remux(&spec)
            .await
            .map_err(|e| PipelineError::tool("remux", e))?;

        info!(
            output = %output.display(),
            added_tracks = spec.added_tracks.len(),
            "Remux complete"
        );

        self.advance(ctx.with_remux(spec), PipelineState::Remuxed, events)
            .await
    }

    /// Removes the workspace. The output is already written, so a failed
    /// removal is only logged.
    async fn cleanup(
        &self,
        ctx: RunContext,
        workspace: &mut Option<Workspace>,
        events: &EventSink,
    ) -> Result<RunContext, PipelineError> {
        if let Some(ws) = workspace.take() {
            let path = ws.path().to_path_buf();
            if let Err(e) = ws.teardown().await {
                warn!(workspace = %path.display(), error = %e, "Failed to remove workspace");
            }
        }

        self.advance(ctx, PipelineState::CleanedUp, events).await
    }
}

async fn check_input(input: &Path) -> Result<(), PipelineError> {
    match tokio::fs::metadata(input).await {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(PipelineError::NotAFile(input.to_path_buf())),
        Err(_) => Err(PipelineError::InputNotFound(input.to_path_buf())),
    }
}

/// Pairs every selected track with the extension of its extracted stream.
fn plan_extraction(
    container: &ContainerInfo,
    selection: &Selection,
) -> Result<Vec<PlannedTrack>, PipelineError> {
    selection
        .iter()
        .filter_map(|id| {
            container
                .audio_tracks()
                .enumerate()
                .find(|(_, track)| track.id == id)
        })
        .map(|(audio_index, track)| {
            let extension = if container.is_target_format {
                extension_for(&track.codec_id).ok_or_else(|| PipelineError::UnsupportedCodec {
                    track_id: track.id,
                    codec_id: track.codec_id.clone(),
                })?
            } else {
                FALLBACK_EXTRACT_EXTENSION
            };
            Ok(PlannedTrack {
                track: track.clone(),
                audio_index,
                extension,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::resolve;
    use crate::tracks::TrackKind;

    fn audio(id: u32, codec_id: &str) -> Track {
        Track {
            id,
            kind: TrackKind::Audio,
            codec_name: "audio".to_string(),
            codec_id: codec_id.to_string(),
            channel_count: Some(1),
            language: "eng".to_string(),
            display_name: None,
        }
    }

    fn container(is_target_format: bool, tracks: Vec<Track>) -> ContainerInfo {
        ContainerInfo {
            container_type: "Matroska".to_string(),
            tracks,
            is_target_format,
            has_chapters: false,
        }
    }

    #[test]
    fn test_plan_uses_codec_table() {
        let info = container(true, vec![audio(1, "A_AC3"), audio(2, "A_REAL/COOK")]);
        let selection = resolve(&[1, 2], &[1, 2], "", false).unwrap();

        let plan = plan_extraction(&info, &selection).unwrap();
        let extensions: Vec<_> = plan.iter().map(|p| (p.track.id, p.extension)).collect();
        assert_eq!(extensions, vec![(1, "ac3"), (2, "ra")]);
    }

    #[test]
    fn test_plan_rejects_unknown_codec() {
        let info = container(true, vec![audio(1, "A_MYSTERY")]);
        let selection = resolve(&[1], &[1], "", false).unwrap();

        let err = plan_extraction(&info, &selection).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnsupportedCodec { track_id: 1, ref codec_id } if codec_id == "A_MYSTERY"
        ));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_plan_for_foreign_container_uses_aac() {
        let info = container(false, vec![audio(1, "A_MYSTERY")]);
        let selection = resolve(&[1], &[1], "", false).unwrap();

        let plan = plan_extraction(&info, &selection).unwrap();
        assert_eq!(plan[0].extension, "aac");
    }

    #[test]
    fn test_plan_records_audio_position() {
        let mut video = audio(0, "V_MPEG4/ISO/AVC");
        video.kind = TrackKind::Video;
        let info = container(
            false,
            vec![video, audio(1, "A_AAC"), audio(2, "A_AAC"), audio(5, "A_AAC")],
        );
        let selection = resolve(&[1, 2, 5], &[1, 2, 5], "5, 1", false).unwrap();

        let plan = plan_extraction(&info, &selection).unwrap();
        let positions: Vec<_> = plan.iter().map(|p| (p.track.id, p.audio_index)).collect();
        assert_eq!(positions, vec![(1, 0), (5, 2)]);
    }

    #[tokio::test]
    async fn test_check_input() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("movie.mkv");
        std::fs::write(&file, b"x").unwrap();

        assert!(check_input(&file).await.is_ok());
        assert!(matches!(
            check_input(dir.path()).await,
            Err(PipelineError::NotAFile(_))
        ));
        assert!(matches!(
            check_input(&dir.path().join("missing.mkv")).await,
            Err(PipelineError::InputNotFound(_))
        ));
    }
}
