//! Mock toolkit for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::fixtures;
use crate::remux::RemuxSpec;
use crate::toolkit::{ExtractRequest, MediaToolkit, ToolError, TransformJob};

/// Toolkit operation, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockStage {
    Validate,
    Identify,
    Extract,
    Transform,
    Remux,
}

/// A recorded toolkit call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    Validate,
    Identify(PathBuf),
    Extract(ExtractRequest),
    Transform(TransformJob),
    Remux(RemuxSpec),
}

impl ToolCall {
    pub fn stage(&self) -> MockStage {
        match self {
            ToolCall::Validate => MockStage::Validate,
            ToolCall::Identify(_) => MockStage::Identify,
            ToolCall::Extract(_) => MockStage::Extract,
            ToolCall::Transform(_) => MockStage::Transform,
            ToolCall::Remux(_) => MockStage::Remux,
        }
    }
}

/// Mock implementation of the MediaToolkit trait.
///
/// Provides controllable behavior for testing:
/// - Record every call for assertions
/// - Serve a configurable identification document
/// - Write placeholder artifacts so workspace contents are observable
/// - Fail a given stage, or the transform of a given track
/// - Delay transforms and track how many overlap
///
/// Clones share state, so a test can keep one handle while the pipeline
/// owns another.
///
/// # Example
///
/// ```rust,ignore
/// use forced_stereo_core::testing::{fixtures, MockToolkit};
///
/// let toolkit = MockToolkit::new().with_document(fixtures::two_mono_one_stereo());
/// toolkit.fail_transform_of(3, "Invalid data found when processing input").await;
///
/// // run the pipeline...
///
/// assert_eq!(toolkit.transform_count().await, 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockToolkit {
    /// Recorded calls, in call order.
    calls: Arc<RwLock<Vec<ToolCall>>>,
    /// Document returned by `identify`.
    document: Arc<RwLock<String>>,
    /// One-shot failures by stage.
    stage_failures: Arc<RwLock<HashMap<MockStage, ToolError>>>,
    /// Transform failures by source track id, as ffmpeg diagnostics.
    transform_failures: Arc<RwLock<HashMap<u32, String>>>,
    /// Simulated transform duration in milliseconds.
    transform_duration_ms: Arc<RwLock<u64>>,
    /// Transforms currently running.
    in_flight: Arc<AtomicUsize>,
    /// Most transforms seen running at once.
    peak_in_flight: Arc<AtomicUsize>,
}

impl Default for MockToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl MockToolkit {
    /// Create a new mock toolkit serving a container with no tracks.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            document: Arc::new(RwLock::new(fixtures::matroska_document(&[]))),
            stage_failures: Arc::new(RwLock::new(HashMap::new())),
            transform_failures: Arc::new(RwLock::new(HashMap::new())),
            transform_duration_ms: Arc::new(RwLock::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Serve `document` from `identify`.
    pub fn with_document(self, document: impl Into<String>) -> Self {
        Self {
            document: Arc::new(RwLock::new(document.into())),
            ..self
        }
    }

    /// Configure the next call to `stage` to fail with the given error.
    pub async fn set_stage_failure(&self, stage: MockStage, error: ToolError) {
        self.stage_failures.write().await.insert(stage, error);
    }

    /// Make the transform of `track_id` exit non-zero with `diagnostic`.
    pub async fn fail_transform_of(&self, track_id: u32, diagnostic: impl Into<String>) {
        self.transform_failures
            .write()
            .await
            .insert(track_id, diagnostic.into());
    }

    /// Set the simulated transform duration.
    pub async fn set_transform_duration(&self, duration: Duration) {
        *self.transform_duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Get all recorded calls.
    pub async fn calls(&self) -> Vec<ToolCall> {
        self.calls.read().await.clone()
    }

    /// Stages called, in order.
    pub async fn stages(&self) -> Vec<MockStage> {
        self.calls.read().await.iter().map(ToolCall::stage).collect()
    }

    /// Get the recorded transform jobs.
    pub async fn transform_jobs(&self) -> Vec<TransformJob> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                ToolCall::Transform(job) => Some(job.clone()),
                _ => None,
            })
            .collect()
    }

    /// Get the number of transforms started.
    pub async fn transform_count(&self) -> usize {
        self.transform_jobs().await.len()
    }

    /// Get the remux spec, if remux was reached.
    pub async fn remux_spec(&self) -> Option<RemuxSpec> {
        self.calls.read().await.iter().find_map(|call| match call {
            ToolCall::Remux(spec) => Some(spec.clone()),
            _ => None,
        })
    }

    /// Most transforms that were running at the same time.
    pub fn peak_concurrent_transforms(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn record(&self, call: ToolCall) {
        self.calls.write().await.push(call);
    }

    /// Take the injected failure for `stage`, if set.
    async fn take_failure(&self, stage: MockStage) -> Option<ToolError> {
        self.stage_failures.write().await.remove(&stage)
    }
}

async fn write_placeholder(path: &Path, tool: &str) -> Result<(), ToolError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, format!("placeholder written by mock {}\n", tool)).await?;
    Ok(())
}

#[async_trait]
impl MediaToolkit for MockToolkit {
    fn name(&self) -> &str {
        "mock"
    }

    async fn validate(&self) -> Result<(), ToolError> {
        self.record(ToolCall::Validate).await;
        match self.take_failure(MockStage::Validate).await {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn identify(&self, input: &Path) -> Result<String, ToolError> {
        self.record(ToolCall::Identify(input.to_path_buf())).await;
        if let Some(err) = self.take_failure(MockStage::Identify).await {
            return Err(err);
        }
        Ok(self.document.read().await.clone())
    }

    async fn extract(&self, request: &ExtractRequest) -> Result<(), ToolError> {
        self.record(ToolCall::Extract(request.clone())).await;
        if let Some(err) = self.take_failure(MockStage::Extract).await {
            return Err(err);
        }
        let tool = if request.source_is_matroska {
            "mkvextract"
        } else {
            "ffmpeg"
        };
        for target in &request.targets {
            write_placeholder(&target.output, tool).await?;
        }
        Ok(())
    }

    async fn transform(&self, job: &TransformJob) -> Result<(), ToolError> {
        self.record(ToolCall::Transform(job.clone())).await;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let duration_ms = *self.transform_duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(err) = self.take_failure(MockStage::Transform).await {
            return Err(err);
        }
        if let Some(diagnostic) = self.transform_failures.read().await.get(&job.track_id) {
            return Err(ToolError::invocation_failed(
                "ffmpeg",
                Some(1),
                diagnostic.clone(),
            ));
        }

        write_placeholder(&job.output, "ffmpeg").await
    }

    async fn remux(&self, spec: &RemuxSpec) -> Result<(), ToolError> {
        self.record(ToolCall::Remux(spec.clone())).await;
        if let Some(err) = self.take_failure(MockStage::Remux).await {
            return Err(err);
        }
        write_placeholder(&spec.output, "mkvmerge").await
    }
}
