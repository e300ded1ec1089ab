//! Trait definitions for the toolkit module.

use async_trait::async_trait;
use std::path::Path;

use super::error::ToolError;
use super::types::{ExtractRequest, TransformJob};
use crate::remux::RemuxSpec;

/// Everything the pipeline asks of the outside world.
///
/// Implementations own process spawning; the pipeline only hands over paths
/// and parameter sets.
#[async_trait]
pub trait MediaToolkit: Send + Sync {
    /// Returns the name of this toolkit implementation.
    fn name(&self) -> &str;

    /// Checks that every required executable can be run.
    async fn validate(&self) -> Result<(), ToolError>;

    /// Returns the raw identification document for `input`.
    async fn identify(&self, input: &Path) -> Result<String, ToolError>;

    /// Writes one artifact per target.
    async fn extract(&self, request: &ExtractRequest) -> Result<(), ToolError>;

    /// Converts one artifact to the requested channel count.
    async fn transform(&self, job: &TransformJob) -> Result<(), ToolError>;

    /// Writes the final container.
    async fn remux(&self, spec: &RemuxSpec) -> Result<(), ToolError>;
}
