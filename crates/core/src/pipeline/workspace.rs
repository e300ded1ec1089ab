//! Run-scoped scratch directory.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Path of a per-track intermediate file inside `workspace`.
pub fn artifact_path(workspace: &Path, track_id: u32, stage: &str, extension: &str) -> PathBuf {
    workspace.join(format!("{}.{}.{}", track_id, stage, extension))
}

/// Scratch directory owned by one run.
///
/// Call [`Workspace::teardown`] on every exit path. If the guard is dropped
/// without it (panic, cancelled future) the directory is removed
/// synchronously in `Drop`.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    armed: bool,
}

impl Workspace {
    /// Creates `<root>/run-<uuid>`.
    pub async fn create(root: &Path) -> std::io::Result<Self> {
        let path = root.join(format!("run-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&path).await?;
        debug!(path = %path.display(), "Workspace created");
        Ok(Self { path, armed: true })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `{id}.{stage}.{ext}` inside the workspace.
    pub fn artifact_path(&self, track_id: u32, stage: &str, extension: &str) -> PathBuf {
        artifact_path(&self.path, track_id, stage, extension)
    }

    /// Removes the directory and everything in it.
    ///
    /// A directory that is already gone counts as removed.
    pub async fn teardown(mut self) -> std::io::Result<()> {
        self.armed = false;
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "Workspace removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Workspace removed on drop"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove workspace"),
        }
    }
}
