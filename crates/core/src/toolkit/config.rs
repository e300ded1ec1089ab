//! Configuration for the external toolkit.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::Tool;

/// Where the external executables live and how they are invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolkitConfig {
    /// Path to the mkvmerge binary.
    #[serde(default = "default_mkvmerge")]
    pub mkvmerge: PathBuf,

    /// Path to the mkvextract binary.
    #[serde(default = "default_mkvextract")]
    pub mkvextract: PathBuf,

    /// Path to the ffmpeg binary.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Per-invocation time limit in seconds. Unbounded when absent.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_mkvmerge() -> PathBuf {
    PathBuf::from("mkvmerge")
}

fn default_mkvextract() -> PathBuf {
    PathBuf::from("mkvextract")
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_log_level() -> String {
    "error".to_string()
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            mkvmerge: default_mkvmerge(),
            mkvextract: default_mkvextract(),
            ffmpeg: default_ffmpeg(),
            ffmpeg_log_level: default_log_level(),
            timeout_secs: None,
        }
    }
}

impl ToolkitConfig {
    /// Configured executable for `tool`.
    pub fn path_for(&self, tool: Tool) -> &Path {
        match tool {
            Tool::Mkvmerge => &self.mkvmerge,
            Tool::Mkvextract => &self.mkvextract,
            Tool::Ffmpeg => &self.ffmpeg,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Points every tool at `dir/<name>`.
    pub fn with_bin_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.mkvmerge = dir.join("mkvmerge");
        self.mkvextract = dir.join("mkvextract");
        self.ffmpeg = dir.join("ffmpeg");
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }
}
