//! Types shared by toolkit implementations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// External executables the toolkit drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Mkvmerge,
    Mkvextract,
    Ffmpeg,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Mkvmerge, Tool::Mkvextract, Tool::Ffmpeg];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Mkvmerge => "mkvmerge",
            Tool::Mkvextract => "mkvextract",
            Tool::Ffmpeg => "ffmpeg",
        }
    }

    /// Argument that prints the version and exits.
    pub fn version_flag(&self) -> &'static str {
        match self {
            Tool::Ffmpeg => "-version",
            Tool::Mkvmerge | Tool::Mkvextract => "--version",
        }
    }

    /// MKVToolNix exits with 1 when it finished but emitted warnings.
    pub fn exit_code_is_warning(&self, code: Option<i32>) -> bool {
        matches!(self, Tool::Mkvmerge | Tool::Mkvextract) && code == Some(1)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One track to pull out of the source container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractTarget {
    pub track_id: u32,
    /// Position among the source's audio streams. ffmpeg numbers streams
    /// itself, so container track ids can't be used to map them.
    pub audio_index: usize,
    pub output: PathBuf,
}

/// Extraction of every selected track from one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub source: PathBuf,
    /// Matroska sources go through mkvextract; anything else through ffmpeg.
    pub source_is_matroska: bool,
    pub targets: Vec<ExtractTarget>,
}

/// Channel-layout conversion of a single extracted artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformJob {
    pub track_id: u32,
    pub input: PathBuf,
    pub output: PathBuf,
    pub channels: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names_and_flags() {
        assert_eq!(Tool::Mkvmerge.to_string(), "mkvmerge");
        assert_eq!(Tool::Ffmpeg.version_flag(), "-version");
        assert_eq!(Tool::Mkvextract.version_flag(), "--version");
    }

    #[test]
    fn test_warning_exit_codes() {
        assert!(Tool::Mkvmerge.exit_code_is_warning(Some(1)));
        assert!(Tool::Mkvextract.exit_code_is_warning(Some(1)));
        assert!(!Tool::Mkvmerge.exit_code_is_warning(Some(2)));
        assert!(!Tool::Ffmpeg.exit_code_is_warning(Some(1)));
    }
}
