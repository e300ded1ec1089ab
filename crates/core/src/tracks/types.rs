//! Types for the track model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Language tag used when a track carries none.
pub const UNDETERMINED_LANGUAGE: &str = "und";

/// Container type reported for Matroska files.
pub const MATROSKA_CONTAINER: &str = "Matroska";

/// Errors raised while interpreting an identification document.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The document is not valid JSON or lacks the expected shape.
    #[error("malformed container metadata: {reason}")]
    Malformed { reason: String },

    /// The identifying tool did not recognise the container.
    #[error("container format not recognized")]
    Unrecognized,
}

impl MetadataError {
    /// Creates a new malformed metadata error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

/// Kind of media stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Audio,
    Video,
    Subtitle,
    /// Any other stream type (buttons, data, ...). Kept in the model but never
    /// selected or counted as a remux track.
    Unknown(String),
}

impl TrackKind {
    /// Classifies the `type` string of an identification record.
    pub fn classify(raw: &str) -> Self {
        match raw {
            "audio" => Self::Audio,
            "video" => Self::Video,
            "subtitles" | "subtitle" => Self::Subtitle,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether this kind takes part in selection and remux counts.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Subtitle => "subtitles",
            Self::Unknown(raw) => raw,
        }
    }
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One media stream inside a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Container-assigned id, stable for the whole run.
    pub id: u32,
    pub kind: TrackKind,
    /// Short human codec label (e.g. "AC-3").
    pub codec_name: String,
    /// Container codec identifier (e.g. "A_AC3").
    pub codec_id: String,
    /// Channel count, audio only.
    pub channel_count: Option<u32>,
    /// Language tag, `und` when absent.
    pub language: String,
    /// Free-text name set by the container author.
    pub display_name: Option<String>,
}

impl Track {
    pub fn is_audio(&self) -> bool {
        self.kind == TrackKind::Audio
    }

    pub fn is_mono_audio(&self) -> bool {
        self.is_audio() && self.channel_count == Some(1)
    }
}

/// Parsed identification result for one container file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    /// Container type as reported by the identifying tool.
    pub container_type: String,
    /// All tracks in container order, including unknown kinds.
    pub tracks: Vec<Track>,
    /// Whether the container is already Matroska.
    pub is_target_format: bool,
    /// Whether the container carries chapters.
    pub has_chapters: bool,
}

impl ContainerInfo {
    /// Audio tracks in container order.
    pub fn audio_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(|t| t.is_audio())
    }

    /// Audio tracks with exactly one channel. Recomputed on every call.
    pub fn mono_audio_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(|t| t.is_mono_audio())
    }

    pub fn audio_ids(&self) -> Vec<u32> {
        self.audio_tracks().map(|t| t.id).collect()
    }

    pub fn mono_audio_ids(&self) -> Vec<u32> {
        self.mono_audio_tracks().map(|t| t.id).collect()
    }

    /// Looks up a track by id.
    pub fn track(&self, id: u32) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Number of tracks the remuxer copies through (unknown kinds excluded).
    pub fn remux_track_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.kind.is_known()).count()
    }
}
