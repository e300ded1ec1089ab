//! Remux parameter sets.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::template::TrackNameTemplate;
use crate::selector::Selection;
use crate::tracks::{Track, UNDETERMINED_LANGUAGE};

/// Extension of every produced container.
pub const OUTPUT_EXTENSION: &str = "mkv";

/// Errors from building a remux parameter set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemuxError {
    #[error("expected {expected} track artifacts, got {actual}")]
    ArtifactCountMismatch { expected: usize, actual: usize },

    #[error("artifact at position {position} belongs to track {actual}, expected track {expected}")]
    ArtifactOutOfOrder {
        position: usize,
        expected: u32,
        actual: u32,
    },
}

/// A transformed artifact and the track it was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackArtifact {
    pub track: Track,
    pub path: PathBuf,
}

/// One new track appended to the output container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedTrack {
    /// Id of the source track this one was derived from.
    pub source_track_id: u32,
    pub path: PathBuf,
    pub language: String,
    pub name: String,
    pub default_track: bool,
    pub forced_track: bool,
}

impl AddedTrack {
    /// mkvmerge options for this file. Only the audio stream is taken.
    fn push_args(&self, args: &mut Vec<String>) {
        args.push("--language".to_string());
        args.push(format!("0:{}", self.language));

        if !self.name.is_empty() {
            args.push("--track-name".to_string());
            args.push(format!("0:{}", self.name));
        }

        args.push("--default-track-flag".to_string());
        args.push(format!("0:{}", yes_no(self.default_track)));
        args.push("--forced-display-flag".to_string());
        args.push(format!("0:{}", yes_no(self.forced_track)));

        args.push("-D".to_string());
        args.push("-S".to_string());
        args.push(self.path.to_string_lossy().to_string());
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Everything the remuxer needs: the source, copied through untouched, plus
/// the new tracks in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemuxSpec {
    pub source: PathBuf,
    pub output: PathBuf,
    pub added_tracks: Vec<AddedTrack>,
}

impl RemuxSpec {
    /// mkvmerge argument vector.
    ///
    /// The source comes first with no options, so its tracks, chapters and
    /// attachments keep their existing flags.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-q".to_string(),
            "-o".to_string(),
            self.output.to_string_lossy().to_string(),
            self.source.to_string_lossy().to_string(),
        ];
        for track in &self.added_tracks {
            track.push_args(&mut args);
        }
        args
    }
}

/// Builds the remux parameter set.
///
/// `artifacts` must line up with `selection` position by position.
pub fn build_remux_spec(
    source: &Path,
    output: &Path,
    selection: &Selection,
    artifacts: &[TrackArtifact],
    template: &TrackNameTemplate,
) -> Result<RemuxSpec, RemuxError> {
    if artifacts.len() != selection.len() {
        return Err(RemuxError::ArtifactCountMismatch {
            expected: selection.len(),
            actual: artifacts.len(),
        });
    }

    let mut added_tracks = Vec::with_capacity(artifacts.len());
    for (position, (expected, artifact)) in selection.iter().zip(artifacts).enumerate() {
        if artifact.track.id != expected {
            return Err(RemuxError::ArtifactOutOfOrder {
                position,
                expected,
                actual: artifact.track.id,
            });
        }

        let language = if artifact.track.language.trim().is_empty() {
            UNDETERMINED_LANGUAGE.to_string()
        } else {
            artifact.track.language.clone()
        };

        added_tracks.push(AddedTrack {
            source_track_id: artifact.track.id,
            path: artifact.path.clone(),
            language,
            name: template.render(&artifact.track),
            default_track: false,
            forced_track: false,
        });
    }

    Ok(RemuxSpec {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        added_tracks,
    })
}

/// `<dir>/<stem>.<suffix>.mkv`, next to the input.
///
/// An existing file at that path is not detected here.
pub fn output_path_for(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_name = format!("{}.{}.{}", stem, suffix, OUTPUT_EXTENSION);

    match input.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}
