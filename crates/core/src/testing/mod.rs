//! Testing utilities and a mock toolkit for pipeline tests.
//!
//! [`MockToolkit`] stands in for mkvmerge, mkvextract and ffmpeg, so whole
//! runs can be exercised without any media tools installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use forced_stereo_core::testing::{fixtures, MockToolkit};
//!
//! let toolkit = MockToolkit::new().with_document(fixtures::two_mono_one_stereo());
//! let input = fixtures::media_file(dir.path(), "movie.mkv")?;
//! ```

mod mock_toolkit;

pub use mock_toolkit::{MockStage, MockToolkit, ToolCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};
    use std::path::{Path, PathBuf};

    /// One track record of an identification document.
    #[derive(Debug, Clone)]
    pub struct FixtureTrack {
        pub id: u32,
        pub kind: &'static str,
        pub codec: String,
        pub codec_id: String,
        pub channels: Option<u32>,
        pub language: Option<String>,
        pub name: Option<String>,
    }

    impl FixtureTrack {
        /// AC-3 audio track with the given channel count.
        pub fn audio(id: u32, channels: u32) -> Self {
            Self {
                id,
                kind: "audio",
                codec: "AC-3".to_string(),
                codec_id: "A_AC3".to_string(),
                channels: Some(channels),
                language: Some("eng".to_string()),
                name: None,
            }
        }

        /// H.264 video track.
        pub fn video(id: u32) -> Self {
            Self {
                id,
                kind: "video",
                codec: "AVC/H.264/MPEG-4p10".to_string(),
                codec_id: "V_MPEG4/ISO/AVC".to_string(),
                channels: None,
                language: None,
                name: None,
            }
        }

        /// SRT subtitle track.
        pub fn subtitle(id: u32) -> Self {
            Self {
                id,
                kind: "subtitles",
                codec: "SubRip/SRT".to_string(),
                codec_id: "S_TEXT/UTF8".to_string(),
                channels: None,
                language: Some("eng".to_string()),
                name: None,
            }
        }

        pub fn codec(mut self, codec: &str, codec_id: &str) -> Self {
            self.codec = codec.to_string();
            self.codec_id = codec_id.to_string();
            self
        }

        pub fn language(mut self, language: &str) -> Self {
            self.language = Some(language.to_string());
            self
        }

        pub fn name(mut self, name: &str) -> Self {
            self.name = Some(name.to_string());
            self
        }

        fn to_json(&self) -> Value {
            let mut properties = json!({ "codec_id": self.codec_id });
            if let Some(channels) = self.channels {
                properties["audio_channels"] = json!(channels);
            }
            if let Some(ref language) = self.language {
                properties["language"] = json!(language);
            }
            if let Some(ref name) = self.name {
                properties["track_name"] = json!(name);
            }
            json!({
                "id": self.id,
                "type": self.kind,
                "codec": self.codec,
                "properties": properties,
            })
        }
    }

    /// An `mkvmerge -J` style document for a container of `container_type`.
    pub fn identify_document(container_type: &str, tracks: &[FixtureTrack]) -> String {
        json!({
            "container": { "type": container_type, "recognized": true, "supported": true },
            "tracks": tracks.iter().map(FixtureTrack::to_json).collect::<Vec<_>>(),
            "chapters": [],
            "attachments": [],
        })
        .to_string()
    }

    /// A Matroska identification document.
    pub fn matroska_document(tracks: &[FixtureTrack]) -> String {
        identify_document("Matroska", tracks)
    }

    /// Audio tracks 1 (mono), 2 (stereo) and 3 (mono).
    pub fn two_mono_one_stereo() -> String {
        matroska_document(&[
            FixtureTrack::audio(1, 1).name("Commentary"),
            FixtureTrack::audio(2, 2),
            FixtureTrack::audio(3, 1).language("ger"),
        ])
    }

    /// Writes a placeholder input file and returns its path.
    pub fn media_file(dir: &Path, name: &str) -> std::io::Result<PathBuf> {
        let path = dir.join(name);
        std::fs::write(&path, b"not really a container")?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::tracks::{parse_container_info, TrackKind};

    #[test]
    fn test_fixture_document_parses() {
        let info = parse_container_info(&matroska_document(&[
            FixtureTrack::video(0),
            FixtureTrack::audio(1, 1).name("Commentary").language("fre"),
            FixtureTrack::subtitle(2),
        ]))
        .unwrap();

        assert!(info.is_target_format);
        assert_eq!(info.tracks.len(), 3);
        assert_eq!(info.tracks[0].kind, TrackKind::Video);
        assert_eq!(info.tracks[1].channel_count, Some(1));
        assert_eq!(info.tracks[1].language, "fre");
        assert_eq!(info.tracks[1].display_name.as_deref(), Some("Commentary"));
        assert_eq!(info.tracks[2].kind, TrackKind::Subtitle);
    }

    #[test]
    fn test_two_mono_one_stereo() {
        let info = parse_container_info(&two_mono_one_stereo()).unwrap();
        assert_eq!(info.audio_ids(), vec![1, 2, 3]);
        assert_eq!(info.mono_audio_ids(), vec![1, 3]);
    }

    #[test]
    fn test_foreign_container() {
        let info = parse_container_info(&identify_document(
            "QuickTime/MP4",
            &[FixtureTrack::audio(0, 1).codec("AAC", "A_AAC")],
        ))
        .unwrap();
        assert!(!info.is_target_format);
    }
}
