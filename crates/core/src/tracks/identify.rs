//! Parsing of `mkvmerge -J` identification documents.

use serde::Deserialize;

use super::types::{
    ContainerInfo, MetadataError, Track, TrackKind, MATROSKA_CONTAINER, UNDETERMINED_LANGUAGE,
};

#[derive(Deserialize)]
struct IdentifyOutput {
    container: IdentifyContainer,
    #[serde(default)]
    tracks: Vec<IdentifyTrack>,
    #[serde(default)]
    chapters: Vec<IdentifyChapters>,
}

#[derive(Deserialize)]
struct IdentifyContainer {
    #[serde(rename = "type")]
    container_type: Option<String>,
    #[serde(default = "default_recognized")]
    recognized: bool,
}

#[derive(Deserialize)]
struct IdentifyTrack {
    id: u32,
    #[serde(rename = "type")]
    track_type: String,
    #[serde(default)]
    codec: String,
    #[serde(default)]
    properties: IdentifyTrackProperties,
}

#[derive(Deserialize, Default)]
struct IdentifyTrackProperties {
    codec_id: Option<String>,
    audio_channels: Option<u32>,
    language: Option<String>,
    track_name: Option<String>,
}

#[derive(Deserialize)]
struct IdentifyChapters {
    #[serde(default)]
    num_entries: u32,
}

fn default_recognized() -> bool {
    true
}

/// Parses an identification document into the track model.
///
/// Every track record is kept, including kinds the pipeline does not handle.
pub fn parse_container_info(document: &str) -> Result<ContainerInfo, MetadataError> {
    let output: IdentifyOutput = serde_json::from_str(document).map_err(|e| {
        MetadataError::malformed(format!("failed to parse identification output: {}", e))
    })?;

    if !output.container.recognized {
        return Err(MetadataError::Unrecognized);
    }

    let container_type = output
        .container
        .container_type
        .unwrap_or_else(|| "unknown".to_string());

    let tracks = output
        .tracks
        .into_iter()
        .map(|t| {
            let kind = TrackKind::classify(&t.track_type);
            // Channel counts only make sense for audio; zero means "not reported".
            let channel_count = match kind {
                TrackKind::Audio => t.properties.audio_channels.filter(|c| *c > 0),
                _ => None,
            };
            let language = t
                .properties
                .language
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| UNDETERMINED_LANGUAGE.to_string());

            Track {
                id: t.id,
                kind,
                codec_name: t.codec,
                codec_id: t.properties.codec_id.unwrap_or_default(),
                channel_count,
                language,
                display_name: t.properties.track_name.filter(|n| !n.is_empty()),
            }
        })
        .collect();

    Ok(ContainerInfo {
        is_target_format: container_type == MATROSKA_CONTAINER,
        container_type,
        tracks,
        has_chapters: output.chapters.iter().any(|c| c.num_entries > 0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "attachments": [],
        "chapters": [{ "num_entries": 12 }],
        "container": {
            "properties": { "duration": 5400000000000 },
            "recognized": true,
            "supported": true,
            "type": "Matroska"
        },
        "tracks": [
            {
                "codec": "AVC/H.264/MPEG-4p10",
                "id": 0,
                "properties": { "codec_id": "V_MPEG4/ISO/AVC", "language": "und" },
                "type": "video"
            },
            {
                "codec": "AC-3",
                "id": 1,
                "properties": {
                    "audio_channels": 1,
                    "codec_id": "A_AC3",
                    "language": "swe"
                },
                "type": "audio"
            },
            {
                "codec": "AC-3",
                "id": 2,
                "properties": {
                    "audio_channels": 1,
                    "codec_id": "A_AC3",
                    "language": "eng",
                    "track_name": "Commentary"
                },
                "type": "audio"
            },
            {
                "codec": "SubRip/SRT",
                "id": 3,
                "properties": { "codec_id": "S_TEXT/UTF8" },
                "type": "subtitles"
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let info = parse_container_info(SAMPLE).unwrap();
        assert_eq!(info.container_type, "Matroska");
        assert!(info.is_target_format);
        assert!(info.has_chapters);
        assert_eq!(info.tracks.len(), 4);

        let commentary = info.track(2).unwrap();
        assert_eq!(commentary.kind, TrackKind::Audio);
        assert_eq!(commentary.codec_name, "AC-3");
        assert_eq!(commentary.codec_id, "A_AC3");
        assert_eq!(commentary.channel_count, Some(1));
        assert_eq!(commentary.language, "eng");
        assert_eq!(commentary.display_name.as_deref(), Some("Commentary"));

        let subtitle = info.track(3).unwrap();
        assert_eq!(subtitle.kind, TrackKind::Subtitle);
        assert_eq!(subtitle.language, "und");
        assert_eq!(subtitle.channel_count, None);

        assert_eq!(info.mono_audio_ids(), vec![1, 2]);
    }

    #[test]
    fn test_parse_non_matroska_without_chapters() {
        let json = r#"{
            "container": { "recognized": true, "type": "QuickTime/MP4" },
            "tracks": [
                {
                    "codec": "AAC",
                    "id": 1,
                    "properties": { "audio_channels": 1, "codec_id": "A_AAC" },
                    "type": "audio"
                }
            ]
        }"#;

        let info = parse_container_info(json).unwrap();
        assert!(!info.is_target_format);
        assert!(!info.has_chapters);
        assert_eq!(info.tracks[0].language, "und");
    }

    #[test]
    fn test_unknown_kinds_are_retained() {
        let json = r#"{
            "container": { "type": "Matroska" },
            "tracks": [
                { "codec": "VobBtn", "id": 0, "type": "buttons" },
                { "codec": "Opus", "id": 1, "type": "audio",
                  "properties": { "audio_channels": 0, "codec_id": "A_OPUS", "language": "" } }
            ]
        }"#;

        let info = parse_container_info(json).unwrap();
        assert_eq!(info.tracks.len(), 2);
        assert_eq!(info.tracks[0].kind, TrackKind::Unknown("buttons".to_string()));
        assert_eq!(info.remux_track_count(), 1);
        assert_eq!(info.audio_ids(), vec![1]);
        // Zero channels is treated as unknown, never as mono.
        assert_eq!(info.tracks[1].channel_count, None);
        assert_eq!(info.tracks[1].language, "und");
        assert!(info.mono_audio_ids().is_empty());
    }

    #[test]
    fn test_malformed_documents() {
        for doc in ["", "not json", "[]", r#"{"tracks": []}"#, r#"{"container": {}, "tracks": [{"id": "x"}]}"#] {
            let err = parse_container_info(doc).unwrap_err();
            assert!(matches!(err, MetadataError::Malformed { .. }), "{}", doc);
        }
    }

    #[test]
    fn test_unrecognized_container() {
        let json = r#"{ "container": { "recognized": false }, "tracks": [] }"#;
        let err = parse_container_info(json).unwrap_err();
        assert!(matches!(err, MetadataError::Unrecognized));
    }
}
