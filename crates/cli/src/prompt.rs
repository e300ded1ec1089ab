//! Interactive track selection on stdin.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};

use forced_stereo_core::{SelectionPrompt, Track};

/// Lists the audio tracks on stdout and reads one line from stdin.
pub struct StdinPrompt;

#[async_trait]
impl SelectionPrompt for StdinPrompt {
    async fn ask(&self, audio_tracks: &[Track], default_ids: &[u32]) -> std::io::Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(render_listing(audio_tracks, default_ids).as_bytes())
            .await?;
        stdout.flush().await?;

        read_answer(BufReader::new(tokio::io::stdin())).await
    }
}

/// Reads one answer line. A closed input is an error, so only an explicit
/// blank line selects the defaults.
async fn read_answer<R: AsyncBufRead + Unpin>(mut reader: R) -> std::io::Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "no answer on stdin",
        ));
    }
    Ok(line)
}

/// Audio track table followed by the question.
pub fn render_listing(audio_tracks: &[Track], default_ids: &[u32]) -> String {
    let mut out = String::from("Audio tracks:\n");
    out.push_str(&format!(
        "  {:>3}  {:<12} {:>3}  {:<4} {}\n",
        "ID", "Codec", "Ch", "Lang", "Name"
    ));
    for track in audio_tracks {
        let channels = track
            .channel_count
            .map(|c| c.to_string())
            .unwrap_or_else(|| "?".to_string());
        out.push_str(&format!(
            "  {:>3}  {:<12} {:>3}  {:<4} {}\n",
            track.id,
            track.codec_name,
            channels,
            track.language,
            track.display_name.as_deref().unwrap_or("")
        ));
    }

    let defaults: Vec<String> = default_ids.iter().map(u32::to_string).collect();
    out.push_str(&format!(
        "Select IDs to process [{}]: ",
        defaults.join(", ")
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use forced_stereo_core::TrackKind;

    fn audio(id: u32, channels: Option<u32>, name: Option<&str>) -> Track {
        Track {
            id,
            kind: TrackKind::Audio,
            codec_name: "AC-3".to_string(),
            codec_id: "A_AC3".to_string(),
            channel_count: channels,
            language: "eng".to_string(),
            display_name: name.map(str::to_string),
        }
    }

    #[test]
    fn test_listing_shows_every_track() {
        let listing = render_listing(
            &[
                audio(1, Some(1), Some("Commentary")),
                audio(2, Some(6), None),
            ],
            &[1],
        );

        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines[0], "Audio tracks:");
        assert!(lines[2].contains("Commentary"));
        assert!(lines[2].trim_start().starts_with('1'));
        assert!(lines[3].contains(" 6 "));
        assert_eq!(lines[4], "Select IDs to process [1]: ");
    }

    #[test]
    fn test_listing_unknown_channels_and_no_defaults() {
        let listing = render_listing(&[audio(4, None, None)], &[]);
        assert!(listing.lines().nth(2).unwrap().contains('?'));
        assert!(listing.ends_with("Select IDs to process []: "));
    }

    #[tokio::test]
    async fn test_read_answer() {
        let answer = read_answer(&b"1, 3\nignored\n"[..]).await.unwrap();
        assert_eq!(answer, "1, 3\n");

        let blank = read_answer(&b"\n"[..]).await.unwrap();
        assert_eq!(blank, "\n");
    }

    #[tokio::test]
    async fn test_closed_input_is_an_error() {
        let err = read_answer(&b""[..]).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }
}
