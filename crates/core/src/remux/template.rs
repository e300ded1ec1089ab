//! Track name templates.

use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::tracks::{Track, UNDETERMINED_LANGUAGE};

pub const DEFAULT_TRACK_NAME_TEMPLATE: &str = "Forced Stereo (AAC) {original_name}";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("valid placeholder pattern"));

/// Name for an added track, rendered from its source track.
///
/// Recognized placeholders: `{original_name}`, `{language}`, `{lang}`
/// (uppercased language), `{codec}`, `{id}`, `{channels}`. Anything else in
/// braces is left as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackNameTemplate(String);

impl TrackNameTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitutes every placeholder in one pass and trims the result.
    ///
    /// Values are inserted literally, so a track name that itself contains
    /// `{id}` is not expanded again.
    pub fn render(&self, track: &Track) -> String {
        let language = if track.language.is_empty() {
            UNDETERMINED_LANGUAGE
        } else {
            track.language.as_str()
        };

        let rendered = PLACEHOLDER.replace_all(&self.0, |caps: &Captures<'_>| {
            match &caps[1] {
                "original_name" => track.display_name.clone().unwrap_or_default(),
                "language" => language.to_string(),
                "lang" => language.to_uppercase(),
                "codec" => track.codec_name.clone(),
                "id" => track.id.to_string(),
                "channels" => track
                    .channel_count
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
                _ => caps[0].to_string(),
            }
        });

        rendered.trim().to_string()
    }
}

impl Default for TrackNameTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TRACK_NAME_TEMPLATE)
    }
}

impl From<&str> for TrackNameTemplate {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TrackNameTemplate {
    fn from(value: String) -> Self {
        Self(value)
    }
}
