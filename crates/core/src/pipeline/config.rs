//! Configuration for the pipeline module.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::remux::TrackNameTemplate;

/// Allowed values for [`RunConfig::max_concurrency`].
pub const CONCURRENCY_RANGE: RangeInclusive<usize> = 1..=16;

/// Options for a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Transforms allowed in flight at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Name given to each added track.
    #[serde(default)]
    pub track_name_template: TrackNameTemplate,

    /// Inserted between the input stem and `.mkv`.
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Channel count of the transformed tracks.
    #[serde(default = "default_output_channels")]
    pub output_channels: u32,

    /// Parent of the per-run workspace directories.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Take every mono track without asking.
    #[serde(default)]
    pub select_all_mono: bool,
}

fn default_max_concurrency() -> usize {
    4
}

fn default_output_suffix() -> String {
    "forced_stereo".to_string()
}

fn default_output_channels() -> u32 {
    2
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("forced-stereo")
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            track_name_template: TrackNameTemplate::default(),
            output_suffix: default_output_suffix(),
            output_channels: default_output_channels(),
            temp_dir: default_temp_dir(),
            select_all_mono: false,
        }
    }
}

impl RunConfig {
    /// Sets the concurrency ceiling.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// Sets the workspace parent directory.
    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// Sets the track name template.
    pub fn with_track_name_template(mut self, template: impl Into<TrackNameTemplate>) -> Self {
        self.track_name_template = template.into();
        self
    }

    /// Enables or disables automatic mono selection.
    pub fn with_select_all_mono(mut self, enabled: bool) -> Self {
        self.select_all_mono = enabled;
        self
    }

    /// Checks option ranges. The message names the offending key.
    pub fn validate(&self) -> Result<(), String> {
        if !CONCURRENCY_RANGE.contains(&self.max_concurrency) {
            return Err(format!(
                "run.max_concurrency must be between {} and {}, got {}",
                CONCURRENCY_RANGE.start(),
                CONCURRENCY_RANGE.end(),
                self.max_concurrency
            ));
        }
        if self.output_channels == 0 {
            return Err("run.output_channels cannot be 0".to_string());
        }
        if self.output_suffix.trim().is_empty() {
            return Err("run.output_suffix cannot be empty".to_string());
        }
        Ok(())
    }

    /// Concurrency ceiling as the runner expects it.
    pub fn concurrency_limit(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.max_concurrency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.output_suffix, "forced_stereo");
        assert_eq!(config.output_channels, 2);
        assert!(!config.select_all_mono);
        assert_eq!(
            config.track_name_template.as_str(),
            "Forced Stereo (AAC) {original_name}"
        );
        assert!(config.temp_dir.ends_with("forced-stereo"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_concurrency_bounds() {
        assert!(RunConfig::default().with_max_concurrency(1).validate().is_ok());
        assert!(RunConfig::default().with_max_concurrency(16).validate().is_ok());

        let err = RunConfig::default().with_max_concurrency(0).validate().unwrap_err();
        assert_eq!(err, "run.max_concurrency must be between 1 and 16, got 0");
        assert!(RunConfig::default().with_max_concurrency(17).validate().is_err());
    }

    #[test]
    fn test_channels_and_suffix() {
        let mut config = RunConfig::default();
        config.output_channels = 0;
        assert!(config.validate().unwrap_err().contains("output_channels"));

        let mut config = RunConfig::default();
        config.output_suffix = " ".to_string();
        assert!(config.validate().unwrap_err().contains("output_suffix"));
    }

    #[test]
    fn test_template_deserializes_from_plain_string() {
        let config: RunConfig = toml::from_str(r#"track_name_template = "{lang} stereo""#).unwrap();
        assert_eq!(config.track_name_template.as_str(), "{lang} stereo");
        assert_eq!(config.max_concurrency, 4);
    }
}
