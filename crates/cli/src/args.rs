//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

use forced_stereo_core::Config;

/// Adds forced-stereo copies of selected audio tracks to a media file.
#[derive(Parser, Debug, Clone)]
#[command(name = "forced-stereo")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Media file to process.
    pub input: PathBuf,

    /// Process every mono audio track without prompting.
    #[arg(long)]
    pub select_all_mono: bool,

    /// Name of each added track. Placeholders: {original_name}, {language},
    /// {lang}, {codec}, {id}, {channels}.
    #[arg(long, value_name = "TEXT")]
    pub track_name_template: Option<String>,

    /// Transforms run at the same time (1-16, default 4).
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..=16))]
    pub max_concurrency: Option<u8>,

    /// TOML configuration file. Environment variables prefixed with
    /// FORCED_STEREO_ override it.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Applies flags on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if self.select_all_mono {
            config.run.select_all_mono = true;
        }
        if let Some(ref template) = self.track_name_template {
            config.run.track_name_template = template.as_str().into();
        }
        if let Some(max) = self.max_concurrency {
            config.run.max_concurrency = usize::from(max);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_is_required() {
        assert!(Args::try_parse_from(["forced-stereo"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["forced-stereo", "movie.mkv"]).unwrap();
        assert_eq!(args.input, PathBuf::from("movie.mkv"));
        assert!(!args.select_all_mono);
        assert!(args.track_name_template.is_none());
        assert!(args.max_concurrency.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "forced-stereo",
            "--select-all-mono",
            "--track-name-template",
            "Stereo {lang}",
            "--max-concurrency",
            "16",
            "--config",
            "/etc/forced-stereo.toml",
            "movie.mkv",
        ])
        .unwrap();

        assert!(args.select_all_mono);
        assert_eq!(args.track_name_template.as_deref(), Some("Stereo {lang}"));
        assert_eq!(args.max_concurrency, Some(16));
        assert_eq!(args.config, Some(PathBuf::from("/etc/forced-stereo.toml")));
    }

    #[test]
    fn test_max_concurrency_out_of_range() {
        for value in ["0", "17", "-1", "four"] {
            let result =
                Args::try_parse_from(["forced-stereo", "--max-concurrency", value, "movie.mkv"]);
            assert!(result.is_err(), "accepted {}", value);
        }
    }

    #[test]
    fn test_apply_overrides_config() {
        let args = Args::try_parse_from([
            "forced-stereo",
            "--select-all-mono",
            "--track-name-template",
            "{lang} stereo",
            "--max-concurrency",
            "2",
            "movie.mkv",
        ])
        .unwrap();
        let mut config = Config::default();

        args.apply(&mut config);

        assert!(config.run.select_all_mono);
        assert_eq!(config.run.track_name_template.as_str(), "{lang} stereo");
        assert_eq!(config.run.max_concurrency, 2);
    }

    #[test]
    fn test_apply_keeps_config_without_flags() {
        let args = Args::try_parse_from(["forced-stereo", "movie.mkv"]).unwrap();
        let mut config = Config::default();
        config.run.select_all_mono = true;
        config.run.max_concurrency = 8;

        args.apply(&mut config);

        assert!(config.run.select_all_mono);
        assert_eq!(config.run.max_concurrency, 8);
    }
}
