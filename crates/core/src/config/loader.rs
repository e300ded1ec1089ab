use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "FORCED_STEREO_";

/// Load configuration from an optional file with environment variable overrides.
///
/// Without a file, defaults are the base layer.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::path::PathBuf;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[run]
max_concurrency = 8
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.run.max_concurrency, 8);
    }

    #[test]
    fn test_load_config_from_str_wrong_type() {
        let toml = r#"
[run]
max_concurrency = "lots"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let err = load_config(Some(Path::new("/nonexistent/forced-stereo.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_without_file() {
        Jail::expect_with(|_jail| {
            let config = load_config(None).map_err(|e| e.to_string())?;
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_config_from_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "forced-stereo.toml",
                r#"
[tools]
ffmpeg = "/usr/local/bin/ffmpeg"

[run]
output_suffix = "stereo"
"#,
            )?;

            let config =
                load_config(Some(Path::new("forced-stereo.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.tools.ffmpeg, PathBuf::from("/usr/local/bin/ffmpeg"));
            assert_eq!(config.run.output_suffix, "stereo");
            assert_eq!(config.run.max_concurrency, 4);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "forced-stereo.toml",
                r#"
[run]
max_concurrency = 2
"#,
            )?;
            jail.set_env("FORCED_STEREO_RUN__MAX_CONCURRENCY", "8");
            jail.set_env("FORCED_STEREO_TOOLS__MKVMERGE", "/opt/bin/mkvmerge");

            let config =
                load_config(Some(Path::new("forced-stereo.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.run.max_concurrency, 8);
            assert_eq!(config.tools.mkvmerge, PathBuf::from("/opt/bin/mkvmerge"));
            Ok(())
        });
    }
}
