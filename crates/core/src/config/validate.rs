use super::{types::Config, ConfigError};

const FFMPEG_LOG_LEVELS: &[&str] = &[
    "quiet", "panic", "fatal", "error", "warning", "info", "verbose", "debug", "trace",
];

/// Validate configuration
/// Currently validates:
/// - run options (concurrency range, channel count, output suffix)
/// - tools.ffmpeg_log_level is a level ffmpeg accepts
/// - tools.timeout_secs is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    config.run.validate().map_err(ConfigError::ValidationError)?;

    if !FFMPEG_LOG_LEVELS.contains(&config.tools.ffmpeg_log_level.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "tools.ffmpeg_log_level must be one of {}, got {}",
            FFMPEG_LOG_LEVELS.join(", "),
            config.tools.ffmpeg_log_level
        )));
    }

    if config.tools.timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "tools.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_concurrency_out_of_range() {
        let mut config = Config::default();
        config.run.max_concurrency = 32;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref msg) if msg.contains("max_concurrency")));
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = Config::default();
        config.tools.ffmpeg_log_level = "loud".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.tools.timeout_secs = Some(0);
        assert!(validate_config(&config).is_err());
    }
}
