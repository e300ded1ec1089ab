//! Configuration loading.
//!
//! A TOML file (optional) is layered under `FORCED_STEREO_`-prefixed
//! environment variables, with a double underscore separating sections:
//!
//! ```text
//! FORCED_STEREO_RUN__MAX_CONCURRENCY=8
//! FORCED_STEREO_TOOLS__FFMPEG=/opt/ffmpeg/bin/ffmpeg
//! ```

mod loader;
mod types;
mod validate;

pub use loader::{load_config, load_config_from_str, ENV_PREFIX};
pub use types::Config;
pub use validate::validate_config;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
