//! External media tools.
//!
//! The pipeline never spawns processes itself. Everything it needs from
//! mkvmerge, mkvextract and ffmpeg goes through the [`MediaToolkit`] trait,
//! so tests can swap in [`crate::testing::MockToolkit`].
//!
//! # Example
//!
//! ```ignore
//! use forced_stereo_core::toolkit::{MediaToolkit, MkvToolnixToolkit, ToolkitConfig};
//!
//! let toolkit = MkvToolnixToolkit::new(ToolkitConfig::default());
//! toolkit.validate().await?;
//! let document = toolkit.identify(Path::new("movie.mkv")).await?;
//! ```

mod config;
mod error;
mod mkvtoolnix;
mod traits;
mod types;

pub use config::ToolkitConfig;
pub use error::ToolError;
pub use mkvtoolnix::MkvToolnixToolkit;
pub use traits::MediaToolkit;
pub use types::{ExtractRequest, ExtractTarget, Tool, TransformJob};
