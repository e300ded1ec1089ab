//! Track model for container files.
//!
//! Turns the structured identification document produced by `mkvmerge -J`
//! into typed [`Track`] records and exposes the codec id to extension table
//! used when naming extracted streams.
//!
//! # Example
//!
//! ```ignore
//! use forced_stereo_core::tracks::parse_container_info;
//!
//! let info = parse_container_info(&json)?;
//! for track in info.mono_audio_tracks() {
//!     println!("{}: {} ({})", track.id, track.codec_name, track.language);
//! }
//! ```

mod codec;
mod identify;
mod types;

pub use codec::{codec_ids_for, extension_for, CODEC_EXTENSIONS};
pub use identify::parse_container_info;
pub use types::{
    ContainerInfo, MetadataError, Track, TrackKind, MATROSKA_CONTAINER, UNDETERMINED_LANGUAGE,
};
