//! Remux command building.
//!
//! Turns the selection and its transformed artifacts into the parameter set
//! for the final mkvmerge call, and derives where the output goes.

mod builder;
mod template;

pub use builder::{
    build_remux_spec, output_path_for, AddedTrack, RemuxError, RemuxSpec, TrackArtifact,
    OUTPUT_EXTENSION,
};
pub use template::{TrackNameTemplate, DEFAULT_TRACK_NAME_TEMPLATE};
