pub mod config;
pub mod pipeline;
pub mod remux;
pub mod runner;
pub mod selector;
pub mod testing;
pub mod toolkit;
pub mod tracks;

pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use pipeline::{
    ErrorKind, Pipeline, PipelineError, PipelineEvent, PipelineFailure, PipelineState, RunConfig,
    RunReport,
};
pub use remux::{RemuxSpec, TrackNameTemplate};
pub use runner::{run_bounded, BatchFailure, ProgressSnapshot, ProgressTracker};
pub use selector::{FixedAnswer, Selection, SelectionError, SelectionPrompt};
pub use toolkit::{MediaToolkit, MkvToolnixToolkit, ToolError, ToolkitConfig};
pub use tracks::{ContainerInfo, MetadataError, Track, TrackKind};
