//! Pipeline controller.
//!
//! Sequences one run as a strict linear state machine:
//!
//! ```text
//! Init → Identified → Selected → WorkspaceReady → Extracted → Transformed
//!      → Remuxed → CleanedUp → Done
//! ```
//!
//! with `Failed` reachable from every non-terminal state. Each stage consumes
//! a [`RunContext`] and returns it advanced by one state. The run-scoped
//! [`Workspace`] is removed whether the run ends in `Done` or `Failed`.
//!
//! # Example
//!
//! ```ignore
//! use forced_stereo_core::pipeline::{Pipeline, RunConfig};
//! use forced_stereo_core::selector::FixedAnswer;
//! use forced_stereo_core::toolkit::MkvToolnixToolkit;
//!
//! let pipeline = Pipeline::new(MkvToolnixToolkit::with_defaults(), RunConfig::default());
//! let report = pipeline.run(Path::new("movie.mkv"), &FixedAnswer::default(), None).await?;
//! println!("{}", report.output.display());
//! ```

mod config;
mod context;
mod controller;
mod error;
mod state;
mod types;
mod workspace;

pub use config::{RunConfig, CONCURRENCY_RANGE};
pub use context::RunContext;
pub use controller::Pipeline;
pub use error::{ErrorKind, PipelineError, PipelineFailure};
pub use state::PipelineState;
pub use types::{PipelineEvent, PlannedTrack, RunReport};
pub use workspace::{artifact_path, Workspace};
