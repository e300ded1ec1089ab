use serde::{Deserialize, Serialize};

use crate::pipeline::RunConfig;
use crate::toolkit::ToolkitConfig;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// External executables.
    #[serde(default)]
    pub tools: ToolkitConfig,
    /// Per-run options.
    #[serde(default)]
    pub run: RunConfig,
}
