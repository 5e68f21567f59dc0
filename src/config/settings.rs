//! Process-level settings used when embedding laneflow
//!
//! These are separate from the per-stage [`Configuration`](super::Configuration)
//! that flows through the pipeline: they control how the hosting process sets
//! up its own logging around the pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default tracing filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info,laneflow=debug";

/// Default file name prefix for rotated log files
pub const DEFAULT_LOG_FILE_PREFIX: &str = "laneflow.log";

/// Logging settings consumed by [`crate::logging::init_logging`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is not set
    pub filter: String,

    /// Directory for daily-rotated log files. `None` logs to stderr only.
    pub directory: Option<PathBuf>,

    /// File name prefix inside `directory`
    pub file_prefix: String,

    /// Emit ANSI colors on the stderr layer
    pub ansi: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            directory: None,
            file_prefix: DEFAULT_LOG_FILE_PREFIX.to_string(),
            ansi: true,
        }
    }
}
