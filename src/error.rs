//! Error handling for laneflow
//!
//! Every fallible pipeline operation returns [`PipelineResult`]. Stage
//! implementations return [`StageResult`], which is `anyhow`-based so stage
//! authors can attach their own context; those errors pass through the
//! pipeline untouched via [`PipelineError::Stage`].

use std::collections::BTreeSet;
use thiserror::Error;

/// Result type returned by stage implementations.
pub type StageResult<T> = anyhow::Result<T>;

/// Main error type for pipeline construction, lifecycle and execution.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A stage was declared with an empty input or output lane set
    #[error("{what} lanes of '{instance}' cannot be empty")]
    EmptyLanes {
        instance: String,
        what: &'static str,
    },

    /// Two stages share the same instance name
    #[error("Pipe '{0}' already exists")]
    DuplicateInstance(String),

    /// A stage consumes a lane nobody upstream produced
    #[error("Pipe '{instance}' requires input lanes which are not available: {missing:?}")]
    MissingInputLane {
        instance: String,
        missing: BTreeSet<String>,
    },

    /// Lanes produced but never consumed by the end of the pipeline
    #[error("End of pipeline should not have any lane, it has: {0:?}")]
    LeftoverLanes(BTreeSet<String>),

    /// A stage writes a lane that is still open or that it also consumes
    #[error("Pipe '{instance}' writes lane '{lane}' which is already in use")]
    LaneInUse { instance: String, lane: String },

    /// `init` was called a second time
    #[error("Pipeline has been already initialized")]
    AlreadyInitialized,

    /// A lifecycle or batch call came before `init`
    #[error("Pipeline has not been initialized")]
    NotInitialized,

    /// A lifecycle or batch call came after `destroy`
    #[error("Pipeline has been destroyed")]
    Destroyed,

    /// The batch still held lanes after a full pass
    #[error("Batch should be empty after a full pass, it has: {0:?}")]
    LeakedLanes(Vec<String>),

    /// A stage wrote to a lane it did not declare as output
    #[error("Lane '{lane}' is not declared as output of '{instance}'")]
    UndeclaredLane { instance: String, lane: String },

    /// Error raised by a wrapped stage, propagated unmodified
    #[error(transparent)]
    Stage(#[from] anyhow::Error),

    /// Errors related to configuration loading or lookup
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Another caller panicked while holding the pipeline lock
    #[error("Pipeline lock poisoned")]
    Poisoned,
}

impl PipelineError {
    /// Whether this error reports a broken internal invariant rather than a
    /// caller mistake or a stage failure.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::LeakedLanes(_) | PipelineError::Poisoned)
    }

    /// Instance name of the stage the error refers to, when there is one.
    pub fn instance(&self) -> Option<&str> {
        match self {
            PipelineError::EmptyLanes { instance, .. }
            | PipelineError::MissingInputLane { instance, .. }
            | PipelineError::LaneInUse { instance, .. }
            | PipelineError::UndeclaredLane { instance, .. } => Some(instance),
            PipelineError::DuplicateInstance(instance) => Some(instance),
            _ => None,
        }
    }
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
