//! # laneflow: lane-based batch pipeline executor
//!
//! Assembles a linear chain of stages (a source, zero or more processors and
//! a terminal target) connected by named lanes, validates that the wiring is
//! sound, and drives repeated batch execution through the chain.
//!
//! ## Architecture
//!
//! - **Pipeline**: builder, lane-flow validation, lifecycle and batch execution
//! - **Config**: key-prefixed settings sliced per stage instance
//! - **Metrics**: shared registry of per-stage counters and timers
//! - **Logging**: `tracing` events, with a default subscriber setup for hosts
//!
//! ## Lifecycle
//!
//! ```text
//! build → init → configure* → run_batch* → destroy
//! ```
//!
//! Stage implementations live outside this crate; they plug in through the
//! [`Source`](pipeline::Source), [`Processor`](pipeline::Processor),
//! [`Target`](pipeline::Target) and [`Observer`](pipeline::Observer) traits.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;

// Re-export commonly used types
pub use config::{ConfigValue, Configuration, LogSettings};
pub use error::{PipelineError, PipelineResult, StageResult};
pub use metrics::{MetricRegistry, MetricsSnapshot};
pub use pipeline::{
    LaneSet, ModuleInfo, Pipeline, PipelineBatch, PipelineBuilder, Record, SourceStatus,
};
