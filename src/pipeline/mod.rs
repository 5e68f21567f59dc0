//! Lane-based linear data pipeline.
//!
//! Data flows through a fixed chain of stages: one Source, any number of
//! Processors, one Target. Stages hand data to each other over named lanes
//! inside a [`PipelineBatch`]; every lane is produced once and consumed once.
//!
//! # Architecture
//!
//! ```text
//! [Source] ──A──► [Processor] ──B──► [Target]
//!     └─► (Observer)   └─► (Observer)
//! ```
//!
//! # Design
//!
//! - **Enum dispatch over pipes**: `Pipe` wraps each stage kind; the stages
//!   themselves are trait objects.
//! - **Validated wiring**: lane flow is checked when the pipeline is built,
//!   so a running pipeline never leaves records behind.
//! - **Observers as pipes**: an observer is a pipe that re-reads the lanes
//!   of the stage before it and consumes nothing.
//! - **Serialized entry points**: lifecycle and execution calls hold one lock.
//!
//! # Example
//!
//! ```
//! use laneflow::metrics::MetricRegistry;
//! use laneflow::pipeline::nodes::{CollectTarget, MapProcessor, VecSource};
//! use laneflow::pipeline::{LaneSet, ModuleInfo, PipelineBatch, PipelineBuilder, Record};
//! use serde_json::json;
//!
//! let target = CollectTarget::new();
//! let collected = target.handle();
//!
//! let pipeline = PipelineBuilder::new(
//!     MetricRegistry::new(),
//!     ModuleInfo::new("numbers"),
//!     VecSource::new((1..=3).map(|i| Record::new("numbers", json!(i))).collect()),
//!     LaneSet::from(["A"]),
//! )?
//! .add_processor(
//!     ModuleInfo::new("square"),
//!     MapProcessor::new(|r| {
//!         let v = r.value.as_i64().unwrap_or_default();
//!         Ok(r.with_value(json!(v * v)))
//!     }),
//!     LaneSet::from(["A"]),
//!     LaneSet::from(["B"]),
//! )?
//! .add_target(ModuleInfo::new("sink"), target, LaneSet::from(["B"]))?
//! .build()?;
//!
//! pipeline.init()?;
//! let mut batch = PipelineBatch::new();
//! pipeline.run_batch(&mut batch)?;
//! pipeline.destroy()?;
//!
//! assert!(batch.is_empty());
//! assert_eq!(collected.lock().unwrap().len(), 3);
//! # Ok::<(), laneflow::PipelineError>(())
//! ```

pub mod batch;
pub mod builder;
pub mod executor;
pub mod info;
pub mod lane;
pub mod nodes;
pub mod pipe;
pub mod stage;
pub mod validate;

pub use batch::{BatchInput, BatchOutput, ObservedLanes, PipelineBatch, Record};
pub use builder::PipelineBuilder;
pub use executor::Pipeline;
pub use info::ModuleInfo;
pub use lane::LaneSet;
pub use pipe::{Pipe, PipeKind};
pub use stage::{Observer, Processor, Source, SourceStatus, Stage, StageContext, Target};
pub use validate::validate;
