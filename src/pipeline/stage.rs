//! Stage abstraction for the pipeline.
//!
//! Stages are the pluggable business logic the pipeline drives. They come in
//! three kinds, each with its own processing call:
//! - **[`Source`]**: fills its output lanes, reports whether more data follows.
//! - **[`Processor`]**: reads its input lanes, writes its output lanes.
//! - **[`Target`]**: reads its input lanes, writes nothing back.
//!
//! All three share the [`Stage`] lifecycle hooks. [`Observer`]s are not stages;
//! they only get a read-only look at the lanes of the stage they watch.

use crate::config::Configuration;
use crate::error::StageResult;
use crate::metrics::MetricRegistry;
use crate::pipeline::batch::{BatchInput, BatchOutput, ObservedLanes};
use crate::pipeline::info::ModuleInfo;
use std::sync::Arc;

/// Context handed to a stage when the pipeline initializes it.
#[derive(Debug, Clone)]
pub struct StageContext {
    /// The stage's own identity.
    pub info: ModuleInfo,
    /// Every stage of the pipeline, in declaration order.
    pub modules: Arc<[ModuleInfo]>,
    /// Shared registry for stage-defined metrics.
    pub metrics: MetricRegistry,
}

impl StageContext {
    /// Metric name scoped to this stage instance.
    pub fn metric_name(&self, metric: &str) -> String {
        format!("{}.{}", self.info.instance_name(), metric)
    }
}

/// Lifecycle hooks shared by sources, processors and targets.
pub trait Stage: Send {
    /// Called once, in declaration order, before any batch runs.
    fn init(&mut self, _ctx: &StageContext) -> StageResult<()> {
        Ok(())
    }

    /// Called with the settings subset keyed by this stage's instance name.
    /// May be called repeatedly.
    fn configure(&mut self, _conf: &Configuration) -> StageResult<()> {
        Ok(())
    }

    /// Called once, in reverse declaration order.
    fn destroy(&mut self) -> StageResult<()> {
        Ok(())
    }
}

/// What a source reports after producing a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceStatus {
    /// More data may follow.
    #[default]
    More,
    /// Nothing more to emit.
    Exhausted,
}

/// First stage of a pipeline.
pub trait Source: Stage {
    fn produce(&mut self, output: &mut BatchOutput) -> StageResult<SourceStatus>;
}

/// Intermediate stage transforming input lanes into output lanes.
pub trait Processor: Stage {
    fn process(&mut self, input: &BatchInput, output: &mut BatchOutput) -> StageResult<()>;
}

/// Terminal stage consuming its input lanes.
pub trait Target: Stage {
    fn write(&mut self, input: &BatchInput) -> StageResult<()>;
}

/// Read-only tap on the output lanes of one stage.
pub trait Observer: Send {
    fn observe(&mut self, stage: &ModuleInfo, lanes: &ObservedLanes<'_>) -> StageResult<()>;
}
