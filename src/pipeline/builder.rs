//! Incremental pipeline construction.
//!
//! A builder starts from a source and grows by appending processors and
//! finally a target, each declaring the lanes it reads and writes. Lane sets
//! are checked for emptiness as stages are added; the global lane-flow check
//! runs on [`PipelineBuilder::validate`] and again on [`PipelineBuilder::build`].
//!
//! `build` takes the builder by value, so a builder cannot be built twice:
//!
//! ```compile_fail
//! use laneflow::metrics::MetricRegistry;
//! use laneflow::pipeline::nodes::{CollectTarget, VecSource};
//! use laneflow::pipeline::{LaneSet, ModuleInfo, PipelineBuilder};
//!
//! let builder = PipelineBuilder::new(
//!     MetricRegistry::new(),
//!     ModuleInfo::new("s"),
//!     VecSource::new(vec![]),
//!     LaneSet::from(["A"]),
//! )
//! .unwrap()
//! .add_target(ModuleInfo::new("t"), CollectTarget::new(), LaneSet::from(["A"]))
//! .unwrap();
//!
//! let first = builder.build();
//! let second = builder.build(); // use of moved value
//! ```

use crate::error::{PipelineError, PipelineResult};
use crate::metrics::MetricRegistry;
use crate::pipeline::executor::Pipeline;
use crate::pipeline::info::ModuleInfo;
use crate::pipeline::lane::LaneSet;
use crate::pipeline::pipe::Pipe;
use crate::pipeline::stage::{Observer, Processor, Source, Target};
use crate::pipeline::validate::validate;

/// Accumulates stages in declaration order.
pub struct PipelineBuilder {
    metrics: MetricRegistry,
    modules: Vec<ModuleInfo>,
    pipes: Vec<Pipe>,
}

impl PipelineBuilder {
    /// Start a pipeline from `source`, writing `output`.
    pub fn new(
        metrics: MetricRegistry,
        info: ModuleInfo,
        source: impl Source + 'static,
        output: LaneSet,
    ) -> PipelineResult<Self> {
        Self::start(metrics, info, Box::new(source), output, None)
    }

    /// Like [`PipelineBuilder::new`], with `observer` watching the source's output.
    pub fn with_observer(
        metrics: MetricRegistry,
        info: ModuleInfo,
        source: impl Source + 'static,
        output: LaneSet,
        observer: impl Observer + 'static,
    ) -> PipelineResult<Self> {
        Self::start(metrics, info, Box::new(source), output, Some(Box::new(observer)))
    }

    fn start(
        metrics: MetricRegistry,
        info: ModuleInfo,
        source: Box<dyn Source>,
        output: LaneSet,
        observer: Option<Box<dyn Observer>>,
    ) -> PipelineResult<Self> {
        ensure_lanes(&info, &output, "output")?;
        let mut builder = Self {
            metrics,
            modules: Vec::new(),
            pipes: Vec::new(),
        };
        let pipe = Pipe::source(&builder.metrics, info, source, output);
        builder.push(pipe, observer);
        Ok(builder)
    }

    /// Append a processor reading `input` and writing `output`.
    pub fn add_processor(
        self,
        info: ModuleInfo,
        processor: impl Processor + 'static,
        input: LaneSet,
        output: LaneSet,
    ) -> PipelineResult<Self> {
        self.processor(info, Box::new(processor), input, output, None)
    }

    /// Like [`PipelineBuilder::add_processor`], with `observer` watching the
    /// processor's output.
    pub fn add_processor_with_observer(
        self,
        info: ModuleInfo,
        processor: impl Processor + 'static,
        input: LaneSet,
        output: LaneSet,
        observer: impl Observer + 'static,
    ) -> PipelineResult<Self> {
        self.processor(info, Box::new(processor), input, output, Some(Box::new(observer)))
    }

    fn processor(
        mut self,
        info: ModuleInfo,
        processor: Box<dyn Processor>,
        input: LaneSet,
        output: LaneSet,
        observer: Option<Box<dyn Observer>>,
    ) -> PipelineResult<Self> {
        ensure_lanes(&info, &input, "input")?;
        ensure_lanes(&info, &output, "output")?;
        let pipe = Pipe::processor(&self.metrics, info, processor, input, output);
        self.push(pipe, observer);
        Ok(self)
    }

    /// Append a target reading `input`. Targets produce no lanes and take no
    /// observer.
    pub fn add_target(
        mut self,
        info: ModuleInfo,
        target: impl Target + 'static,
        input: LaneSet,
    ) -> PipelineResult<Self> {
        ensure_lanes(&info, &input, "input")?;
        let pipe = Pipe::target(&self.metrics, info, Box::new(target), input);
        self.push(pipe, None);
        Ok(self)
    }

    /// Run the lane-flow check on the stages added so far.
    pub fn validate(self) -> PipelineResult<Self> {
        validate(&self.pipes)?;
        Ok(self)
    }

    /// Number of pipes so far, observers included.
    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    /// Validate and freeze the stages into a [`Pipeline`].
    pub fn build(self) -> PipelineResult<Pipeline> {
        validate(&self.pipes)?;
        tracing::debug!(
            "Built pipeline with {} stages ({} pipes)",
            self.modules.len(),
            self.pipes.len()
        );
        Ok(Pipeline::new(self.pipes, self.modules.into(), self.metrics))
    }

    fn push(&mut self, pipe: Pipe, observer: Option<Box<dyn Observer>>) {
        self.modules.push(pipe.info().clone());
        let observer = observer.map(|o| Pipe::observer(&pipe, o));
        self.pipes.push(pipe);
        self.pipes.extend(observer);
    }
}

fn ensure_lanes(info: &ModuleInfo, lanes: &LaneSet, what: &'static str) -> PipelineResult<()> {
    if lanes.is_empty() {
        return Err(PipelineError::EmptyLanes {
            instance: info.instance_name().to_string(),
            what,
        });
    }
    Ok(())
}
