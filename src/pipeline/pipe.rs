//! Stage wrappers.
//!
//! A [`Pipe`] adapts one stage to the uniform shape the pipeline drives: an
//! identity, the lanes it reads, consumes and writes, lifecycle hooks and a
//! single `process_batch` call. The set of wrappers is closed, so dispatch is a
//! plain `match` over the enum; the stage behind each wrapper is a trait
//! object.
//!
//! Each pipe also owns its per-stage metrics, registered under its instance
//! name in the shared [`MetricRegistry`].

use crate::config::Configuration;
use crate::error::PipelineResult;
use crate::metrics::{Counter, MetricRegistry, Timer};
use crate::pipeline::batch::{BatchOutput, PipelineBatch};
use crate::pipeline::info::ModuleInfo;
use crate::pipeline::lane::LaneSet;
use crate::pipeline::stage::{Observer, Processor, Source, SourceStatus, StageContext, Target};
use std::fmt;
use std::sync::Arc;

/// Per-pipe instrumentation.
struct PipeMetrics {
    registry: MetricRegistry,
    batches: Counter,
    records_in: Counter,
    records_out: Counter,
    process: Timer,
}

impl PipeMetrics {
    fn register(registry: &MetricRegistry, instance: &str) -> Self {
        Self {
            registry: registry.clone(),
            batches: registry.counter(&format!("{}.batches", instance)),
            records_in: registry.counter(&format!("{}.records.in", instance)),
            records_out: registry.counter(&format!("{}.records.out", instance)),
            process: registry.timer(&format!("{}.process", instance)),
        }
    }
}

/// State common to every wrapper.
struct PipeCore {
    info: ModuleInfo,
    input: LaneSet,
    output: LaneSet,
    metrics: PipeMetrics,
}

impl PipeCore {
    fn new(metrics: &MetricRegistry, info: ModuleInfo, input: LaneSet, output: LaneSet) -> Self {
        let metrics = PipeMetrics::register(metrics, info.instance_name());
        Self {
            info,
            input,
            output,
            metrics,
        }
    }

    fn context(&self, modules: &Arc<[ModuleInfo]>) -> StageContext {
        StageContext {
            info: self.info.clone(),
            modules: Arc::clone(modules),
            metrics: self.metrics.registry.clone(),
        }
    }
}

/// Wraps the source that starts the pipeline.
pub struct SourcePipe {
    core: PipeCore,
    source: Box<dyn Source>,
}

/// Wraps an intermediate processor.
pub struct ProcessorPipe {
    core: PipeCore,
    processor: Box<dyn Processor>,
}

/// Wraps the terminal target.
pub struct TargetPipe {
    core: PipeCore,
    target: Box<dyn Target>,
}

/// Taps the output lanes of the stage right before it.
///
/// Reads the same lanes the watched stage wrote and declares them again as
/// output, but consumes nothing, so the records flow on untouched.
pub struct ObserverPipe {
    core: PipeCore,
    watched: ModuleInfo,
    consumed: LaneSet,
    observer: Box<dyn Observer>,
}

/// Kind of stage a [`Pipe`] wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeKind {
    Source,
    Processor,
    Target,
    Observer,
}

impl fmt::Display for PipeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipeKind::Source => "source",
            PipeKind::Processor => "processor",
            PipeKind::Target => "target",
            PipeKind::Observer => "observer",
        };
        f.write_str(s)
    }
}

/// Uniform wrapper around one pipeline stage.
pub enum Pipe {
    Source(SourcePipe),
    Processor(ProcessorPipe),
    Target(TargetPipe),
    Observer(ObserverPipe),
}

impl Pipe {
    pub(crate) fn source(
        metrics: &MetricRegistry,
        info: ModuleInfo,
        source: Box<dyn Source>,
        output: LaneSet,
    ) -> Self {
        Pipe::Source(SourcePipe {
            core: PipeCore::new(metrics, info, LaneSet::new(), output),
            source,
        })
    }

    pub(crate) fn processor(
        metrics: &MetricRegistry,
        info: ModuleInfo,
        processor: Box<dyn Processor>,
        input: LaneSet,
        output: LaneSet,
    ) -> Self {
        Pipe::Processor(ProcessorPipe {
            core: PipeCore::new(metrics, info, input, output),
            processor,
        })
    }

    pub(crate) fn target(
        metrics: &MetricRegistry,
        info: ModuleInfo,
        target: Box<dyn Target>,
        input: LaneSet,
    ) -> Self {
        Pipe::Target(TargetPipe {
            core: PipeCore::new(metrics, info, input, LaneSet::new()),
            target,
        })
    }

    /// Observer of `watched`, a pipe that was just added.
    pub(crate) fn observer(watched: &Pipe, observer: Box<dyn Observer>) -> Self {
        let registry = &watched.core().metrics.registry;
        let lanes = watched.output_lanes().clone();
        Pipe::Observer(ObserverPipe {
            core: PipeCore::new(registry, watched.info().observer(), lanes.clone(), lanes),
            watched: watched.info().clone(),
            consumed: LaneSet::new(),
            observer,
        })
    }

    fn core(&self) -> &PipeCore {
        match self {
            Pipe::Source(p) => &p.core,
            Pipe::Processor(p) => &p.core,
            Pipe::Target(p) => &p.core,
            Pipe::Observer(p) => &p.core,
        }
    }

    pub fn kind(&self) -> PipeKind {
        match self {
            Pipe::Source(_) => PipeKind::Source,
            Pipe::Processor(_) => PipeKind::Processor,
            Pipe::Target(_) => PipeKind::Target,
            Pipe::Observer(_) => PipeKind::Observer,
        }
    }

    pub fn info(&self) -> &ModuleInfo {
        &self.core().info
    }

    /// Lanes that must be available when this pipe runs.
    pub fn input_lanes(&self) -> &LaneSet {
        &self.core().input
    }

    /// Lanes removed from the batch once this pipe has run.
    pub fn consumed_lanes(&self) -> &LaneSet {
        match self {
            Pipe::Observer(p) => &p.consumed,
            _ => &self.core().input,
        }
    }

    /// Lanes created right before this pipe runs.
    pub fn output_lanes(&self) -> &LaneSet {
        &self.core().output
    }

    pub(crate) fn init(&mut self, modules: &Arc<[ModuleInfo]>) -> PipelineResult<()> {
        tracing::trace!("Initializing {} '{}'", self.kind(), self.info());
        match self {
            Pipe::Source(p) => p.source.init(&p.core.context(modules))?,
            Pipe::Processor(p) => p.processor.init(&p.core.context(modules))?,
            Pipe::Target(p) => p.target.init(&p.core.context(modules))?,
            Pipe::Observer(_) => {}
        }
        Ok(())
    }

    pub(crate) fn configure(&mut self, conf: &Configuration) -> PipelineResult<()> {
        match self {
            Pipe::Source(p) => p.source.configure(conf)?,
            Pipe::Processor(p) => p.processor.configure(conf)?,
            Pipe::Target(p) => p.target.configure(conf)?,
            Pipe::Observer(_) => {}
        }
        Ok(())
    }

    pub(crate) fn destroy(&mut self) -> PipelineResult<()> {
        tracing::trace!("Destroying {} '{}'", self.kind(), self.info());
        match self {
            Pipe::Source(p) => p.source.destroy()?,
            Pipe::Processor(p) => p.processor.destroy()?,
            Pipe::Target(p) => p.target.destroy()?,
            Pipe::Observer(_) => {}
        }
        Ok(())
    }

    /// Run the wrapped stage against `batch`. Output lanes must already exist;
    /// consumed lanes are left in place for the caller to delete.
    pub(crate) fn process_batch(&mut self, batch: &mut PipelineBatch) -> PipelineResult<()> {
        tracing::trace!("Running {} '{}'", self.kind(), self.info());
        match self {
            Pipe::Source(p) => {
                let metrics = &p.core.metrics;
                let _timer = metrics.process.start();
                let mut output = BatchOutput::new(p.core.info.instance_name(), &p.core.output);
                let status = p.source.produce(&mut output)?;
                metrics.records_out.add(output.len() as u64);
                batch.absorb(output);
                batch.set_exhausted(status == SourceStatus::Exhausted);
            }
            Pipe::Processor(p) => {
                let metrics = &p.core.metrics;
                let _timer = metrics.process.start();
                let input = batch.take_input(&p.core.input);
                metrics.records_in.add(input.len() as u64);
                let mut output = BatchOutput::new(p.core.info.instance_name(), &p.core.output);
                p.processor.process(&input, &mut output)?;
                metrics.records_out.add(output.len() as u64);
                batch.absorb(output);
            }
            Pipe::Target(p) => {
                let metrics = &p.core.metrics;
                let _timer = metrics.process.start();
                let input = batch.take_input(&p.core.input);
                metrics.records_in.add(input.len() as u64);
                p.target.write(&input)?;
            }
            Pipe::Observer(p) => {
                let metrics = &p.core.metrics;
                let _timer = metrics.process.start();
                let observed = batch.observe(&p.core.input);
                metrics
                    .records_in
                    .add(observed.values().map(|r| r.len() as u64).sum());
                p.observer.observe(&p.watched, &observed)?;
            }
        }
        self.core().metrics.batches.inc();
        Ok(())
    }
}

impl fmt::Debug for Pipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipe")
            .field("kind", &self.kind())
            .field("instance", &self.info().instance_name())
            .field("input", self.input_lanes())
            .field("consumed", self.consumed_lanes())
            .field("output", self.output_lanes())
            .finish()
    }
}
