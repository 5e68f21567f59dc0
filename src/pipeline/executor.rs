//! Pipeline executor: lifecycle and batch execution.
//!
//! A [`Pipeline`] is the frozen pipe chain produced by
//! [`PipelineBuilder::build`](crate::pipeline::PipelineBuilder::build). It moves
//! through `constructed → initialized → (configured)* → destroyed`, and each
//! `run_batch` call does, for every pipe in order:
//! 1. Create the pipe's output lanes in the batch.
//! 2. Run the pipe.
//! 3. Delete the lanes the pipe consumed.
//!
//! After the full pass the batch must be empty.
//!
//! `init`, `configure`, `run_batch` and `destroy` take `&self` and are
//! serialized by an internal lock, so a pipeline can be shared across threads
//! behind an `Arc` while only one of these calls is in progress at a time.

use crate::config::{Configuration, PIPELINE_PREFIX};
use crate::error::{PipelineError, PipelineResult};
use crate::metrics::MetricRegistry;
use crate::pipeline::batch::PipelineBatch;
use crate::pipeline::info::ModuleInfo;
use crate::pipeline::pipe::Pipe;
use std::sync::{Arc, Mutex, MutexGuard};

struct PipelineState {
    pipes: Vec<Pipe>,
    initialized: bool,
    destroyed: bool,
}

/// A validated, immutable chain of pipes.
pub struct Pipeline {
    state: Mutex<PipelineState>,
    modules: Arc<[ModuleInfo]>,
    metrics: MetricRegistry,
}

impl Pipeline {
    pub(crate) fn new(
        pipes: Vec<Pipe>,
        modules: Arc<[ModuleInfo]>,
        metrics: MetricRegistry,
    ) -> Self {
        Self {
            state: Mutex::new(PipelineState {
                pipes,
                initialized: false,
                destroyed: false,
            }),
            modules,
            metrics,
        }
    }

    /// Stages in declaration order, observers excluded.
    pub fn stages(&self) -> &[ModuleInfo] {
        &self.modules
    }

    /// Registry every pipe records its metrics into.
    pub fn metrics(&self) -> &MetricRegistry {
        &self.metrics
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().map(|s| s.initialized).unwrap_or(false)
    }

    pub fn is_destroyed(&self) -> bool {
        self.lock().map(|s| s.destroyed).unwrap_or(false)
    }

    fn lock(&self) -> PipelineResult<MutexGuard<'_, PipelineState>> {
        self.state.lock().map_err(|_| PipelineError::Poisoned)
    }

    /// Initialize every stage, source first.
    ///
    /// The pipeline counts as initialized even when a stage fails, so
    /// [`Pipeline::destroy`] can still release the stages that did start.
    pub fn init(&self) -> PipelineResult<()> {
        let mut state = self.lock()?;
        if state.initialized {
            return Err(PipelineError::AlreadyInitialized);
        }
        state.initialized = true;

        tracing::info!("Initializing pipeline with {} stages", self.modules.len());
        for pipe in state.pipes.iter_mut() {
            pipe.init(&self.modules)?;
        }
        Ok(())
    }

    /// Hand every stage the subset of `conf` keyed by its instance name.
    pub fn configure(&self, conf: &Configuration) -> PipelineResult<()> {
        let mut state = self.lock()?;
        ensure_running(&state)?;

        let pipeline_conf = conf.subset(PIPELINE_PREFIX);
        apply_pipeline_settings(&pipeline_conf);

        for pipe in state.pipes.iter_mut() {
            let stage_conf = conf.subset(pipe.info().instance_name());
            pipe.configure(&stage_conf)?;
        }
        tracing::debug!("Pipeline configured");
        Ok(())
    }

    /// Push one batch through every pipe in order.
    ///
    /// The batch must come back empty; anything left over means a lane was
    /// produced and never consumed, which validation should have ruled out,
    /// and is reported as the fatal [`PipelineError::LeakedLanes`].
    pub fn run_batch(&self, batch: &mut PipelineBatch) -> PipelineResult<()> {
        let mut state = self.lock()?;
        ensure_running(&state)?;

        for pipe in state.pipes.iter_mut() {
            batch.create_lanes(pipe.output_lanes());
            pipe.process_batch(batch)?;
            batch.delete_lanes(pipe.consumed_lanes());
        }

        if !batch.is_empty() {
            let lanes = batch.lane_names();
            tracing::error!("Batch not empty after full pass, leaked lanes: {:?}", lanes);
            return Err(PipelineError::LeakedLanes(lanes));
        }
        tracing::debug!("Batch completed (exhausted: {})", batch.is_exhausted());
        Ok(())
    }

    /// Destroy every stage, target first. A second call is a no-op.
    pub fn destroy(&self) -> PipelineResult<()> {
        let mut state = self.lock()?;
        if !state.initialized {
            return Err(PipelineError::NotInitialized);
        }
        if state.destroyed {
            return Ok(());
        }
        state.destroyed = true;

        tracing::info!("Destroying pipeline");
        for pipe in state.pipes.iter_mut().rev() {
            pipe.destroy()?;
        }
        Ok(())
    }
}

fn ensure_running(state: &PipelineState) -> PipelineResult<()> {
    if !state.initialized {
        return Err(PipelineError::NotInitialized);
    }
    if state.destroyed {
        return Err(PipelineError::Destroyed);
    }
    Ok(())
}

/// Pipeline-wide settings hook. No setting is defined yet; the subset is
/// extracted so stages never see `pipeline.` keys as their own.
fn apply_pipeline_settings(conf: &Configuration) {
    if !conf.is_empty() {
        tracing::debug!("Ignoring {} pipeline-wide settings", conf.len());
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.modules)
            .field("initialized", &self.is_initialized())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
