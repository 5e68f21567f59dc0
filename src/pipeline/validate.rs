//! Lane-flow validation.
//!
//! Walks the pipes in declaration order once, tracking which lanes are open:
//! a pipe's inputs must all be open when it runs, its consumed lanes close,
//! its outputs open. A pipe other than an observer may not write a lane that
//! is still open or that it consumes itself. Every lane must be closed again
//! at the end, and no two pipes may share an instance name.

use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::lane::LaneSet;
use crate::pipeline::pipe::{Pipe, PipeKind};
use std::collections::HashSet;

/// Check the structural soundness of a pipe chain.
pub fn validate(pipes: &[Pipe]) -> PipelineResult<()> {
    let mut instances: HashSet<&str> = HashSet::with_capacity(pipes.len());
    let mut open = LaneSet::new();

    for pipe in pipes {
        let instance = pipe.info().instance_name();
        if !instances.insert(instance) {
            return Err(PipelineError::DuplicateInstance(instance.to_string()));
        }

        if !pipe.input_lanes().is_subset(&open) {
            return Err(PipelineError::MissingInputLane {
                instance: instance.to_string(),
                missing: pipe.input_lanes().difference(&open),
            });
        }

        for lane in pipe.consumed_lanes().iter() {
            open.remove(lane);
        }
        if pipe.kind() != PipeKind::Observer {
            let reused = pipe
                .output_lanes()
                .iter()
                .find(|lane| open.contains(lane) || pipe.consumed_lanes().contains(lane));
            if let Some(lane) = reused {
                return Err(PipelineError::LaneInUse {
                    instance: instance.to_string(),
                    lane: lane.to_string(),
                });
            }
        }
        for lane in pipe.output_lanes().iter() {
            open.insert(lane);
        }
    }

    if !open.is_empty() {
        return Err(PipelineError::LeftoverLanes(open.into_set()));
    }
    Ok(())
}
