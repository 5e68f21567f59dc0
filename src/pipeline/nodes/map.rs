//! MapProcessor: per-record transformation.
//!
//! Applies a closure to every record of every input lane and writes the
//! result to each output lane.

use crate::error::StageResult;
use crate::pipeline::batch::{BatchInput, BatchOutput, Record};
use crate::pipeline::stage::{Processor, Stage};

type MapFn = Box<dyn FnMut(&Record) -> StageResult<Record> + Send>;

pub struct MapProcessor {
    map: MapFn,
}

impl MapProcessor {
    pub fn new<F>(map: F) -> Self
    where
        F: FnMut(&Record) -> StageResult<Record> + Send + 'static,
    {
        Self { map: Box::new(map) }
    }

    /// Copies input records unchanged.
    pub fn passthrough() -> Self {
        Self::new(|record| Ok(record.clone()))
    }
}

impl Stage for MapProcessor {}

impl Processor for MapProcessor {
    fn process(&mut self, input: &BatchInput, output: &mut BatchOutput) -> StageResult<()> {
        let lanes: Vec<String> = output.lane_names().map(str::to_string).collect();
        for record in input.iter() {
            let mapped = (self.map)(record)?;
            for lane in &lanes {
                output.push(lane, mapped.clone())?;
            }
        }
        Ok(())
    }
}
