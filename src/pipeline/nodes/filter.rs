//! FilterProcessor: predicate-based record filtering.
//!
//! Passes records for which the predicate holds to every output lane. With
//! `invert` set (config key `invert`), passes the records it would otherwise
//! drop.

use crate::config::Configuration;
use crate::error::StageResult;
use crate::pipeline::batch::{BatchInput, BatchOutput, Record};
use crate::pipeline::stage::{Processor, Stage};

type Predicate = Box<dyn Fn(&Record) -> bool + Send>;

pub struct FilterProcessor {
    predicate: Predicate,
    /// Invert mode: drop matching records instead of keeping them.
    invert: bool,
}

impl FilterProcessor {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + 'static,
    {
        Self {
            predicate: Box::new(predicate),
            invert: false,
        }
    }

    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }
}

impl Stage for FilterProcessor {
    fn configure(&mut self, conf: &Configuration) -> StageResult<()> {
        if let Some(invert) = conf.get_bool("invert") {
            self.invert = invert;
        }
        Ok(())
    }
}

impl Processor for FilterProcessor {
    fn process(&mut self, input: &BatchInput, output: &mut BatchOutput) -> StageResult<()> {
        let lanes: Vec<String> = output.lane_names().map(str::to_string).collect();
        for record in input.iter() {
            // Pass if: (matches AND !invert) OR (!matches AND invert)
            if (self.predicate)(record) == self.invert {
                continue;
            }
            for lane in &lanes {
                output.push(lane, record.clone())?;
            }
        }
        Ok(())
    }
}
