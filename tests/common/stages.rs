//! Recording stages for lifecycle assertions

use laneflow::pipeline::{
    BatchInput, BatchOutput, Processor, Source, SourceStatus, Stage, StageContext, Target,
};
use laneflow::{Configuration, Record, StageResult};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Shared, ordered log of lifecycle events (`"<stage>:<event>"`)
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Stage that records every call it receives into an [`EventLog`]
pub struct Recording {
    name: String,
    log: EventLog,
    /// Number of records a source emits per batch
    emit: i64,
}

impl Recording {
    pub fn new(name: &str, log: &EventLog) -> Self {
        Self {
            name: name.to_string(),
            log: Arc::clone(log),
            emit: 1,
        }
    }

    pub fn emitting(mut self, emit: i64) -> Self {
        self.emit = emit;
        self
    }

    fn record(&self, event: &str) {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.name, event));
    }
}

impl Stage for Recording {
    fn init(&mut self, _ctx: &StageContext) -> StageResult<()> {
        self.record("init");
        Ok(())
    }

    fn configure(&mut self, conf: &Configuration) -> StageResult<()> {
        self.record(&format!("configure({})", conf.len()));
        Ok(())
    }

    fn destroy(&mut self) -> StageResult<()> {
        self.record("destroy");
        Ok(())
    }
}

impl Source for Recording {
    fn produce(&mut self, output: &mut BatchOutput) -> StageResult<SourceStatus> {
        self.record("produce");
        let lanes: Vec<String> = output.lane_names().map(str::to_string).collect();
        for i in 0..self.emit {
            for lane in &lanes {
                output.push(lane, Record::new(&self.name, json!(i)))?;
            }
        }
        Ok(SourceStatus::More)
    }
}

impl Processor for Recording {
    fn process(&mut self, input: &BatchInput, output: &mut BatchOutput) -> StageResult<()> {
        self.record("process");
        let lanes: Vec<String> = output.lane_names().map(str::to_string).collect();
        for lane in &lanes {
            output.extend(lane, input.iter().cloned())?;
        }
        Ok(())
    }
}

impl Target for Recording {
    fn write(&mut self, _input: &BatchInput) -> StageResult<()> {
        self.record("write");
        Ok(())
    }
}
