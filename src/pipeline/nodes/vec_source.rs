//! VecSource: emits queued records.
//!
//! Every produced record is written to each declared output lane. With a
//! batch size set, at most that many records are emitted per batch; the
//! source reports [`SourceStatus::Exhausted`] once the queue is drained.

use crate::config::Configuration;
use crate::error::StageResult;
use crate::pipeline::batch::{BatchOutput, Record};
use crate::pipeline::stage::{Source, SourceStatus, Stage, StageContext};
use std::collections::VecDeque;

pub struct VecSource {
    queue: VecDeque<Record>,
    /// Max records per batch. `None` = everything at once.
    batch_size: Option<usize>,
}

impl VecSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            queue: records.into(),
            batch_size: None,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size.max(1));
        self
    }

    /// Queue more records behind the pending ones.
    pub fn enqueue(&mut self, records: impl IntoIterator<Item = Record>) {
        self.queue.extend(records);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Stage for VecSource {
    fn init(&mut self, ctx: &StageContext) -> StageResult<()> {
        tracing::debug!(
            "VecSource '{}' starting with {} queued records",
            ctx.info.instance_name(),
            self.queue.len()
        );
        Ok(())
    }

    fn configure(&mut self, conf: &Configuration) -> StageResult<()> {
        if let Some(size) = conf.get_int("batch_size") {
            anyhow::ensure!(size > 0, "batch_size must be positive, got {}", size);
            let size = usize::try_from(size)
                .map_err(|_| anyhow::anyhow!("batch_size {} does not fit in usize", size))?;
            self.batch_size = Some(size);
        }
        Ok(())
    }
}

impl Source for VecSource {
    fn produce(&mut self, output: &mut BatchOutput) -> StageResult<SourceStatus> {
        let n = self
            .batch_size
            .unwrap_or(self.queue.len())
            .min(self.queue.len());
        let lanes: Vec<String> = output.lane_names().map(str::to_string).collect();

        for record in self.queue.drain(..n) {
            for lane in &lanes {
                output.push(lane, record.clone())?;
            }
        }

        if self.queue.is_empty() {
            Ok(SourceStatus::Exhausted)
        } else {
            Ok(SourceStatus::More)
        }
    }
}
