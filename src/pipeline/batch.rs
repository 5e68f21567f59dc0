//! Batch data model.
//!
//! A [`PipelineBatch`] is the unit of execution: a mapping from lane name to the
//! records currently sitting on that lane. The pipeline creates a stage's
//! output lanes right before it runs and deletes its consumed lanes right
//! after, so a batch that went through a whole pipeline ends up empty.
//!
//! Stages never see the batch itself. Readers get a [`BatchInput`] holding
//! only their declared input lanes, writers get a [`BatchOutput`] that rejects
//! writes to undeclared lanes.

use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::lane::LaneSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single unit of data flowing through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Origin tag, set by whoever created the record.
    pub source_id: String,
    pub created_at: DateTime<Utc>,
    pub value: serde_json::Value,
}

impl Record {
    pub fn new(source_id: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            source_id: source_id.into(),
            created_at: Utc::now(),
            value,
        }
    }

    /// Same record with a different payload; origin and timestamp are kept.
    pub fn with_value(&self, value: serde_json::Value) -> Self {
        Self {
            source_id: self.source_id.clone(),
            created_at: self.created_at,
            value,
        }
    }
}

/// Read-only view of the lanes an observer watches.
pub type ObservedLanes<'a> = BTreeMap<&'a str, &'a [Record]>;

/// Lane-keyed bag of records for one execution cycle.
#[derive(Debug, Clone, Default)]
pub struct PipelineBatch {
    lanes: BTreeMap<String, Vec<Record>>,
    exhausted: bool,
}

impl PipelineBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty entries for `lanes`. Lanes that already exist keep their
    /// records.
    pub fn create_lanes(&mut self, lanes: &LaneSet) {
        for lane in lanes {
            if !self.lanes.contains_key(lane) {
                self.lanes.insert(lane.clone(), Vec::new());
            }
        }
    }

    /// Remove `lanes` and everything still on them.
    pub fn delete_lanes(&mut self, lanes: &LaneSet) {
        for lane in lanes {
            self.lanes.remove(lane);
        }
    }

    /// True when no lane entry exists, even an empty one.
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn lane_names(&self) -> Vec<String> {
        self.lanes.keys().cloned().collect()
    }

    pub fn has_lane(&self, lane: &str) -> bool {
        self.lanes.contains_key(lane)
    }

    /// Records on `lane`, or an empty slice if the lane does not exist.
    pub fn records(&self, lane: &str) -> &[Record] {
        self.lanes.get(lane).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append a record to an existing lane.
    pub fn push(&mut self, lane: &str, record: Record) -> PipelineResult<()> {
        match self.lanes.get_mut(lane) {
            Some(records) => {
                records.push(record);
                Ok(())
            }
            None => Err(PipelineError::UndeclaredLane {
                instance: "batch".to_string(),
                lane: lane.to_string(),
            }),
        }
    }

    /// Move the records out of `lane`, leaving the lane present but empty.
    pub fn take_lane(&mut self, lane: &str) -> Vec<Record> {
        self.lanes
            .get_mut(lane)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Total number of records across all lanes.
    pub fn len(&self) -> usize {
        self.lanes.values().map(Vec::len).sum()
    }

    /// Whether the source reported it has nothing more to emit. The pipeline
    /// only carries this flag; interpreting it is up to the caller.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub(crate) fn set_exhausted(&mut self, exhausted: bool) {
        self.exhausted = exhausted;
    }

    /// Drain `lanes` into a [`BatchInput`].
    pub(crate) fn take_input(&mut self, lanes: &LaneSet) -> BatchInput {
        BatchInput {
            lanes: lanes
                .iter()
                .map(|lane| (lane.to_string(), self.take_lane(lane)))
                .collect(),
        }
    }

    /// Borrow `lanes` for observation.
    pub(crate) fn observe<'a>(&'a self, lanes: &'a LaneSet) -> ObservedLanes<'a> {
        lanes.iter().map(|lane| (lane, self.records(lane))).collect()
    }

    /// Append every lane of `output` to the batch.
    pub(crate) fn absorb(&mut self, output: BatchOutput) {
        for (lane, records) in output.lanes {
            self.lanes.entry(lane).or_default().extend(records);
        }
    }
}

/// Records a stage reads, keyed by its declared input lanes.
#[derive(Debug, Clone, Default)]
pub struct BatchInput {
    lanes: BTreeMap<String, Vec<Record>>,
}

impl BatchInput {
    /// Records on `lane`; empty if the lane is not an input of this stage.
    pub fn records(&self, lane: &str) -> &[Record] {
        self.lanes.get(lane).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn lanes(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.lanes.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// All records across all input lanes, lane by lane.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.lanes.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.lanes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Write side of a stage: one buffer per declared output lane.
#[derive(Debug)]
pub struct BatchOutput {
    instance: String,
    lanes: BTreeMap<String, Vec<Record>>,
}

impl BatchOutput {
    pub(crate) fn new(instance: &str, lanes: &LaneSet) -> Self {
        Self {
            instance: instance.to_string(),
            lanes: lanes.iter().map(|l| (l.to_string(), Vec::new())).collect(),
        }
    }

    /// Append a record to `lane`, which must be a declared output lane.
    pub fn push(&mut self, lane: &str, record: Record) -> PipelineResult<()> {
        self.lane_mut(lane)?.push(record);
        Ok(())
    }

    pub fn extend(
        &mut self,
        lane: &str,
        records: impl IntoIterator<Item = Record>,
    ) -> PipelineResult<()> {
        self.lane_mut(lane)?.extend(records);
        Ok(())
    }

    /// Names of the lanes this output may write to.
    pub fn lane_names(&self) -> impl Iterator<Item = &str> {
        self.lanes.keys().map(String::as_str)
    }

    pub fn records(&self, lane: &str) -> &[Record] {
        self.lanes.get(lane).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.lanes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lane_mut(&mut self, lane: &str) -> PipelineResult<&mut Vec<Record>> {
        match self.lanes.get_mut(lane) {
            Some(records) => Ok(records),
            None => Err(PipelineError::UndeclaredLane {
                instance: self.instance.clone(),
                lane: lane.to_string(),
            }),
        }
    }
}
