//! Test data builders for creating test pipelines

use laneflow::pipeline::nodes::{CollectTarget, Collected, MapProcessor, VecSource};
use laneflow::{LaneSet, MetricRegistry, ModuleInfo, Pipeline, PipelineBuilder, Record};

/// Declarative description of one stage for [`ChainBuilder`]
#[derive(Debug, Clone)]
pub struct StageDef {
    pub name: String,
    pub input: Vec<String>,
    pub output: Vec<String>,
}

impl StageDef {
    pub fn new(name: &str, input: &[&str], output: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            input: input.iter().map(|s| s.to_string()).collect(),
            output: output.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Builder wiring a `VecSource → passthrough processors → CollectTarget` chain
pub struct ChainBuilder {
    records: Vec<Record>,
    source_output: Vec<String>,
    processors: Vec<StageDef>,
    target_input: Vec<String>,
    metrics: MetricRegistry,
}

impl ChainBuilder {
    pub fn new(source_output: &[&str]) -> Self {
        Self {
            records: Vec::new(),
            source_output: source_output.iter().map(|s| s.to_string()).collect(),
            processors: Vec::new(),
            target_input: Vec::new(),
            metrics: MetricRegistry::new(),
        }
    }

    pub fn records(mut self, records: Vec<Record>) -> Self {
        self.records = records;
        self
    }

    pub fn processor(mut self, def: StageDef) -> Self {
        self.processors.push(def);
        self
    }

    pub fn target(mut self, input: &[&str]) -> Self {
        self.target_input = input.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn metrics(&self) -> MetricRegistry {
        self.metrics.clone()
    }

    /// Build the pipeline; returns the target's collected buffer alongside.
    pub fn build(self) -> laneflow::PipelineResult<(Pipeline, Collected)> {
        let mut builder = PipelineBuilder::new(
            self.metrics,
            ModuleInfo::new("source"),
            VecSource::new(self.records),
            self.source_output.iter().cloned().collect::<LaneSet>(),
        )?;
        for def in self.processors {
            builder = builder.add_processor(
                ModuleInfo::new(def.name),
                MapProcessor::passthrough(),
                def.input.into_iter().collect(),
                def.output.into_iter().collect(),
            )?;
        }
        let target = CollectTarget::new();
        let collected = target.handle();
        let pipeline = builder
            .add_target(
                ModuleInfo::new("target"),
                target,
                self.target_input.into_iter().collect(),
            )?
            .build()?;
        Ok((pipeline, collected))
    }
}
