//! End-to-end pipeline runs through the public API

mod common;

use common::builders::{ChainBuilder, StageDef};
use common::stages::{event_log, events, Recording};
use common::{numbered_records, values};
use laneflow::pipeline::nodes::{CollectTarget, FilterProcessor, MapProcessor, VecSource};
use laneflow::{
    Configuration, LaneSet, MetricRegistry, ModuleInfo, PipelineBatch, PipelineBuilder,
    PipelineError,
};
use serde_json::json;

#[test]
fn test_source_processor_target_round() {
    let (pipeline, collected) = ChainBuilder::new(&["A"])
        .records(numbered_records("s", 3))
        .processor(StageDef::new("p", &["A"], &["B"]))
        .target(&["B"])
        .build()
        .unwrap();

    pipeline.init().unwrap();
    let mut batch = PipelineBatch::new();
    pipeline.run_batch(&mut batch).unwrap();
    pipeline.destroy().unwrap();

    assert!(batch.is_empty());
    assert!(batch.is_exhausted());
    assert_eq!(values(&collected.lock().unwrap()), vec![0, 1, 2]);
}

#[test]
fn test_target_on_wrong_lane_fails_to_build() {
    let err = ChainBuilder::new(&["A"])
        .processor(StageDef::new("p", &["A"], &["B"]))
        .target(&["C"])
        .build()
        .unwrap_err();

    match err {
        PipelineError::MissingInputLane { instance, missing } => {
            assert_eq!(instance, "target");
            assert!(missing.contains("C"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unconsumed_lane_fails_to_build() {
    let err = ChainBuilder::new(&["A", "B"])
        .target(&["A"])
        .build()
        .unwrap_err();
    assert!(matches!(err, PipelineError::LeftoverLanes(ref l) if l.contains("B")));
}

#[test]
fn test_processor_writing_its_own_input_fails_to_build() {
    let err = ChainBuilder::new(&["A"])
        .records(numbered_records("s", 3))
        .processor(StageDef::new("p", &["A"], &["A"]))
        .target(&["A"])
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::LaneInUse { ref instance, ref lane } if instance == "p" && lane == "A"
    ));
}

#[test]
fn test_two_producers_on_one_lane_fail_to_build() {
    let err = ChainBuilder::new(&["A", "B"])
        .records(numbered_records("s", 3))
        .processor(StageDef::new("p", &["A"], &["B"]))
        .target(&["B"])
        .build()
        .unwrap_err();
    assert_eq!(err.instance(), Some("p"));
    assert!(matches!(err, PipelineError::LaneInUse { ref lane, .. } if lane == "B"));
}

#[test]
fn test_lane_skips_intermediate_stage() {
    // "B" bypasses the processor and is read by the target directly
    let (pipeline, collected) = ChainBuilder::new(&["A", "B"])
        .records(numbered_records("s", 2))
        .processor(StageDef::new("p", &["A"], &["C"]))
        .target(&["B", "C"])
        .build()
        .unwrap();

    pipeline.init().unwrap();
    let mut batch = PipelineBatch::new();
    pipeline.run_batch(&mut batch).unwrap();

    assert!(batch.is_empty());
    assert_eq!(collected.lock().unwrap().len(), 4);
}

#[test]
fn test_transforming_chain() {
    let target = CollectTarget::new();
    let collected = target.handle();

    let pipeline = PipelineBuilder::new(
        MetricRegistry::new(),
        ModuleInfo::new("numbers"),
        VecSource::new(numbered_records("numbers", 10)),
        LaneSet::from(["raw"]),
    )
    .unwrap()
    .add_processor(
        ModuleInfo::new("evens"),
        FilterProcessor::new(|r| r.value.as_i64().is_some_and(|v| v % 2 == 0)),
        LaneSet::from(["raw"]),
        LaneSet::from(["even"]),
    )
    .unwrap()
    .add_processor(
        ModuleInfo::new("triple"),
        MapProcessor::new(|r| Ok(r.with_value(json!(r.value.as_i64().unwrap_or(0) * 3)))),
        LaneSet::from(["even"]),
        LaneSet::from(["tripled"]),
    )
    .unwrap()
    .add_target(ModuleInfo::new("sink"), target, LaneSet::from(["tripled"]))
    .unwrap()
    .build()
    .unwrap();

    pipeline.init().unwrap();
    pipeline.run_batch(&mut PipelineBatch::new()).unwrap();
    pipeline.destroy().unwrap();

    assert_eq!(values(&collected.lock().unwrap()), vec![0, 6, 12, 18, 24]);
}

#[test]
fn test_configure_drives_batch_size() {
    let (pipeline, collected) = ChainBuilder::new(&["A"])
        .records(numbered_records("s", 5))
        .target(&["A"])
        .build()
        .unwrap();

    let mut conf = Configuration::new();
    conf.set("source.batch_size", 2).set("pipeline.name", "demo");

    pipeline.init().unwrap();
    pipeline.configure(&conf).unwrap();

    let mut rounds = 0;
    loop {
        let mut batch = PipelineBatch::new();
        pipeline.run_batch(&mut batch).unwrap();
        rounds += 1;
        if batch.is_exhausted() {
            break;
        }
    }
    pipeline.destroy().unwrap();

    assert_eq!(rounds, 3);
    assert_eq!(values(&collected.lock().unwrap()), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_invalid_stage_configuration_is_reported() {
    let (pipeline, _) = ChainBuilder::new(&["A"]).target(&["A"]).build().unwrap();
    let mut conf = Configuration::new();
    conf.set("source.batch_size", 0);

    pipeline.init().unwrap();
    let err = pipeline.configure(&conf).unwrap_err();
    assert!(matches!(err, PipelineError::Stage(_)));
    assert!(err.to_string().contains("batch_size"));
}

#[test]
fn test_lifecycle_order() {
    let log = event_log();
    let pipeline = PipelineBuilder::new(
        MetricRegistry::new(),
        ModuleInfo::new("src"),
        Recording::new("src", &log).emitting(2),
        LaneSet::from(["A"]),
    )
    .unwrap()
    .add_processor(
        ModuleInfo::new("mid"),
        Recording::new("mid", &log),
        LaneSet::from(["A"]),
        LaneSet::from(["B"]),
    )
    .unwrap()
    .add_target(
        ModuleInfo::new("dst"),
        Recording::new("dst", &log),
        LaneSet::from(["B"]),
    )
    .unwrap()
    .build()
    .unwrap();

    let mut conf = Configuration::new();
    conf.set("mid.factor", 2).set("mid.mode", "fast").set("dst.path", "/tmp/out");

    pipeline.init().unwrap();
    pipeline.configure(&conf).unwrap();
    pipeline.run_batch(&mut PipelineBatch::new()).unwrap();
    pipeline.destroy().unwrap();
    pipeline.destroy().unwrap();

    assert_eq!(
        events(&log),
        vec![
            "src:init",
            "mid:init",
            "dst:init",
            "src:configure(0)",
            "mid:configure(2)",
            "dst:configure(1)",
            "src:produce",
            "mid:process",
            "dst:write",
            "dst:destroy",
            "mid:destroy",
            "src:destroy",
        ]
    );
}

#[test]
fn test_run_after_destroy_rejected() {
    let (pipeline, _) = ChainBuilder::new(&["A"]).target(&["A"]).build().unwrap();
    pipeline.init().unwrap();
    pipeline.destroy().unwrap();

    let err = pipeline.run_batch(&mut PipelineBatch::new()).unwrap_err();
    assert!(matches!(err, PipelineError::Destroyed));
    assert!(pipeline.is_destroyed());
}

#[test]
fn test_metrics_after_run() {
    let builder = ChainBuilder::new(&["A"])
        .records(numbered_records("s", 4))
        .processor(StageDef::new("p", &["A"], &["B"]))
        .target(&["B"]);
    let metrics = builder.metrics();
    let (pipeline, _) = builder.build().unwrap();

    pipeline.init().unwrap();
    pipeline.run_batch(&mut PipelineBatch::new()).unwrap();

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.counter("source.records.out"), Some(4));
    assert_eq!(snapshot.counter("p.records.in"), Some(4));
    assert_eq!(snapshot.counter("p.records.out"), Some(4));
    assert_eq!(snapshot.counter("target.records.in"), Some(4));
    assert_eq!(snapshot.timer("p.process").map(|t| t.count), Some(1));
}
