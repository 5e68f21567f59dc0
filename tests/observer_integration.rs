//! Observers see stage output without altering the data flow

mod common;

use common::{numbered_records, values};
use laneflow::pipeline::nodes::{CollectTarget, FnObserver, MapProcessor, VecSource};
use laneflow::pipeline::{ObservedLanes, PipeKind};
use laneflow::{LaneSet, MetricRegistry, ModuleInfo, PipelineBatch, PipelineBuilder, Record};
use serde_json::json;
use std::sync::{Arc, Mutex};

type Seen = Arc<Mutex<Vec<(String, String, usize)>>>;

fn recording_observer(seen: &Seen) -> impl laneflow::pipeline::Observer + 'static {
    let seen = Arc::clone(seen);
    FnObserver::new(move |stage: &ModuleInfo, lanes: &ObservedLanes<'_>| {
        let mut seen = seen.lock().unwrap();
        for (lane, records) in lanes {
            seen.push((
                stage.instance_name().to_string(),
                lane.to_string(),
                records.len(),
            ));
        }
        Ok(())
    })
}

fn double() -> MapProcessor {
    MapProcessor::new(|r| Ok(r.with_value(json!(r.value.as_i64().unwrap_or(0) * 2))))
}

fn run(observed: bool, seen: &Seen) -> Vec<Record> {
    let metrics = MetricRegistry::new();
    let source = VecSource::new(numbered_records("s", 5));
    let target = CollectTarget::new();
    let collected = target.handle();

    let builder = if observed {
        PipelineBuilder::with_observer(
            metrics,
            ModuleInfo::new("s"),
            source,
            LaneSet::from(["A"]),
            recording_observer(seen),
        )
        .unwrap()
        .add_processor_with_observer(
            ModuleInfo::new("p"),
            double(),
            LaneSet::from(["A"]),
            LaneSet::from(["B"]),
            recording_observer(seen),
        )
        .unwrap()
    } else {
        PipelineBuilder::new(metrics, ModuleInfo::new("s"), source, LaneSet::from(["A"]))
            .unwrap()
            .add_processor(
                ModuleInfo::new("p"),
                double(),
                LaneSet::from(["A"]),
                LaneSet::from(["B"]),
            )
            .unwrap()
    };

    let pipeline = builder
        .add_target(ModuleInfo::new("t"), target, LaneSet::from(["B"]))
        .unwrap()
        .build()
        .unwrap();

    pipeline.init().unwrap();
    let mut batch = PipelineBatch::new();
    pipeline.run_batch(&mut batch).unwrap();
    pipeline.destroy().unwrap();
    assert!(batch.is_empty());

    let records = collected.lock().unwrap().clone();
    records
}

#[test]
fn test_observer_does_not_change_output() {
    let seen = Seen::default();
    let plain = run(false, &seen);
    assert!(seen.lock().unwrap().is_empty());

    let observed = run(true, &seen);
    assert_eq!(values(&plain), values(&observed));
    assert_eq!(values(&observed), vec![0, 2, 4, 6, 8]);
}

#[test]
fn test_observer_sees_watched_stage_output() {
    let seen = Seen::default();
    run(true, &seen);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ("s".to_string(), "A".to_string(), 5),
            ("p".to_string(), "B".to_string(), 5),
        ]
    );
}

#[test]
fn test_observer_pipes_are_listed_but_not_stages() {
    let seen = Seen::default();
    let builder = PipelineBuilder::with_observer(
        MetricRegistry::new(),
        ModuleInfo::new("s"),
        VecSource::new(Vec::new()),
        LaneSet::from(["A"]),
        recording_observer(&seen),
    )
    .unwrap();
    assert_eq!(builder.len(), 2);

    let pipeline = builder
        .add_target(ModuleInfo::new("t"), CollectTarget::new(), LaneSet::from(["A"]))
        .unwrap()
        .build()
        .unwrap();

    let names: Vec<&str> = pipeline.stages().iter().map(|m| m.instance_name()).collect();
    assert_eq!(names, vec!["s", "t"]);
    assert_eq!(PipeKind::Observer.to_string(), "observer");
}

#[test]
fn test_observer_error_aborts_batch() {
    let target = CollectTarget::new();
    let collected = target.handle();
    let pipeline = PipelineBuilder::with_observer(
        MetricRegistry::new(),
        ModuleInfo::new("s"),
        VecSource::new(numbered_records("s", 1)),
        LaneSet::from(["A"]),
        FnObserver::new(|_: &ModuleInfo, _: &ObservedLanes<'_>| {
            Err(anyhow::anyhow!("observer offline"))
        }),
    )
    .unwrap()
    .add_target(ModuleInfo::new("t"), target, LaneSet::from(["A"]))
    .unwrap()
    .build()
    .unwrap();

    pipeline.init().unwrap();
    let err = pipeline.run_batch(&mut PipelineBatch::new()).unwrap_err();
    assert_eq!(err.to_string(), "observer offline");
    assert!(collected.lock().unwrap().is_empty());
}
