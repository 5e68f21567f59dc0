//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod stages;

use laneflow::Record;
use serde_json::json;

/// `n` records with integer payloads `0..n`
pub fn numbered_records(source: &str, n: i64) -> Vec<Record> {
    (0..n).map(|i| Record::new(source, json!(i))).collect()
}

/// Integer payloads of `records`, in order
pub fn values(records: &[Record]) -> Vec<i64> {
    records.iter().filter_map(|r| r.value.as_i64()).collect()
}
