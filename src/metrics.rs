//! Shared metrics registry handed to every pipe.
//!
//! The registry is a cheap-to-clone handle over named counters and timers.
//! Pipes record their own per-stage figures under `<instance>.<metric>`; stages
//! may register additional metrics through the handle in their
//! [`StageContext`](crate::pipeline::StageContext). The pipeline never reads
//! metrics back.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Monotonic counter.
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicU64>);

impl Counter {
    #[inline]
    pub fn inc(&self) {
        self.add(1);
    }

    #[inline]
    pub fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
struct TimerInner {
    count: AtomicU64,
    total_us: AtomicU64,
    max_us: AtomicU64,
}

/// Accumulates call count, total and max duration.
#[derive(Debug, Clone, Default)]
pub struct Timer(Arc<TimerInner>);

impl Timer {
    pub fn record(&self, elapsed: Duration) {
        let us = elapsed.as_micros() as u64;
        self.0.count.fetch_add(1, Ordering::Relaxed);
        self.0.total_us.fetch_add(us, Ordering::Relaxed);
        self.0.max_us.fetch_max(us, Ordering::Relaxed);
    }

    /// Start timing; the elapsed time is recorded when the guard drops.
    pub fn start(&self) -> TimerGuard<'_> {
        TimerGuard {
            timer: self,
            start: Instant::now(),
        }
    }

    pub fn count(&self) -> u64 {
        self.0.count.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> Duration {
        Duration::from_micros(self.0.total_us.load(Ordering::Relaxed))
    }

    pub fn max(&self) -> Duration {
        Duration::from_micros(self.0.max_us.load(Ordering::Relaxed))
    }
}

/// Records into its [`Timer`] on drop, including on early `?` returns.
pub struct TimerGuard<'a> {
    timer: &'a Timer,
    start: Instant,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.timer.record(self.start.elapsed());
    }
}

#[derive(Debug, Default)]
struct Registry {
    counters: BTreeMap<String, Counter>,
    timers: BTreeMap<String, Timer>,
}

/// Cloneable handle to a set of named metrics.
#[derive(Debug, Clone, Default)]
pub struct MetricRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the counter registered under `name`.
    pub fn counter(&self, name: &str) -> Counter {
        let mut registry = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        registry.counters.entry(name.to_string()).or_default().clone()
    }

    /// Get or create the timer registered under `name`.
    pub fn timer(&self, name: &str) -> Timer {
        let mut registry = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        registry.timers.entry(name.to_string()).or_default().clone()
    }

    /// Point-in-time copy of every registered metric.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let registry = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        MetricsSnapshot {
            taken_at: Utc::now(),
            counters: registry
                .counters
                .iter()
                .map(|(name, c)| (name.clone(), c.get()))
                .collect(),
            timers: registry
                .timers
                .iter()
                .map(|(name, t)| {
                    (
                        name.clone(),
                        TimerSnapshot {
                            count: t.count(),
                            total: t.total(),
                            max: t.max(),
                        },
                    )
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimerSnapshot {
    pub count: u64,
    #[serde(serialize_with = "serialize_duration")]
    pub total: Duration,
    #[serde(serialize_with = "serialize_duration")]
    pub max: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub taken_at: DateTime<Utc>,
    pub counters: BTreeMap<String, u64>,
    pub timers: BTreeMap<String, TimerSnapshot>,
}

impl MetricsSnapshot {
    pub fn counter(&self, name: &str) -> Option<u64> {
        self.counters.get(name).copied()
    }

    pub fn timer(&self, name: &str) -> Option<&TimerSnapshot> {
        self.timers.get(name)
    }
}
