//! Shared types used across the stream density crates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies the subset of workers that belong to one search run.
///
/// Log artifacts are selected by the filename pattern
/// `pipeline<id>_<label>.log`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerGroupLabel(String);

impl WorkerGroupLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerGroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkerGroupLabel {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for WorkerGroupLabel {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Aggregated throughput for one iteration of the search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationResult {
    /// Nominal worker count the iteration ran with.
    pub worker_count: u32,
    /// Sum of per-worker average throughput.
    pub total_throughput: f64,
    /// `total_throughput / worker_count`.
    pub per_worker_throughput: f64,
}

/// Terminal result of one search for a (target, label) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub target_throughput: f64,
    pub label: WorkerGroupLabel,
    pub max_worker_count: u32,
    pub target_met: bool,
}

impl SearchOutcome {
    pub fn symbol(&self) -> &'static str {
        if self.target_met { "✅" } else { "❌" }
    }
}

/// Pipeline latency averaged over the latest latency tracer logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyReading {
    pub total_ms: f64,
    pub per_stream_ms: f64,
}
