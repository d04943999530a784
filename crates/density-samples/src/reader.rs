//! Sample store reader — trailing throughput windows per worker.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};

use density_core::LatencyReading;

use crate::artifacts::{self, LATENCY_PREFIX, PIPELINE_PREFIX};
use crate::latency;

/// Marker written by workers when no measurement is available.
pub const SENTINEL: &str = "na";

/// The numeric samples from the trailing lines of one worker's log.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleWindow {
    pub path: PathBuf,
    pub samples: Vec<f64>,
}

impl SampleWindow {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Mean of the samples, or `None` for an empty window.
    pub fn average(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }
}

/// Read-only view of the pipeline logs in a results directory.
#[derive(Debug, Clone)]
pub struct SampleStore {
    results_dir: PathBuf,
    window_size: usize,
}

impl SampleStore {
    pub fn new(results_dir: impl Into<PathBuf>, window_size: usize) -> Self {
        Self {
            results_dir: results_dir.into(),
            window_size,
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Read the sample windows of the `worker_count` most recently
    /// modified logs for `label`.
    ///
    /// Fewer logs than requested is not an error; all available are read.
    pub fn read_windows(&self, label: &str, worker_count: u32) -> io::Result<Vec<SampleWindow>> {
        let matching = artifacts::list_matching(&self.results_dir, PIPELINE_PREFIX, label)?;
        debug!(label, matching = matching.len(), "pipeline logs found");

        let selected = artifacts::latest(matching, worker_count as usize);
        if selected.len() < worker_count as usize {
            warn!(
                label,
                expected = worker_count,
                found = selected.len(),
                "fewer pipeline logs than workers"
            );
        }

        let mut windows = Vec::with_capacity(selected.len());
        for artifact in selected {
            let content = std::fs::read(&artifact.path)?;
            let content = String::from_utf8_lossy(&content);
            let samples = parse_window(&artifact.path, &content, self.window_size);
            if samples.is_empty() {
                warn!(path = %artifact.path.display(), "no throughput samples in window");
            }
            windows.push(SampleWindow {
                path: artifact.path,
                samples,
            });
        }
        Ok(windows)
    }

    /// Number of non-empty pipeline logs for `label`.
    pub fn count_ready(&self, label: &str) -> io::Result<u32> {
        let matching = artifacts::list_matching(&self.results_dir, PIPELINE_PREFIX, label)?;
        Ok(matching.iter().filter(|a| a.len > 0).count() as u32)
    }

    /// Average pipeline latency across the `worker_count` latest tracer logs.
    pub fn read_latency(&self, label: &str, worker_count: u32) -> anyhow::Result<LatencyReading> {
        let matching = artifacts::list_matching(&self.results_dir, LATENCY_PREFIX, label)
            .with_context(|| format!("listing latency logs in {}", self.results_dir.display()))?;
        let selected = artifacts::latest(matching, worker_count as usize);
        latency::average_latency(selected.iter().map(|a| a.path.as_path()))
    }

    /// Delete stale `pipeline*_*.log` files before a run starts.
    pub fn clean_up(&self) -> io::Result<usize> {
        artifacts::clean_up_pipeline_logs(&self.results_dir)
    }
}

/// Parse the trailing `window_size` lines of a log into throughput samples.
///
/// Sentinel and blank lines are dropped. Other lines that are not a finite
/// number (including `inf`) are dropped with a warning.
pub fn parse_window(path: &Path, content: &str, window_size: usize) -> Vec<f64> {
    let mut tail: Vec<&str> = content.lines().rev().take(window_size).collect();
    tail.reverse();

    tail.into_iter()
        .filter(|line| !line.contains(SENTINEL))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match line.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                warn!(path = %path.display(), line, "skipping non-numeric sample");
                None
            }
        })
        .collect()
}
