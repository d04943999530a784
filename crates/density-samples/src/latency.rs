//! Pipeline latency from GStreamer latency tracer logs.

use std::path::Path;

use anyhow::Result;
use regex::Regex;
use tracing::{debug, warn};

use density_core::LatencyReading;

const TRACER_MARKER: &str = "latency_tracer_pipeline";

/// Extract the `avg=(double)<ms>` value from the last tracer line of a log.
pub fn last_pipeline_latency(content: &str) -> Result<Option<f64>> {
    let avg_re = Regex::new(r"avg=\(double\)([0-9]*\.?[0-9]+)")?;

    let Some(line) = content.lines().rev().find(|l| l.contains(TRACER_MARKER)) else {
        return Ok(None);
    };
    match avg_re.captures(line) {
        Some(caps) => Ok(Some(caps[1].parse::<f64>()?)),
        None => Ok(None),
    }
}

/// Average latency over the given tracer logs.
///
/// Logs that cannot be read or carry no positive reading are skipped and
/// do not count towards the per-stream average.
pub fn average_latency<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Result<LatencyReading> {
    let mut total_ms = 0.0;
    let mut counted = 0u32;

    for path in paths {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable latency log");
                continue;
            }
        };
        let content = String::from_utf8_lossy(&bytes);
        match last_pipeline_latency(&content) {
            Ok(Some(ms)) if ms > 0.0 => {
                debug!(path = %path.display(), latency_ms = ms, "pipeline latency");
                total_ms += ms;
                counted += 1;
            }
            Ok(_) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "unparseable latency line"),
        }
    }

    let per_stream_ms = if counted > 0 {
        total_ms / counted as f64
    } else {
        0.0
    };
    Ok(LatencyReading {
        total_ms,
        per_stream_ms,
    })
}
