//! Log artifact discovery in the results directory.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// File name prefix of per-worker throughput logs.
pub const PIPELINE_PREFIX: &str = "pipeline";
/// File name prefix of latency tracer logs.
pub const LATENCY_PREFIX: &str = "gst-launch";

/// A log file found in the results directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogArtifact {
    pub path: PathBuf,
    pub modified: SystemTime,
    pub len: u64,
}

/// Glob pattern for `<dir>/<prefix>*_<label>*.log`.
///
/// Glob metacharacters in `dir` and `label` are matched literally. An empty
/// label matches every `<prefix>*_*.log` file.
pub fn log_pattern(dir: &Path, prefix: &str, label: &str) -> String {
    let dir = glob::Pattern::escape(&dir.to_string_lossy());
    let file = format!("{prefix}*_{}*.log", glob::Pattern::escape(label));
    Path::new(&dir).join(file).to_string_lossy().into_owned()
}

/// List all files in `dir` matching `<prefix>*_<label>*.log`.
///
/// A missing directory yields an empty list.
pub fn list_matching(dir: &Path, prefix: &str, label: &str) -> io::Result<Vec<LogArtifact>> {
    let pattern = log_pattern(dir, prefix, label);
    let entries = glob::glob(&pattern).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid log pattern `{pattern}`: {e}"),
        )
    })?;

    let mut found = Vec::new();
    for entry in entries {
        let path = entry.map_err(glob::GlobError::into_error)?;
        let meta = match std::fs::metadata(&path) {
            Ok(meta) => meta,
            // Removed between listing and stat.
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        if !meta.is_file() {
            continue;
        }
        found.push(LogArtifact {
            path,
            modified: meta.modified()?,
            len: meta.len(),
        });
    }
    Ok(found)
}

/// Keep the `count` most recently modified artifacts.
///
/// Equal modification times are ordered by path so repeated reads agree.
/// Fewer artifacts than `count` returns all of them.
pub fn latest(mut artifacts: Vec<LogArtifact>, count: usize) -> Vec<LogArtifact> {
    artifacts.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| a.path.cmp(&b.path))
    });
    artifacts.truncate(count);
    artifacts
}

/// Delete every `pipeline*_*.log` in `dir`. Returns the number removed.
pub fn clean_up_pipeline_logs(dir: &Path) -> io::Result<usize> {
    let stale = list_matching(dir, PIPELINE_PREFIX, "")?;
    for artifact in &stale {
        std::fs::remove_file(&artifact.path)?;
    }
    Ok(stale.len())
}
