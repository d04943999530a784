//! Run log — the per-batch diagnostic sink.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;

/// File name of the run log inside the results directory.
pub const RUN_LOG_FILE: &str = "stream_density.log";

pub fn run_log_path(results_dir: &Path) -> PathBuf {
    results_dir.join(RUN_LOG_FILE)
}

/// Open `<results_dir>/stream_density.log` for appending.
pub fn open_run_log(results_dir: &Path) -> io::Result<Mutex<File>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(run_log_path(results_dir))?;
    Ok(Mutex::new(file))
}

/// A dispatcher that writes every event at DEBUG and above to `writer`.
///
/// Scoped to a future with `WithSubscriber::with_subscriber`, so nothing
/// process-global is replaced.
pub fn run_log_dispatch<W>(writer: W) -> Dispatch
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    Dispatch::new(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_log_appends() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(run_log_path(dir.path()), "previous batch\n").unwrap();

        let log = open_run_log(dir.path()).unwrap();
        tracing::dispatcher::with_default(&run_log_dispatch(log), || {
            tracing::info!(pipelines = 3, "hello run log");
        });

        let content = std::fs::read_to_string(run_log_path(dir.path())).unwrap();
        assert!(content.starts_with("previous batch\n"));
        assert!(content.contains("hello run log"));
        assert!(content.contains("pipelines=3"));
    }
}
