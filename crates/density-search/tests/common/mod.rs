//! Synthetic orchestrator for controller and runner tests.
//!
//! Instead of starting containers, `start()` writes one pipeline log per
//! requested worker into the results directory, each holding the
//! throughput returned by the configured function.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use density_orchestrator::{CONTAINER_NAME_KEY, Orchestrator, PIPELINE_COUNT_KEY};

type ThroughputFn = Box<dyn Fn(u32) -> Option<f64> + Send>;

pub struct SyntheticOrchestrator {
    results_dir: PathBuf,
    default_label: String,
    throughput: ThroughputFn,
    vars: HashMap<String, String>,
    fail_start_for: Option<String>,
    /// Worker counts passed to each `start()`.
    pub starts: Vec<u32>,
    /// Labels active at each `stop()`.
    pub stops: Vec<String>,
}

impl SyntheticOrchestrator {
    /// `throughput(n)` is the per-worker value written when `n` workers
    /// run; `None` means the workers never write their logs.
    pub fn new(
        results_dir: &Path,
        label: &str,
        throughput: impl Fn(u32) -> Option<f64> + Send + 'static,
    ) -> Self {
        Self {
            results_dir: results_dir.to_path_buf(),
            default_label: label.to_string(),
            throughput: Box::new(throughput),
            vars: HashMap::new(),
            fail_start_for: None,
            starts: Vec::new(),
            stops: Vec::new(),
        }
    }

    /// Make `start()` fail whenever `label` is the active label.
    pub fn failing_for(mut self, label: &str) -> Self {
        self.fail_start_for = Some(label.to_string());
        self
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    fn label(&self) -> String {
        self.vars
            .get(CONTAINER_NAME_KEY)
            .cloned()
            .unwrap_or_else(|| self.default_label.clone())
    }

    fn remove_logs(&self, label: &str) {
        let suffix = format!("_{label}.log");
        for entry in fs::read_dir(&self.results_dir).unwrap() {
            let path = entry.unwrap().path();
            let name = path.file_name().unwrap().to_str().unwrap().to_string();
            if name.starts_with("pipeline") && name.ends_with(&suffix) {
                fs::remove_file(path).unwrap();
            }
        }
    }
}

#[async_trait]
impl Orchestrator for SyntheticOrchestrator {
    fn set_var(&mut self, key: &str, value: String) {
        self.vars.insert(key.to_string(), value);
    }

    async fn start(&mut self) -> anyhow::Result<()> {
        let label = self.label();
        let count: u32 = self.var(PIPELINE_COUNT_KEY).unwrap().parse()?;
        self.starts.push(count);

        if self.fail_start_for.as_deref() == Some(label.as_str()) {
            anyhow::bail!("compose up failed for {label}");
        }

        self.remove_logs(&label);
        if let Some(fps) = (self.throughput)(count) {
            for id in 0..count {
                let mut lines: Vec<String> = (0..19).map(|_| format!("{fps}")).collect();
                lines.push("na".to_string());
                fs::write(
                    self.results_dir.join(format!("pipeline{id}_{label}.log")),
                    lines.join("\n") + "\n",
                )?;
            }
        }
        Ok(())
    }

    async fn stop(&mut self) -> anyhow::Result<()> {
        self.stops.push(self.label());
        Ok(())
    }
}
