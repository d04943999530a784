//! density.toml configuration parser.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DensityError, DensityResult};

/// Target throughput used when no target is given.
pub const DEFAULT_TARGET_FPS: f64 = 14.95;
/// Ramp-up jump used when the throughput ratio floors to 1.
pub const DEFAULT_GUESS_INCREMENT: u32 = 5;
/// Availability gate attempts per iteration.
pub const DEFAULT_GATE_RETRIES: u32 = 50;
/// Trailing lines read from each pipeline log.
pub const DEFAULT_WINDOW_SIZE: usize = 20;
/// Platform the pipelines run on when none is given.
pub const DEFAULT_DEVICE: &str = "CPU";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityConfig {
    /// Directory the workers write their pipeline logs into.
    pub results_dir: Option<PathBuf>,
    /// Seconds to let workers warm up before sampling.
    #[serde(default = "default_init_duration")]
    pub init_duration: u64,
    /// Fixed ramp-up increment. `None` uses the throughput-ratio heuristic.
    pub increment: Option<i64>,
    #[serde(default = "default_guess_increment")]
    pub guess_increment: u32,
    #[serde(default = "default_gate_retries")]
    pub gate_retries: u32,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Seconds to wait after tearing down one label before the next.
    #[serde(default = "default_teardown_settle")]
    pub teardown_settle: u64,
    /// Target device passed to the pipelines as `DEVICE`.
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default)]
    pub compose_files: Vec<PathBuf>,
    #[serde(default)]
    pub targets: Vec<f64>,
    #[serde(default)]
    pub labels: Vec<String>,
}

fn default_init_duration() -> u64 {
    120
}

fn default_guess_increment() -> u32 {
    DEFAULT_GUESS_INCREMENT
}

fn default_gate_retries() -> u32 {
    DEFAULT_GATE_RETRIES
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_teardown_settle() -> u64 {
    10
}

fn default_device() -> String {
    DEFAULT_DEVICE.to_string()
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            results_dir: None,
            init_duration: default_init_duration(),
            increment: None,
            guess_increment: DEFAULT_GUESS_INCREMENT,
            gate_retries: DEFAULT_GATE_RETRIES,
            window_size: DEFAULT_WINDOW_SIZE,
            teardown_settle: default_teardown_settle(),
            device: default_device(),
            compose_files: Vec::new(),
            targets: Vec::new(),
            labels: Vec::new(),
        }
    }
}

impl DensityConfig {
    pub fn from_file(path: &Path) -> DensityResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> DensityResult<Self> {
        toml::from_str(content).map_err(|e| DensityError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> DensityResult<String> {
        toml::to_string_pretty(self).map_err(|e| DensityError::Config(e.to_string()))
    }

    /// Check the config and fill in defaults that depend on other fields.
    ///
    /// An empty target list becomes `[DEFAULT_TARGET_FPS]`.
    pub fn validate(&mut self) -> DensityResult<()> {
        if self.results_dir.is_none() {
            return Err(DensityError::argument("missing RESULTS_DIR"));
        }

        if self.targets.is_empty() {
            self.targets.push(DEFAULT_TARGET_FPS);
        } else if self.targets.iter().any(|t| !(*t > 0.0)) {
            return Err(DensityError::argument(
                "stream density target fps should be greater than 0",
            ));
        }

        if let Some(inc) = self.increment
            && inc <= 0
        {
            return Err(DensityError::argument(
                "stream density increments should be greater than 0",
            ));
        }

        if self.guess_increment == 0 {
            return Err(DensityError::argument(
                "guess increment should be greater than 0",
            ));
        }

        if self.window_size == 0 {
            return Err(DensityError::argument(
                "sample window size should be greater than 0",
            ));
        }

        Ok(())
    }

    /// The results directory. Call after `validate()`.
    pub fn results_dir(&self) -> DensityResult<&Path> {
        self.results_dir
            .as_deref()
            .ok_or_else(|| DensityError::argument("missing RESULTS_DIR"))
    }

    pub fn fixed_increment(&self) -> Option<u32> {
        self.increment.and_then(|inc| u32::try_from(inc).ok())
    }

    pub fn init_duration(&self) -> Duration {
        Duration::from_secs(self.init_duration)
    }

    pub fn teardown_settle(&self) -> Duration {
        Duration::from_secs(self.teardown_settle)
    }
}
