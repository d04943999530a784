pub mod benchmark;
pub mod config;
pub mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use density_core::DensityConfig;

/// Search settings shared by every subcommand.
///
/// Values given here override the ones in `--config`.
#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Path to a density.toml config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory for pipeline logs and results
    #[arg(long, env = "RESULTS_DIR")]
    pub results_dir: Option<PathBuf>,
    /// Target FPS per pipeline. Repeat once per container name.
    #[arg(long = "target-fps")]
    pub target_fps: Vec<f64>,
    /// Container name of the pipelines to measure. Repeat once per target.
    #[arg(long = "container-name")]
    pub container_names: Vec<String>,
    /// Docker compose file. Can be used multiple times.
    #[arg(long = "compose-file")]
    pub compose_files: Vec<PathBuf>,
    /// Seconds to let pipelines settle before reading their FPS
    #[arg(long, env = "INIT_DURATION")]
    pub init_duration: Option<u64>,
    /// Fixed pipeline increment while ramping up
    #[arg(long, env = "PIPELINE_INC", allow_negative_numbers = true)]
    pub increment: Option<i64>,
    /// Platform the pipelines run on (passed as DEVICE)
    #[arg(long = "target-device")]
    pub target_device: Option<String>,
}

impl SearchArgs {
    /// Load `--config` (if any) and apply the flag overrides.
    pub fn into_config(self) -> Result<DensityConfig> {
        let mut config = match &self.config {
            Some(path) => DensityConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => DensityConfig::default(),
        };

        if self.results_dir.is_some() {
            config.results_dir = self.results_dir;
        }
        if !self.target_fps.is_empty() {
            config.targets = self.target_fps;
        }
        if !self.container_names.is_empty() {
            config.labels = self.container_names;
        }
        if !self.compose_files.is_empty() {
            config.compose_files = self.compose_files;
        }
        if let Some(secs) = self.init_duration {
            config.init_duration = secs;
        }
        if self.increment.is_some() {
            config.increment = self.increment;
        }
        if let Some(device) = self.target_device {
            config.device = device;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("density.toml");
        fs::write(
            &path,
            "results_dir = \"/from/file\"\ninit_duration = 60\ntargets = [10.0]\nlabels = [\"file\"]\n",
        )
        .unwrap();

        let args = SearchArgs {
            config: Some(path),
            target_fps: vec![20.0],
            container_names: vec!["cli".to_string()],
            target_device: Some("GPU".to_string()),
            ..Default::default()
        };
        let config = args.into_config().unwrap();

        assert_eq!(config.results_dir, Some(PathBuf::from("/from/file")));
        assert_eq!(config.init_duration, 60);
        assert_eq!(config.targets, vec![20.0]);
        assert_eq!(config.labels, vec!["cli"]);
        assert_eq!(config.device, "GPU");
    }

    #[test]
    fn test_missing_config_file() {
        let args = SearchArgs {
            config: Some(PathBuf::from("/definitely/not/here.toml")),
            ..Default::default()
        };
        let err = args.into_config().unwrap_err();
        assert!(err.to_string().contains("loading"));
    }
}
