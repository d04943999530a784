//! `stream-density benchmark` — run a fixed number of pipelines for a set time.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use density_core::config::DEFAULT_DEVICE;
use density_orchestrator::{
    ComposeOrchestrator, DEVICE_KEY, LOG_DIR_KEY, Orchestrator, RESULTS_DIR_KEY,
    RETAIL_USE_CASE_ROOT_KEY,
};

#[derive(Args, Debug)]
pub struct BenchmarkArgs {
    /// Number of pipelines
    #[arg(long, default_value_t = 1)]
    pub pipelines: u32,
    /// Seconds to wait for the pipelines to initialize
    #[arg(long, default_value_t = 5)]
    pub init_duration: u64,
    /// Seconds to keep the workload running after initialization
    #[arg(long, default_value_t = 30)]
    pub duration: u64,
    /// Platform the pipelines run on (passed as DEVICE)
    #[arg(long = "target-device", default_value = DEFAULT_DEVICE)]
    pub target_device: String,
    /// Docker compose file. Can be used multiple times.
    #[arg(long = "compose-file")]
    pub compose_files: Vec<PathBuf>,
    /// Directory for logs and results. Created if absent.
    #[arg(long, env = "RESULTS_DIR", default_value = "results")]
    pub results_dir: PathBuf,
    /// Root of the retail-use-cases checkout
    #[arg(long, default_value = "../../retail-use-cases")]
    pub retail_use_case_root: PathBuf,
}

pub async fn run(args: BenchmarkArgs) -> Result<()> {
    let compose_files = args
        .compose_files
        .iter()
        .map(|f| absolute(f))
        .collect::<Result<Vec<_>>>()?;
    let mut orchestrator = ComposeOrchestrator::new(compose_files);
    benchmark(&args, &mut orchestrator).await
}

/// Bring `args.pipelines` workers up, wait init plus duration, tear them down.
pub async fn benchmark(args: &BenchmarkArgs, orchestrator: &mut dyn Orchestrator) -> Result<()> {
    let results_dir = absolute(&args.results_dir)?;
    std::fs::create_dir_all(&results_dir)
        .with_context(|| format!("creating results dir {}", results_dir.display()))?;

    let results = results_dir.display().to_string();
    orchestrator.set_var(LOG_DIR_KEY, results.clone());
    orchestrator.set_var(RESULTS_DIR_KEY, results);
    orchestrator.set_var(DEVICE_KEY, args.target_device.clone());
    orchestrator.set_var(
        RETAIL_USE_CASE_ROOT_KEY,
        absolute(&args.retail_use_case_root)?.display().to_string(),
    );
    if args.pipelines > 0 {
        orchestrator.resize(args.pipelines);
    }

    info!(
        pipelines = args.pipelines,
        device = %args.target_device,
        results_dir = %results_dir.display(),
        "starting workload(s)"
    );
    orchestrator.start().await?;

    info!(secs = args.init_duration, "waiting for init duration to complete");
    tokio::time::sleep(Duration::from_secs(args.init_duration)).await;

    info!(secs = args.duration, "waiting for workload to finish");
    tokio::time::sleep(Duration::from_secs(args.duration)).await;

    orchestrator.stop().await?;
    info!("workloads finished");
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("resolving {}", path.display()))
}
