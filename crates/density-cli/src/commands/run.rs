//! `stream-density run` — run the search and report the outcomes.

use anyhow::{Context, Result, bail};
use tracing::info;

use density_core::{SearchOutcome, WorkerGroupLabel};
use density_orchestrator::ComposeOrchestrator;
use density_search::{DensityRunner, open_run_log, runlog::run_log_path};

use super::SearchArgs;

pub async fn run(args: SearchArgs, format: &str) -> Result<()> {
    if format != "text" && format != "json" {
        bail!("Unsupported output format: {format} (expected text or json)");
    }

    let mut config = args.into_config()?;
    config.validate()?;

    let results_dir = config.results_dir()?.to_path_buf();
    std::fs::create_dir_all(&results_dir)
        .with_context(|| format!("creating results dir {}", results_dir.display()))?;

    let labels: Vec<WorkerGroupLabel> = config
        .labels
        .iter()
        .map(|l| WorkerGroupLabel::from(l.as_str()))
        .collect();

    let orchestrator = ComposeOrchestrator::new(config.compose_files.clone());
    let mut runner = DensityRunner::from_config(&config, orchestrator)?;

    let run_log = open_run_log(&results_dir)?;
    info!(
        run_log = %run_log_path(&results_dir).display(),
        pairs = labels.len(),
        "stream density starting"
    );

    let outcomes = runner.run_logged(&config.targets, &labels, run_log).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&outcomes)?),
        _ => print!("{}", render_text(&outcomes)),
    }
    Ok(())
}

fn render_text(outcomes: &[SearchOutcome]) -> String {
    let mut out = String::new();
    for o in outcomes {
        let verdict = if o.target_met {
            "target met"
        } else {
            "target not met"
        };
        out.push_str(&format!(
            "{} {}: {} pipeline(s) at target {} fps ({})\n",
            o.symbol(),
            o.label,
            o.max_worker_count,
            o.target_throughput,
            verdict
        ));
    }
    out
}
