//! Multi-target runner — one density search per (target, label) pair.
//!
//! Pairs run strictly one after another so a still-terminating previous
//! run cannot skew the next measurement. The orchestrator is torn down
//! after every pair, whether the search succeeded or not. The first
//! failing pair aborts the batch.

use std::time::Duration;

use tracing::instrument::WithSubscriber;
use tracing::{debug, error, info, warn};
use tracing_subscriber::fmt::MakeWriter;

use density_core::{DensityConfig, DensityError, DensityResult, SearchOutcome, WorkerGroupLabel};
use density_orchestrator::{
    CONTAINER_NAME_KEY, DEVICE_KEY, INIT_DURATION_KEY, LOG_DIR_KEY, Orchestrator,
    PIPELINE_INC_KEY, RESULTS_DIR_KEY, TARGET_FPS_KEY,
};
use density_samples::SampleStore;

use crate::controller::{DensityController, SearchSettings};
use crate::runlog::run_log_dispatch;

/// Default wait between tearing down one label and starting the next.
pub const DEFAULT_TEARDOWN_SETTLE: Duration = Duration::from_secs(10);

pub struct DensityRunner<O: Orchestrator> {
    orchestrator: O,
    controller: DensityController,
    teardown_settle: Duration,
}

impl<O: Orchestrator> DensityRunner<O> {
    pub fn new(orchestrator: O, controller: DensityController) -> Self {
        Self {
            orchestrator,
            controller,
            teardown_settle: DEFAULT_TEARDOWN_SETTLE,
        }
    }

    /// Build a runner from a validated config.
    ///
    /// Batch-wide variables (`RESULTS_DIR`, `log_dir`, `DEVICE`,
    /// `INIT_DURATION`, `PIPELINE_INC`) are handed to the orchestrator here.
    pub fn from_config(config: &DensityConfig, mut orchestrator: O) -> DensityResult<Self> {
        let results_dir = config.results_dir()?;
        let store = SampleStore::new(results_dir, config.window_size);
        let controller = DensityController::new(store, SearchSettings::from_config(config));

        orchestrator.set_var(RESULTS_DIR_KEY, results_dir.display().to_string());
        orchestrator.set_var(LOG_DIR_KEY, results_dir.display().to_string());
        orchestrator.set_var(DEVICE_KEY, config.device.clone());
        orchestrator.set_var(INIT_DURATION_KEY, config.init_duration.to_string());
        if let Some(inc) = config.fixed_increment() {
            orchestrator.set_var(PIPELINE_INC_KEY, inc.to_string());
        }

        Ok(Self::new(orchestrator, controller).with_teardown_settle(config.teardown_settle()))
    }

    pub fn with_teardown_settle(mut self, settle: Duration) -> Self {
        self.teardown_settle = settle;
        self
    }

    pub fn orchestrator(&self) -> &O {
        &self.orchestrator
    }

    pub fn into_orchestrator(self) -> O {
        self.orchestrator
    }

    /// Run the batch with all diagnostics written to `run_log`.
    pub async fn run_logged<W>(
        &mut self,
        targets: &[f64],
        labels: &[WorkerGroupLabel],
        run_log: W,
    ) -> DensityResult<Vec<SearchOutcome>>
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        self.run(targets, labels)
            .with_subscriber(run_log_dispatch(run_log))
            .await
    }

    /// Run one search per `(targets[i], labels[i])`, in order.
    pub async fn run(
        &mut self,
        targets: &[f64],
        labels: &[WorkerGroupLabel],
    ) -> DensityResult<Vec<SearchOutcome>> {
        validate_pairs(targets, labels)?;

        let mut outcomes = Vec::with_capacity(targets.len());
        for (&target, label) in targets.iter().zip(labels) {
            debug!(target_fps = target, %label, "running density search");
            self.orchestrator.set_var(TARGET_FPS_KEY, target.to_string());
            self.orchestrator.set_var(CONTAINER_NAME_KEY, label.to_string());

            let searched = self
                .controller
                .search(&mut self.orchestrator, target, label)
                .await;

            let teardown = self.orchestrator.stop().await;
            tokio::time::sleep(self.teardown_settle).await;

            let outcome = match searched {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(target_fps = target, %label, error = %e, "density search failed");
                    if let Err(te) = teardown {
                        warn!(%label, error = %te, "teardown after failed search also failed");
                    }
                    return Err(e);
                }
            };
            teardown?;

            info!(
                target_fps = target,
                %label,
                max_pipelines = outcome.max_worker_count,
                target_met = outcome.target_met,
                "density search done"
            );
            outcomes.push(outcome);
        }

        info!(runs = outcomes.len(), "stream density done");
        Ok(outcomes)
    }
}

/// Targets and labels must pair up 1:1 and every target must be positive.
pub fn validate_pairs(targets: &[f64], labels: &[WorkerGroupLabel]) -> DensityResult<()> {
    if targets.len() != labels.len() {
        return Err(DensityError::argument(format!(
            "got {} target fps values but {} labels",
            targets.len(),
            labels.len()
        )));
    }
    if targets.iter().any(|t| !(*t > 0.0)) {
        return Err(DensityError::argument(
            "stream density target fps should be greater than 0",
        ));
    }
    Ok(())
}
