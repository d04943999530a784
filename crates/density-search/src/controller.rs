//! Density search controller — drives one (target, label) search.
//!
//! Each iteration resizes the worker pool, waits for the workers to warm
//! up and start logging, aggregates their throughput, and hands the
//! per-worker figure to [`SearchState`]. Strictly sequential: one worker
//! count is measured at a time.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use density_core::{
    DensityConfig, DensityError, DensityResult, SearchOutcome, WorkerGroupLabel,
};
use density_orchestrator::Orchestrator;
use density_samples::{AvailabilityGate, SampleStore, aggregate};

use crate::state::{IncrementPolicy, Phase, SearchState, Transition};

/// Tunables for a single search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSettings {
    /// Warm-up wait after each resize before sampling.
    pub init_duration: Duration,
    pub policy: IncrementPolicy,
    /// Availability gate attempts per iteration.
    pub gate_retries: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            init_duration: Duration::from_secs(120),
            policy: IncrementPolicy::default(),
            gate_retries: density_core::config::DEFAULT_GATE_RETRIES,
        }
    }
}

impl SearchSettings {
    pub fn from_config(config: &DensityConfig) -> Self {
        Self {
            init_duration: config.init_duration(),
            policy: IncrementPolicy {
                fixed: config.fixed_increment(),
                guess: config.guess_increment,
            },
            gate_retries: config.gate_retries,
        }
    }
}

pub struct DensityController {
    store: SampleStore,
    gate: AvailabilityGate,
    settings: SearchSettings,
}

impl DensityController {
    pub fn new(store: SampleStore, settings: SearchSettings) -> Self {
        let gate = AvailabilityGate::new(store.clone());
        Self {
            store,
            gate,
            settings,
        }
    }

    /// Replace the availability gate (for testing).
    pub fn with_gate(mut self, gate: AvailabilityGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Find the largest worker count whose per-worker throughput meets
    /// `target`.
    ///
    /// A non-positive target or a zero increment is rejected before the
    /// orchestrator is touched. Stale pipeline logs are deleted first. If the logs for a worker
    /// count never show up, the search stops and reports the previous
    /// count as not meeting the target. Orchestrator and filesystem
    /// errors propagate.
    pub async fn search(
        &self,
        orchestrator: &mut dyn Orchestrator,
        target: f64,
        label: &WorkerGroupLabel,
    ) -> DensityResult<SearchOutcome> {
        if !(target > 0.0) {
            return Err(DensityError::argument(
                "stream density target fps should be greater than 0",
            ));
        }
        if self.settings.policy.fixed == Some(0) {
            return Err(DensityError::argument(
                "stream density increments should be greater than 0",
            ));
        }
        if self.settings.policy.guess == 0 {
            return Err(DensityError::argument(
                "guess increment should be greater than 0",
            ));
        }

        let removed = self.store.clean_up()?;
        if removed == 0 {
            debug!("no match files to clean up");
        } else {
            debug!(removed, "cleaned up stale pipeline logs");
        }

        info!(
            target_fps = target,
            %label,
            init_duration_secs = self.settings.init_duration.as_secs(),
            "stream density search starting"
        );

        let mut state = SearchState::new(target, self.settings.policy);
        let outcome = |max_worker_count: u32, target_met: bool| SearchOutcome {
            target_throughput: target,
            label: label.clone(),
            max_worker_count,
            target_met,
        };

        loop {
            let pipelines = state.worker_count();
            info!(%label, pipelines, "starting pipelines");

            orchestrator.resize(pipelines);
            if let Err(e) = orchestrator.start().await {
                error!(%label, target_fps = target, pipelines, error = %e, "failed to start pipelines");
                return Err(e.into());
            }

            debug!(settle_secs = self.settings.init_duration.as_secs(), "waiting for pipelines to settle");
            tokio::time::sleep(self.settings.init_duration).await;

            match self
                .gate
                .wait(pipelines, label.as_str(), self.settings.gate_retries)
                .await
            {
                Ok(()) => {}
                Err(e @ DensityError::LogsUnavailable { .. }) => {
                    let fallback = state.back_off();
                    error!(
                        %label,
                        target_fps = target,
                        pipelines,
                        fallback,
                        error = %e,
                        "pipeline logs unavailable, falling back to previous pipeline count"
                    );
                    return Ok(outcome(fallback, false));
                }
                Err(e) => return Err(e),
            }

            let windows = self.store.read_windows(label.as_str(), pipelines)?;
            let result = aggregate(pipelines, &windows);
            info!(
                %label,
                pipelines,
                total_fps = result.total_throughput,
                fps_per_stream = result.per_worker_throughput,
                "measured throughput"
            );

            match self.store.read_latency(label.as_str(), pipelines) {
                Ok(latency) => debug!(
                    %label,
                    pipelines,
                    total_latency_ms = latency.total_ms,
                    latency_per_stream_ms = latency.per_stream_ms,
                    "measured pipeline latency"
                ),
                Err(e) => warn!(%label, error = %e, "failed to read pipeline latency"),
            }

            let was_ramping = matches!(state.phase(), Phase::RampUp { .. });
            match state.observe(result.per_worker_throughput) {
                Transition::Next(next) => match state.phase() {
                    Phase::RampUp { increment } => {
                        info!(%label, increment, next, "incrementing pipelines");
                    }
                    Phase::Decrement if was_ramping => {
                        info!(
                            %label,
                            target_fps = target,
                            next,
                            "below target fps, starting to decrement pipelines by 1"
                        );
                    }
                    Phase::Decrement => {
                        info!(%label, next, "decrementing pipelines by 1");
                    }
                },
                Transition::Converged(max) => {
                    info!(
                        %label,
                        target_fps = target,
                        max_pipelines = max,
                        "max stream density achieved"
                    );
                    return Ok(outcome(max, true));
                }
                Transition::Exhausted => {
                    warn!(
                        %label,
                        target_fps = target,
                        fps_per_stream = result.per_worker_throughput,
                        "target fps not met with a single pipeline"
                    );
                    return Ok(outcome(state.worker_count(), false));
                }
            }
        }
    }
}
