//! Availability gate — waits for every worker to start writing its log.
//!
//! Workers create their pipeline logs some time after the orchestrator
//! reports them started. The gate polls the results directory at a fixed
//! interval until enough non-empty logs exist or the retries run out.

use std::time::Duration;

use tracing::{debug, info, warn};

use density_core::{DensityError, DensityResult};

use crate::reader::SampleStore;

/// Spacing between gate attempts. Fixed, so the worst-case wait is
/// `max_retries` seconds.
pub const RETRY_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct AvailabilityGate {
    store: SampleStore,
    interval: Duration,
}

impl AvailabilityGate {
    pub fn new(store: SampleStore) -> Self {
        Self {
            store,
            interval: RETRY_INTERVAL,
        }
    }

    /// Create a gate with a custom attempt spacing (for testing).
    pub fn with_interval(store: SampleStore, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Block until at least `expected` non-empty logs exist for `label`.
    ///
    /// Each attempt is one directory scan. After `max_retries` failed
    /// attempts (at least one is always made) returns
    /// [`DensityError::LogsUnavailable`].
    pub async fn wait(&self, expected: u32, label: &str, max_retries: u32) -> DensityResult<()> {
        let attempts = max_retries.max(1);
        let mut found = 0;

        for attempt in 1..=attempts {
            debug!(label, attempt, "checking presence of all pipeline log files");
            found = match self.store.count_ready(label) {
                Ok(n) => n,
                Err(e) => {
                    warn!(label, error = %e, "failed to scan results directory");
                    0
                }
            };

            if found >= expected {
                info!(label, found, "found all non-empty log files");
                return Ok(());
            }

            debug!(label, found, expected, "still missing or empty log files");
            if attempt < attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        Err(DensityError::LogsUnavailable {
            label: label.to_string(),
            expected,
            found,
            attempts,
        })
    }
}
