//! density-orchestrator — the boundary to whatever runs the workers.
//!
//! The search only needs to say "run N workers" and "tear them down".
//! Everything else is passed as environment-like key/value variables,
//! which `ComposeOrchestrator` hands to `docker compose`.

pub mod compose;

use async_trait::async_trait;

pub use compose::ComposeOrchestrator;

pub const PIPELINE_COUNT_KEY: &str = "PIPELINE_COUNT";
pub const TARGET_FPS_KEY: &str = "TARGET_FPS";
pub const CONTAINER_NAME_KEY: &str = "CONTAINER_NAME";
pub const PIPELINE_INC_KEY: &str = "PIPELINE_INC";
pub const INIT_DURATION_KEY: &str = "INIT_DURATION";
pub const RESULTS_DIR_KEY: &str = "RESULTS_DIR";
/// Directory the workers write their logs to; same as `RESULTS_DIR`.
pub const LOG_DIR_KEY: &str = "log_dir";
pub const DEVICE_KEY: &str = "DEVICE";
pub const RETAIL_USE_CASE_ROOT_KEY: &str = "RETAIL_USE_CASE_ROOT";

/// Starts and stops a pool of identical workers.
#[async_trait]
pub trait Orchestrator: Send {
    /// Set a variable passed to the workers on the next `start()`.
    fn set_var(&mut self, key: &str, value: String);

    /// Set the desired worker count for the next `start()`.
    fn resize(&mut self, count: u32) {
        self.set_var(PIPELINE_COUNT_KEY, count.to_string());
    }

    /// Bring the described set of workers up. Returns once the request is
    /// accepted, not once workers produce output.
    async fn start(&mut self) -> anyhow::Result<()>;

    /// Tear all workers down.
    async fn stop(&mut self) -> anyhow::Result<()>;
}
