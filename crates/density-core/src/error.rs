//! Stream density error types.

use thiserror::Error;

/// Errors that can occur while configuring or running a density search.
#[derive(Debug, Error)]
pub enum DensityError {
    /// Invalid configuration. Raised before any orchestrator action.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// Fewer non-empty pipeline logs than expected after all retries.
    #[error(
        "cannot find all pipeline log files for '{label}' after {attempts} attempts: \
         expected {expected}, found {found}"
    )]
    LogsUnavailable {
        label: String,
        expected: u32,
        found: u32,
        attempts: u32,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("orchestrator error: {0}")]
    Orchestrator(#[from] anyhow::Error),
}

impl DensityError {
    pub fn argument(msg: impl Into<String>) -> Self {
        DensityError::Argument(msg.into())
    }
}

pub type DensityResult<T> = Result<T, DensityError>;
