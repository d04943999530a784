//! density-search — the adaptive stream-density search.
//!
//! Finds the largest number of concurrently running pipelines whose
//! per-pipeline throughput still meets a target.
//!
//! # Search Algorithm
//!
//! ```text
//! workers = 1, phase = RampUp
//! loop:
//!     start `workers` pipelines, wait init_duration, wait for their logs
//!     fps = total fps / workers
//!
//!     RampUp:
//!         fps >= target: workers += fixed increment
//!                        or floor(fps / target) (5 when that is 1)
//!         fps <  target: phase = Decrement, workers -= 1
//!     Decrement:
//!         fps >= target: done, target met at `workers`
//!         workers == 1:  done, target not met
//!         otherwise:     workers -= 1
//! ```
//!
//! Logs that never appear end the search at the previous worker count,
//! reported as not meeting the target.
//!
//! # Architecture
//!
//! ```text
//! DensityRunner (one search per (target, label), teardown after each)
//!   └── DensityController (resize / settle / gate / aggregate loop)
//!       ├── SearchState (pure transition table)
//!       ├── Orchestrator (docker compose)
//!       └── SampleStore + AvailabilityGate (pipeline logs)
//! ```

pub mod controller;
pub mod runlog;
pub mod runner;
pub mod state;

pub use controller::{DensityController, SearchSettings};
pub use runlog::{RUN_LOG_FILE, open_run_log};
pub use runner::DensityRunner;
pub use state::{IncrementPolicy, Phase, SearchState, Transition};
