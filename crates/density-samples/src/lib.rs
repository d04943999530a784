//! density-samples — pipeline log reading, aggregation, and availability gating.
//!
//! Workers append one throughput value (or a `na` sentinel) per line to
//! `pipeline<id>_<label>.log` in the results directory. This crate only
//! observes those files:
//!
//! ```text
//! SampleStore
//!   ├── read_windows()  latest N logs → trailing K-line windows
//!   ├── count_ready()   non-empty matching logs (used by the gate)
//!   ├── read_latency()  gst-launch*_<label>*.log tracer lines
//!   └── clean_up()      delete stale pipeline*_*.log before a run
//!
//! aggregate(worker_count, windows) → IterationResult
//! AvailabilityGate::wait(expected, label, retries)
//! ```

pub mod aggregate;
pub mod artifacts;
pub mod gate;
pub mod latency;
pub mod reader;

pub use aggregate::aggregate;
pub use gate::AvailabilityGate;
pub use reader::{SampleStore, SampleWindow};
