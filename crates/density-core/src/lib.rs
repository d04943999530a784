pub mod config;
pub mod error;
pub mod types;

pub use config::DensityConfig;
pub use error::{DensityError, DensityResult};
pub use types::*;
