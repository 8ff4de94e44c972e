pub mod cli;
pub mod stress;

pub use cli::*;
pub use stress::{StressOptions, StressReport, STRESS_CASES};
