//! Output module for run reports and history statistics
//!
//! This module handles:
//! - The per-run report returned by the relay
//! - Inspecting and printing the state file for `--stats`

mod report;
pub mod stats;

pub use report::{RunOutcome, RunReport};
pub use stats::{load_statistics, print_statistics, StoreStatistics};
