//! Output module for inspecting harvest results
//!
//! This module backs the `--stats` CLI mode with counts loaded from the
//! storage layer.

pub mod stats;

pub use stats::{load_statistics, print_statistics, HarvestStatistics};
