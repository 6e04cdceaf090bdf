//! Crawler module for harvesting repositories
//!
//! This module contains the crawl control flow:
//! - Cursor-driven pagination with graceful degradation
//! - Batch orchestration against the storage layer
//! - Run bookkeeping and progress reporting

mod orchestrator;
mod paginator;

pub use orchestrator::Orchestrator;
pub use paginator::Paginator;

use crate::config::Config;
use crate::HarvestError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Initialize the storage layer and record a run
/// 2. Build the HTTP client
/// 3. Fetch and persist batches until the target is met or the remote runs dry
/// 4. Report the final total
///
/// # Arguments
///
/// * `config` - The validated crawl configuration
/// * `token` - GitHub API token
/// * `config_hash` - Hash of the configuration file, recorded with the run
///
/// # Returns
///
/// * `Ok(u64)` - Total repositories saved
/// * `Err(HarvestError)` - Startup or persistence failure
pub async fn crawl(config: Config, token: &str, config_hash: &str) -> Result<u64, HarvestError> {
    let mut orchestrator = Orchestrator::new(config, token, config_hash)?;
    orchestrator.run().await
}
