//! Statistics generation from the harvest database

use crate::storage::{RunRecord, Storage};
use crate::HarvestError;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Total repository rows in the entity table
    pub total_repositories: u64,

    /// Total rows in the append-only metric table
    pub total_metric_rows: u64,

    /// Distinct owning accounts seen
    pub distinct_owners: u64,

    /// The most recent crawl run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> Result<HarvestStatistics, HarvestError> {
    let total_repositories = storage.count_repositories()?;
    let total_metric_rows = storage.count_metric_rows()?;
    let distinct_owners = storage.count_distinct_owners()?;
    let latest_run = storage.get_latest_run()?;

    Ok(HarvestStatistics {
        total_repositories,
        total_metric_rows,
        distinct_owners,
        latest_run,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Repositories: {}", stats.total_repositories);
    println!("  Star observations: {}", stats.total_metric_rows);
    println!("  Distinct owners: {}", stats.distinct_owners);
    println!();

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run:");
            println!("  Id: {}", run.id);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Target: {}", run.target);
            println!("  Saved: {}", run.total_saved);
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!("  Config hash: {}", run.config_hash);
        }
        None => println!("No crawl runs recorded yet"),
    }
}
