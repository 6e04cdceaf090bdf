//! Crawl orchestration
//!
//! This module composes the paginator and the batch persister into a
//! resumable multi-batch workflow:
//! - Initializing storage and run bookkeeping
//! - Driving batches of fetch-then-persist until the target is met
//! - Progress reporting
//! - Failure policy: page failures degrade to partial batches, persistence
//!   failures abort the crawl

use crate::config::Config;
use crate::crawler::paginator::Paginator;
use crate::github::{GitHubClient, RateLimitGovernor};
use crate::storage::{SqliteStorage, Storage};
use crate::HarvestError;
use std::path::Path;
use std::time::Duration;

/// Composes paginator and persister into the batch loop
pub struct Orchestrator {
    config: Config,
    client: GitHubClient,
    governor: RateLimitGovernor,
    storage: SqliteStorage,
    run_id: i64,
}

impl Orchestrator {
    /// Creates a new orchestrator instance
    ///
    /// Opens (or creates) the database, records a new crawl run, and builds
    /// the HTTP client. Dependencies are constructed here and injected into
    /// the loop, never reached for globally.
    pub fn new(config: Config, token: &str, config_hash: &str) -> Result<Self, HarvestError> {
        let storage_path = Path::new(&config.output.database_path);
        let mut storage = SqliteStorage::new(storage_path)?;

        let run_id = storage.create_run(config_hash, config.crawl.total_target)?;
        tracing::info!(run_id, "created crawl run");

        let client = GitHubClient::new(&config.api, token)?;
        let governor = RateLimitGovernor::new(
            config.api.rate_limit_threshold,
            Duration::from_secs(config.api.safety_margin_secs),
        );

        Ok(Self {
            config,
            client,
            governor,
            storage,
            run_id,
        })
    }

    /// Runs the crawl to completion and returns the total saved
    ///
    /// Terminal states: the target is met, or a fetch comes back empty or
    /// short (remote exhausted / persistently failing). All of these are
    /// successful completions; only persistence faults propagate as errors,
    /// after the run row is marked failed. The final total is always
    /// reported, whichever way the loop ends.
    pub async fn run(&mut self) -> Result<u64, HarvestError> {
        let target = self.config.crawl.total_target;
        tracing::info!(run_id = self.run_id, total = target, "starting crawl");

        let start_time = std::time::Instant::now();
        let mut remaining = target;
        let mut total_fetched: u64 = 0;
        let mut total_saved: u64 = 0;

        while remaining > 0 {
            let batch_target = self.config.crawl.batch_size.min(remaining);
            let paginator = Paginator::new(
                &self.client,
                &self.governor,
                &self.config.crawl.search_query,
            );
            let repos = paginator
                .fetch(batch_target as usize, self.config.crawl.page_size)
                .await;

            if repos.is_empty() {
                tracing::info!(fetched = total_fetched, "remote returned no records, stopping");
                break;
            }

            let saved = match self.storage.save_repositories(&repos) {
                Ok(saved) => saved,
                Err(err) => {
                    tracing::error!(
                        error = %err,
                        saved = total_saved,
                        "persistence failed, aborting crawl"
                    );
                    if let Err(mark_err) = self.storage.fail_run(self.run_id, total_saved) {
                        tracing::error!(error = %mark_err, "could not mark run as failed");
                    }
                    return Err(err.into());
                }
            };

            // Progress is driven by the fetched count, not the saved count,
            // so a short page can never replay the same window forever
            let fetched = repos.len() as u64;
            total_fetched += fetched;
            total_saved += saved as u64;
            remaining = remaining.saturating_sub(fetched);

            tracing::info!(
                fetched = total_fetched,
                total = target,
                saved = total_saved,
                "batch persisted"
            );

            if fetched < batch_target {
                tracing::info!(
                    fetched = total_fetched,
                    "remote exhausted before target, stopping"
                );
                break;
            }
        }

        self.storage.complete_run(self.run_id, total_saved)?;
        tracing::info!(
            total_saved,
            elapsed = ?start_time.elapsed(),
            "crawl finished"
        );

        Ok(total_saved)
    }
}
