//! Storage traits and error types

use crate::model::Repo;
use crate::storage::{MetricRecord, RepoRecord, RunRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Run not found: {0}")]
    RunNotFound(i64),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// The batch-persistence contract is the heart of this trait: a call to
/// `save_repositories` either persists the whole batch or none of it.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run in the running state
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file driving the run
    /// * `target` - Total number of repositories the run aims for
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str, target: u64) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Marks a run as completed with its final saved total
    fn complete_run(&mut self, run_id: i64, total_saved: u64) -> StorageResult<()>;

    /// Marks a run as failed, keeping whatever total had accumulated
    fn fail_run(&mut self, run_id: i64, total_saved: u64) -> StorageResult<()>;

    // ===== Batch Persistence =====

    /// Persists a batch of repositories as a single transaction
    ///
    /// Two facts are written per record: an upsert of the identity row and
    /// an append-only star metric. Any failure rolls back the entire batch;
    /// success returns the input batch length.
    fn save_repositories(&mut self, repos: &[Repo]) -> StorageResult<usize>;

    // ===== Queries =====

    /// Gets a repository row by its remote id
    fn get_repository(&self, id: i64) -> StorageResult<Option<RepoRecord>>;

    /// Gets the star history for a repository, oldest first
    fn star_history(&self, id: i64) -> StorageResult<Vec<MetricRecord>>;

    /// Counts rows in the repository entity table
    fn count_repositories(&self) -> StorageResult<u64>;

    /// Counts rows in the append-only metric table
    fn count_metric_rows(&self) -> StorageResult<u64>;

    /// Counts distinct owning accounts seen so far
    fn count_distinct_owners(&self) -> StorageResult<u64>;
}
