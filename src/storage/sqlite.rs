//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::model::Repo;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{MetricRecord, RepoRecord, RunRecord, RunStatus};
use crate::HarvestError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        // Initialize schema
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn run_from_row(row: &Row) -> rusqlite::Result<RunRecord> {
        Ok(RunRecord {
            id: row.get(0)?,
            started_at: row.get(1)?,
            finished_at: row.get(2)?,
            config_hash: row.get(3)?,
            target: row.get::<_, i64>(4)? as u64,
            total_saved: row.get::<_, i64>(5)? as u64,
            status: RunStatus::from_db_string(&row.get::<_, String>(6)?)
                .unwrap_or(RunStatus::Running),
        })
    }
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str, target: u64) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawl_runs (started_at, config_hash, target, status) VALUES (?1, ?2, ?3, ?4)",
            params![now, config_hash, target as i64, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, config_hash, target, total_saved, status
             FROM crawl_runs WHERE id = ?1",
        )?;

        let run = stmt
            .query_row(params![run_id], Self::run_from_row)
            .map_err(|_| StorageError::RunNotFound(run_id))?;

        Ok(run)
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, config_hash, target, total_saved, status
             FROM crawl_runs ORDER BY id DESC LIMIT 1",
        )?;

        let run = stmt.query_row([], Self::run_from_row).optional()?;

        Ok(run)
    }

    fn complete_run(&mut self, run_id: i64, total_saved: u64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE crawl_runs SET status = ?1, finished_at = ?2, total_saved = ?3 WHERE id = ?4",
            params![
                RunStatus::Completed.to_db_string(),
                now,
                total_saved as i64,
                run_id
            ],
        )?;
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64, total_saved: u64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE crawl_runs SET status = ?1, finished_at = ?2, total_saved = ?3 WHERE id = ?4",
            params![
                RunStatus::Failed.to_db_string(),
                now,
                total_saved as i64,
                run_id
            ],
        )?;
        Ok(())
    }

    // ===== Batch Persistence =====

    fn save_repositories(&mut self, repos: &[Repo]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        {
            let mut upsert = tx.prepare_cached(
                "INSERT INTO repositories (id, name, owner, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     owner = excluded.owner,
                     updated_at = excluded.updated_at",
            )?;

            let mut insert_metric = tx.prepare_cached(
                "INSERT INTO repository_metrics (repository_id, stars, recorded_at)
                 VALUES (?1, ?2, ?3)",
            )?;

            for repo in repos {
                upsert.execute(params![repo.id, repo.name, repo.owner, now])?;
                insert_metric.execute(params![repo.id, repo.stars, now])?;
            }
        }

        tx.commit()?;
        Ok(repos.len())
    }

    // ===== Queries =====

    fn get_repository(&self, id: i64) -> StorageResult<Option<RepoRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, owner, updated_at FROM repositories WHERE id = ?1")?;

        let repo = stmt
            .query_row(params![id], |row| {
                Ok(RepoRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    owner: row.get(2)?,
                    updated_at: row.get(3)?,
                })
            })
            .optional()?;

        Ok(repo)
    }

    fn star_history(&self, id: i64) -> StorageResult<Vec<MetricRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT repository_id, stars, recorded_at FROM repository_metrics
             WHERE repository_id = ?1 ORDER BY id",
        )?;

        let metrics = stmt
            .query_map(params![id], |row| {
                Ok(MetricRecord {
                    repository_id: row.get(0)?,
                    stars: row.get(1)?,
                    recorded_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(metrics)
    }

    fn count_repositories(&self) -> StorageResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM repositories", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_metric_rows(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM repository_metrics",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_distinct_owners(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT owner) FROM repositories",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
