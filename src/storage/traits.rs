//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::crawler::QaPair;
use crate::storage::{RunRecord, RunStatus};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Run {0} is already finished")]
    RunFinished(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the harvester.
pub trait Storage: Send {
    // ===== Run Management =====

    /// Creates a new crawl run in the `Running` state
    ///
    /// # Arguments
    ///
    /// * `site_base` - The site being crawled
    /// * `config_hash` - Hash of the configuration in use
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, site_base: &str, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Gets the most recent run that completed successfully
    fn get_latest_completed_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Records the terminal status of a run with a finish timestamp
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Pair Management =====

    /// Stores pairs for a run, appended after any pairs already stored
    ///
    /// All pairs are written in one transaction.
    ///
    /// # Returns
    ///
    /// The number of pairs written
    fn insert_pairs(&mut self, run_id: i64, pairs: &[QaPair]) -> StorageResult<usize>;

    /// Loads a run's pairs in their original order
    fn load_pairs(&self, run_id: i64) -> StorageResult<Vec<QaPair>>;

    // ===== Statistics =====

    /// Counts runs grouped by status
    fn count_runs_by_status(&self) -> StorageResult<HashMap<RunStatus, u64>>;

    /// Counts pairs across all runs
    fn count_total_pairs(&self) -> StorageResult<u64>;
}
