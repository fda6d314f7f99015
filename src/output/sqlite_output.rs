//! SQLite-based result sink implementation
//!
//! This module provides a result sink that records harvested pairs and the
//! run's terminal status in the storage backend.

use crate::crawler::QaPair;
use crate::output::traits::{OutputError, OutputResult, ResultSink};
use crate::storage::{RunStatus, Storage};
use std::sync::{Arc, Mutex, MutexGuard};

/// SQLite-based result sink
///
/// Bound to one run created before the crawl starts.
pub struct SqliteResultSink {
    storage: Arc<Mutex<dyn Storage>>,
    run_id: i64,
}

impl SqliteResultSink {
    /// Creates a new SQLite result sink
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to use
    /// * `run_id` - The current run ID
    pub fn new(storage: Arc<Mutex<dyn Storage>>, run_id: i64) -> Self {
        Self { storage, run_id }
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    fn lock(&self) -> OutputResult<MutexGuard<'_, dyn Storage + 'static>> {
        self.storage
            .lock()
            .map_err(|e| OutputError::Storage(format!("Failed to lock storage: {}", e)))
    }
}

impl ResultSink for SqliteResultSink {
    fn persist(&self, pairs: &[QaPair]) -> OutputResult<()> {
        let mut storage = self.lock()?;
        let written = storage
            .insert_pairs(self.run_id, pairs)
            .map_err(|e| OutputError::Storage(e.to_string()))?;
        tracing::info!("Stored {} pairs for run {}", written, self.run_id);
        Ok(())
    }

    fn finalize(&self, status: RunStatus) -> OutputResult<()> {
        let mut storage = self.lock()?;
        storage
            .finish_run(self.run_id, status)
            .map_err(|e| OutputError::Storage(e.to_string()))
    }
}
