//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::QaPair;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use crate::HarvestError;
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

const RUN_COLUMNS: &str = "r.id, r.site_base, r.started_at, r.finished_at, r.config_hash, r.status, \
     (SELECT COUNT(*) FROM qa_pairs p WHERE p.run_id = r.id)";

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

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

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

    fn query_run(
        &self,
        filter: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> StorageResult<Option<RunRecord>> {
        let sql = format!(
            "SELECT {} FROM runs r {} ORDER BY r.id DESC LIMIT 1",
            RUN_COLUMNS, filter
        );
        let run = self
            .conn
            .query_row(&sql, params, run_from_row)
            .optional()?;
        Ok(run)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        site_base: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: status_from_column(5, row.get(5)?)?,
        pair_count: row.get::<_, i64>(6)? as u64,
    })
}

/// Rejects status strings this crate never writes
fn status_from_column(column: usize, value: String) -> rusqlite::Result<RunStatus> {
    RunStatus::from_db_string(&value).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            Type::Text,
            format!("unknown run status '{}'", value).into(),
        )
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, site_base: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (site_base, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![site_base, now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.query_run("WHERE r.id = ?1", params![run_id])?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        self.query_run("", params![])
    }

    fn get_latest_completed_run(&self) -> StorageResult<Option<RunRecord>> {
        self.query_run(
            "WHERE r.status = ?1",
            params![RunStatus::Completed.to_db_string()],
        )
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let run = self.get_run(run_id)?;
        if run.status.is_terminal() {
            return Err(StorageError::RunFinished(run_id));
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        Ok(())
    }

    // ===== Pair Management =====

    fn insert_pairs(&mut self, run_id: i64, pairs: &[QaPair]) -> StorageResult<usize> {
        // Fail on unknown runs before opening the transaction
        self.get_run(run_id)?;

        let tx = self.conn.transaction()?;
        {
            let offset: i64 = tx.query_row(
                "SELECT COALESCE(MAX(position) + 1, 0) FROM qa_pairs WHERE run_id = ?1",
                params![run_id],
                |row| row.get(0),
            )?;

            let mut stmt = tx.prepare(
                "INSERT INTO qa_pairs (run_id, position, question, answer) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (index, pair) in pairs.iter().enumerate() {
                stmt.execute(params![
                    run_id,
                    offset + index as i64,
                    pair.question,
                    pair.answer
                ])?;
            }
        }
        tx.commit()?;

        Ok(pairs.len())
    }

    fn load_pairs(&self, run_id: i64) -> StorageResult<Vec<QaPair>> {
        let mut stmt = self.conn.prepare(
            "SELECT question, answer FROM qa_pairs WHERE run_id = ?1 ORDER BY position",
        )?;

        let pairs = stmt
            .query_map(params![run_id], |row| {
                Ok(QaPair {
                    question: row.get(0)?,
                    answer: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pairs)
    }

    // ===== Statistics =====

    fn count_runs_by_status(&self) -> StorageResult<HashMap<RunStatus, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM runs GROUP BY status")?;

        let mut counts = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((status_from_column(0, row.get(0)?)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (status, count) = row?;
            counts.insert(status, count as u64);
        }

        Ok(counts)
    }

    fn count_total_pairs(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM qa_pairs", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
