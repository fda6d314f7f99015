//! Statistics generation from the harvest database
//!
//! This module provides functionality for extracting and displaying
//! run statistics from the storage layer.

use crate::storage::{RunRecord, RunStatus, Storage};
use crate::HarvestError;
use std::collections::HashMap;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Total number of runs recorded
    pub total_runs: u64,

    /// Count of runs by status
    pub runs_by_status: HashMap<RunStatus, u64>,

    /// Pairs stored across all runs
    pub total_pairs: u64,

    /// The most recent run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<HarvestStatistics, HarvestError> {
    let runs_by_status = storage.count_runs_by_status()?;
    let total_runs: u64 = runs_by_status.values().sum();
    let total_pairs = storage.count_total_pairs()?;
    let latest_run = storage.get_latest_run()?;

    Ok(HarvestStatistics {
        total_runs,
        runs_by_status,
        total_pairs,
        latest_run,
    })
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Total runs: {}", stats.total_runs);
    println!("Total pairs stored: {}", stats.total_pairs);

    if stats.total_runs > 0 {
        println!("\nRuns by status:");
        for status in RunStatus::ALL {
            if let Some(count) = stats.runs_by_status.get(&status) {
                println!("  {:<15} {}", status.to_db_string(), count);
            }
        }
    }

    if let Some(run) = &stats.latest_run {
        println!("\nLatest run (#{}):", run.id);
        println!("  Site: {}", run.site_base);
        println!("  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
        println!("  Status: {}", run.status);
        println!("  Pairs: {}", run.pair_count);
    }
}
