//! Output module for persisting harvested pairs
//!
//! This module handles:
//! - The result sink interface the crawler hands its pairs to
//! - Markdown and SQLite sinks for the Question/Answer table
//! - Run statistics and re-export of stored results

mod markdown;
mod sqlite_output;
pub mod stats;
mod traits;

pub use markdown::{format_markdown_table, write_markdown_table, MarkdownTableSink};
pub use sqlite_output::SqliteResultSink;
pub use stats::{load_statistics, print_statistics, HarvestStatistics};
pub use traits::{FanOutSink, OutputError, OutputResult, ResultSink};

use crate::storage::{RunRecord, Storage};
use crate::HarvestError;
use std::path::Path;

/// Writes the pairs of the latest completed run as a markdown table
///
/// # Arguments
///
/// * `storage` - The storage backend containing harvested pairs
/// * `output_path` - Where to write the table
///
/// # Returns
///
/// * `Ok(RunRecord)` - The run that was exported
/// * `Err(HarvestError)` - No completed run exists, or writing failed
pub fn export_latest_run(
    storage: &dyn Storage,
    output_path: &Path,
) -> Result<RunRecord, HarvestError> {
    let run = storage.get_latest_completed_run()?.ok_or_else(|| {
        OutputError::Storage("No completed runs found in database".to_string())
    })?;

    let pairs = storage.load_pairs(run.id)?;
    write_markdown_table(&pairs, output_path)?;

    Ok(run)
}
