//! Crawler module for FAQ page fetching and extraction
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with retry logic
//! - Marker-based link discovery
//! - Question/answer extraction
//! - Overall crawl coordination, progress reporting and cancellation

mod coordinator;
mod extract;
mod fetcher;
mod parser;
mod progress;
mod session;

pub use coordinator::{run_crawl, spawn_crawl, Coordinator, CrawlHandle, CrawlOutcome};
pub use extract::{normalize_text, ContentSelectors, QaPair};
pub use fetcher::{build_http_client, FetchedPage, Fetcher, RetryPolicy};
pub use parser::{extract_links, extract_links_simple, parse_html};
pub use progress::{percent, LogProgress, ProgressEvent, ProgressSink};
pub use session::CrawlSession;

use crate::config::Config;
use crate::output::ResultSink;
use crate::storage::{RunStatus, Storage};
use crate::HarvestError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl with tracing-based progress output
///
/// This is the simplest entry point: it builds a coordinator from `config`,
/// logs progress events, and hands the pairs to `results`.
///
/// # Returns
///
/// * `Ok(RunStatus)` - The crawl reached a terminal state
/// * `Err(HarvestError)` - The coordinator could not be built
pub async fn crawl(
    config: &Config,
    site_base: &str,
    results: &dyn ResultSink,
    cancel: &CancellationToken,
) -> Result<RunStatus, HarvestError> {
    let coordinator = Coordinator::new(config)?;
    Ok(run_crawl(&coordinator, site_base, &LogProgress, results, cancel).await)
}

/// Builds the coordinator and opens a run record for one crawl
///
/// The coordinator is built first, so a configuration it rejects never
/// leaves a `running` row in storage.
///
/// # Returns
///
/// * `Ok((Coordinator, i64))` - The coordinator and the new run's ID
/// * `Err(HarvestError)` - The coordinator could not be built or the run
///   could not be recorded
pub fn prepare_run(
    config: &Config,
    storage: &mut dyn Storage,
    site_base: &str,
    config_hash: &str,
) -> Result<(Coordinator, i64), HarvestError> {
    let coordinator = Coordinator::new(config)?;
    let run_id = storage.create_run(site_base, config_hash)?;
    Ok((coordinator, run_id))
}
