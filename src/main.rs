//! FAQ Harvester main entry point
//!
//! This is the command-line interface for the FAQ Harvester.

use anyhow::{bail, Context};
use clap::Parser;
use faq_harvester::config::{load_config_with_hash, Config, DEFAULT_CONFIG_HASH};
use faq_harvester::crawler::{prepare_run, spawn_crawl, ProgressEvent, ProgressSink};
use faq_harvester::output::{FanOutSink, MarkdownTableSink, ResultSink, SqliteResultSink};
use faq_harvester::storage::{RunStatus, SqliteStorage, Storage};
use faq_harvester::url::parse_site_base;
use faq_harvester::UrlError;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// FAQ Harvester: collects question/answer pairs from FAQ websites
///
/// Starting from the site's homepage, FAQ Harvester follows category and
/// question links, extracts every question with its answer, and stores
/// them in a SQLite database and a markdown table.
#[derive(Parser, Debug)]
#[command(name = "faq-harvester")]
#[command(version = "1.0.0")]
#[command(about = "Collects question/answer pairs from FAQ websites", long_about = None)]
struct Cli {
    /// Homepage URL of the FAQ site
    #[arg(value_name = "URL", required_unless_present_any = ["stats", "export"])]
    url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the SQLite database path
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Override the markdown table path
    #[arg(long, value_name = "PATH")]
    table: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "export")]
    stats: bool,

    /// Rewrite the markdown table from the latest completed run and exit
    #[arg(long, conflicts_with = "stats")]
    export: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            (Config::default(), DEFAULT_CONFIG_HASH.to_string())
        }
    };

    if let Some(database) = &cli.database {
        config.output.database_path = database.display().to_string();
    }
    if let Some(table) = &cli.table {
        config.output.table_path = table.display().to_string();
    }

    if cli.stats {
        handle_stats(&config)
    } else if cli.export {
        handle_export(&config)
    } else {
        handle_crawl(config, &config_hash, cli.url.as_deref().unwrap_or_default()).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("faq_harvester=info,warn"),
            1 => EnvFilter::new("faq_harvester=debug,info"),
            2 => EnvFilter::new("faq_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use faq_harvester::output::{load_statistics, print_statistics};

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export mode: rewrites the markdown table from the database
fn handle_export(config: &Config) -> anyhow::Result<()> {
    use faq_harvester::output::export_latest_run;

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let run = export_latest_run(&storage, Path::new(&config.output.table_path))?;

    println!(
        "✓ Exported {} pairs from run #{} ({}) to {}",
        run.pair_count, run.id, run.site_base, config.output.table_path
    );

    Ok(())
}

/// Handles the main crawl operation
///
/// Progress events are printed as they arrive. Ctrl-C cancels the crawl at
/// its next checkpoint.
async fn handle_crawl(config: Config, config_hash: &str, url: &str) -> anyhow::Result<()> {
    let site_base = match parse_site_base(url) {
        Ok(site_base) => site_base,
        Err(UrlError::Empty) => {
            tracing::warn!("Please enter a URL");
            bail!("No URL given");
        }
        Err(e) => return Err(e).context("Invalid site URL"),
    };

    let mut storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .with_context(|| format!("Failed to open {}", config.output.database_path))?;
    let (coordinator, run_id) = prepare_run(&config, &mut storage, &site_base, config_hash)?;
    tracing::info!("Starting run {} for {}", run_id, site_base);

    let storage: Arc<Mutex<dyn Storage>> = Arc::new(Mutex::new(storage));
    let results: Arc<dyn ResultSink> = Arc::new(
        FanOutSink::new()
            .with(SqliteResultSink::new(storage, run_id))
            .with(MarkdownTableSink::new(&config.output.table_path)),
    );

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ProgressEvent>();
    let progress: Arc<dyn ProgressSink> = Arc::new(tx);

    let handle = spawn_crawl(
        Arc::new(coordinator),
        site_base,
        progress,
        results,
        CancellationToken::new(),
    );

    let cancel = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            cancel.cancel();
        }
    });

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match &event {
                ProgressEvent::Failed(_) | ProgressEvent::CountMismatch { .. } => {
                    eprintln!("{}", event)
                }
                _ => println!("{}", event),
            }
        }
    });

    let status = handle.wait().await;
    printer.await?;

    match status {
        RunStatus::Failed => bail!("Run {} failed", run_id),
        _ => Ok(()),
    }
}
