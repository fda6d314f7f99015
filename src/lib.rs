//! FAQ Harvester: a question/answer scraper for FAQ-style websites
//!
//! This crate crawls a FAQ site from its homepage, discovers category and
//! question pages by fixed path markers, extracts question/answer text and
//! hands the collected pairs to a result sink.

pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for FAQ Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Invalid content selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crawl worker failed: {0}")]
    Worker(String),
}

/// Raised once every attempt to fetch a URL has failed
#[derive(Debug, Error)]
#[error("Failed to fetch {url} after {attempts} attempt(s): {source}")]
pub struct FetchError {
    /// The URL that could not be fetched
    pub url: String,

    /// Number of attempts made before giving up
    pub attempts: u32,

    /// The error from the final attempt
    #[source]
    pub source: reqwest::Error,
}

/// Question and answer containers on a page did not pair up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Question/answer count mismatch: {questions} question(s), {answers} answer(s)")]
pub struct CardinalityMismatch {
    pub questions: usize,
    pub answers: usize,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("No URL was given")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),
}

/// Result type alias for FAQ Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlOutcome, ProgressEvent, ProgressSink, QaPair};
pub use output::ResultSink;
pub use storage::RunStatus;
