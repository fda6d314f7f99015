//! Configuration module for FAQ Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A crawl can also run without any file, using [`Config::default`].
//!
//! # Example
//!
//! ```no_run
//! use faq_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Attempts per page: {}", config.crawler.max_attempts);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, MarkerConfig, OutputConfig, UserAgentConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, DEFAULT_CONFIG_HASH};
pub use validation::validate;
