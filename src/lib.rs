//! Harvestman: a bounded recursive web-content harvester
//!
//! This crate implements a breadth-first crawl orchestrator that extracts
//! content from web pages, following links up to configurable depth and
//! page budgets, with domain restrictions, regex URL exclusion, and
//! canonical-URL deduplication.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for harvestman operations
///
/// Per-page fetch failures never surface here; they are recorded on the
/// page itself and the crawl continues. This type covers the failures that
/// reject a whole session before (or instead of) producing a result.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL '{seed}': {source}")]
    InvalidSeed { seed: String, source: UrlError },

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// All of these are fatal at session start: a request carrying a bad policy
/// is rejected before the first fetch is dispatched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid exclusion pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for harvestman operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{CrawlPolicy, Settings};
pub use crawler::{CancelToken, CrawlRequest, Fetcher, HttpFetcher, Orchestrator};
pub use output::{CrawlResult, CrawlSummary};
pub use state::{PageRecord, PageStatus, StopReason};
pub use url::{canonical_key, host_of, parse_absolute, DomainPolicy, PatternFilter};
