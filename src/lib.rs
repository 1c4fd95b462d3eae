//! Deep-Crawl: a bounded-depth website crawler
//!
//! This crate crawls a site breadth-first from a seed URL up to a fixed number
//! of link hops and produces a serializable report of every page visited:
//! text, links, images, tables, forms and aggregate statistics.

pub mod config;
pub mod crawler;
pub mod report;
pub mod state;
pub mod url;

use thiserror::Error;

pub use crawler::FetchError;

/// Main error type for crawl operations
///
/// Only the variants raised before or instead of producing a report surface
/// to callers. Per-page failures are absorbed by the coordinator.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid seed URL '{url}': {source}")]
    InvalidSeedUrl { url: String, source: UrlError },

    #[error("Invalid crawl request: {0}")]
    InvalidRequest(String),

    #[error("Seed URL {url} could not be crawled: {source}")]
    SeedUnreachable { url: String, source: FetchError },

    #[error("Crawl cancelled before any page was fetched")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, CrawlOutcome, CrawlRequest};
pub use report::{CrawlReport, CrawlResponse, CrawlSummary, PageRecord};
pub use state::{CrawlState, PageState};
pub use crate::url::{extract_domain, normalize_url, resolve_url, CrawlScope};
