//! Folio-Fetch: a resumable book catalog scraper
//!
//! This crate crawls paginated book catalog listings and extracts structured
//! metadata for each book detail page. A two-stage durable cache (raw page
//! content, then extracted record) keyed by URL makes repeated runs cheap and
//! lets interrupted crawls resume without re-fetching.

pub mod browser;
pub mod cache;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod record;

use thiserror::Error;

/// Main error type for Folio-Fetch operations
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache::CacheError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("Listing page failed to load for {entry_point}: {message}")]
    ListingUnavailable {
        entry_point: String,
        message: String,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export error: {0}")]
    Export(#[from] serde_json::Error),
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

/// Result type alias for Folio-Fetch operations
pub type Result<T> = std::result::Result<T, FolioError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use cache::{Cache, CacheError};
pub use config::Config;
pub use crawler::FetchError;
pub use record::BookRecord;
