use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Folio-Fetch
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub catalog: Vec<CatalogEntry>,
}

impl Config {
    /// All catalog entry points, flattened in configuration order
    pub fn entry_points(&self) -> Vec<String> {
        self.catalog
            .iter()
            .flat_map(|entry| entry.links.iter().cloned())
            .collect()
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum attempts for one detail page fetch before it is skipped
    #[serde(rename = "max-fetch-attempts", default = "default_max_fetch_attempts")]
    pub max_fetch_attempts: u32,

    /// Delay between fetch attempts (milliseconds)
    #[serde(rename = "retry-backoff-ms", default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Settle delay after opening a detail page, letting dynamic content
    /// finish rendering before capture (milliseconds)
    #[serde(rename = "page-settle-ms", default = "default_page_settle_ms")]
    pub page_settle_ms: u64,

    /// Settle delay after clicking to the next listing page (milliseconds)
    #[serde(rename = "pagination-settle-ms", default = "default_pagination_settle_ms")]
    pub pagination_settle_ms: u64,

    /// Maximum listing walkers running in parallel
    #[serde(rename = "max-concurrent-walkers", default = "default_max_concurrent_walkers")]
    pub max_concurrent_walkers: u32,

    /// Cap on the total time one URL's retry loop may consume
    /// (milliseconds, 0 disables the cap)
    #[serde(rename = "max-retry-time-ms", default)]
    pub max_retry_time_ms: u64,
}

impl CrawlerConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }

    pub fn pagination_settle(&self) -> Duration {
        Duration::from_millis(self.pagination_settle_ms)
    }

    pub fn max_retry_time(&self) -> Option<Duration> {
        (self.max_retry_time_ms > 0).then(|| Duration::from_millis(self.max_retry_time_ms))
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_fetch_attempts: default_max_fetch_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            page_settle_ms: default_page_settle_ms(),
            pagination_settle_ms: default_pagination_settle_ms(),
            max_concurrent_walkers: default_max_concurrent_walkers(),
            max_retry_time_ms: 0,
        }
    }
}

fn default_max_fetch_attempts() -> u32 {
    10
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_page_settle_ms() -> u64 {
    1000
}

fn default_pagination_settle_ms() -> u64 {
    2000
}

fn default_max_concurrent_walkers() -> u32 {
    5
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite cache database file
    #[serde(rename = "cache-db-path")]
    pub cache_db_path: String,

    /// Path the JSON record export is written to
    #[serde(rename = "export-path")]
    pub export_path: String,
}

/// One catalog to crawl, with its listing entry points
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    /// Human-readable catalog name (e.g. "english-fiction")
    pub name: String,

    /// Listing URLs pagination starts from
    pub links: Vec<String>,
}
