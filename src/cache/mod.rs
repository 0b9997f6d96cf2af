//! Durable URL-keyed caches
//!
//! Two independent stores share this interface: the page cache (raw fetched
//! page content) and the record cache (extracted book records). Both are
//! keyed by detail page URL and survive process restarts, which is what makes
//! repeated crawl runs cheap and interrupted runs resumable.

mod sqlite;

pub use sqlite::{CacheDb, SqlitePageCache, SqliteRecordCache};

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Expected control flow on a cache miss, not surfaced to the user.
    /// Callers either check `has` first or treat this as "compute it".
    #[error("No cache entry for {url}")]
    NotFound { url: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// A durable key-value store keyed by detail page URL
///
/// `put` is an idempotent upsert: repeated computation of the same key yields
/// an equivalent value, so last-write-wins is acceptable and no cross-process
/// locking is required beyond SQLite's own single-statement atomicity.
/// Methods take `&self`; implementations lock internally because parallel
/// listing walkers share one store handle.
pub trait Cache<V>: Send + Sync {
    /// Returns whether an entry exists for this URL
    fn has(&self, url: &str) -> CacheResult<bool>;

    /// Loads the entry for this URL, or `CacheError::NotFound`
    fn get(&self, url: &str) -> CacheResult<V>;

    /// Inserts or overwrites the entry for this URL
    fn put(&self, url: &str, value: &V) -> CacheResult<()>;
}

/// Derives the storage key for a URL
///
/// SHA-256 hex of the URL bytes. The derivation must be stable across runs
/// and processes or no cache hit would ever occur.
pub fn cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_stable() {
        let url = "https://books.example.com/book/dune";
        assert_eq!(cache_key(url), cache_key(url));
        assert_eq!(cache_key(url).len(), 64);
    }

    #[test]
    fn test_cache_key_distinct_urls() {
        assert_ne!(
            cache_key("https://books.example.com/book/dune"),
            cache_key("https://books.example.com/book/dune-messiah")
        );
    }
}
