//! Cache statistics reporting
//!
//! Extracts and displays counts from the cache database, including how many
//! cached records still await schema repair.

use crate::cache::CacheDb;
use crate::Result;

/// Cache statistics summary
#[derive(Debug, Clone)]
pub struct CacheStatistics {
    /// Raw pages held in the page cache
    pub cached_pages: u64,

    /// Extracted records held in the record cache
    pub cached_records: u64,

    /// Records missing the source URL field (pending repair)
    pub incomplete_records: u64,
}

/// Loads statistics from the cache database
pub fn load_statistics(db: &CacheDb) -> Result<CacheStatistics> {
    Ok(CacheStatistics {
        cached_pages: db.count_pages()?,
        cached_records: db.count_records()?,
        incomplete_records: db.count_incomplete_records()?,
    })
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &CacheStatistics) {
    println!("=== Cache Statistics ===\n");
    println!("Cached pages:       {}", stats.cached_pages);
    println!("Cached records:     {}", stats.cached_records);
    println!("Pending repair:     {}", stats.incomplete_records);

    if stats.cached_records > 0 {
        let extracted = stats.cached_records.min(stats.cached_pages);
        println!(
            "\nNext run will skip fetching {} already-resolved pages",
            extracted
        );
    }
}
