//! Crawl coordinator - top-level orchestration
//!
//! Runs one listing walker per catalog entry point, in parallel up to a
//! bounded worker count. Each walker gets its own browsing session; the two
//! caches are the only shared state. Results are flattened grouped by entry
//! point in input order. A walker that dies takes only its own entry point
//! with it.

use crate::browser::{build_http_client, BrowserSession, HttpSession};
use crate::cache::{Cache, CacheDb};
use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::pipeline::RecordPipeline;
use crate::crawler::walker::ListingWalker;
use crate::record::BookRecord;
use crate::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Top-level crawl coordinator
pub struct Coordinator {
    pipeline: RecordPipeline,
    config: CrawlerConfig,
}

impl Coordinator {
    /// Creates a coordinator around explicitly injected cache handles
    ///
    /// The caches are opened by the caller before the crawl starts and
    /// outlive it; the coordinator never owns their lifecycle.
    pub fn new(
        config: CrawlerConfig,
        page_cache: Arc<dyn Cache<String>>,
        record_cache: Arc<dyn Cache<BookRecord>>,
    ) -> Self {
        let fetcher = PageFetcher::new(page_cache, config.clone());
        Self {
            pipeline: RecordPipeline::new(fetcher, record_cache),
            config,
        }
    }

    /// Crawls every entry point, returning all resolved records
    ///
    /// Entry points are processed independently and in parallel up to
    /// `max-concurrent-walkers`; `make_session` builds a fresh browsing
    /// session for each. Per-entry-point record order is preserved and
    /// output is grouped by entry point in input order. A failed walker is
    /// logged and contributes nothing.
    pub async fn run<S, F>(&self, entry_points: &[String], make_session: F) -> Result<Vec<BookRecord>>
    where
        S: BrowserSession + 'static,
        F: Fn(&str) -> S,
    {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_walkers as usize));
        let mut handles = Vec::with_capacity(entry_points.len());

        for entry_point in entry_points {
            let walker = ListingWalker::new(
                make_session(entry_point),
                self.pipeline.clone(),
                self.config.clone(),
            );
            let semaphore = Arc::clone(&semaphore);
            let entry_point = entry_point.clone();

            handles.push((
                entry_point.clone(),
                tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .expect("walker semaphore is never closed");
                    walker.walk(&entry_point).await
                }),
            ));
        }

        let mut all_records = Vec::new();
        for (entry_point, handle) in handles {
            match handle.await? {
                Ok(records) => {
                    tracing::info!("{}: {} records", entry_point, records.len());
                    all_records.extend(records);
                }
                Err(e) => {
                    // Fatal to this entry point only; siblings keep their results
                    tracing::error!("Walker for {} failed: {}", entry_point, e);
                }
            }
        }

        Ok(all_records)
    }
}

/// Runs a complete crawl from a loaded configuration
///
/// Opens the cache database, builds one HTTP client shared by all walker
/// sessions, and crawls every catalog entry point in configuration order.
pub async fn crawl(config: &Config, entry_points: &[String]) -> Result<Vec<BookRecord>> {
    let db = CacheDb::open(Path::new(&config.output.cache_db_path))?;
    let coordinator = Coordinator::new(
        config.crawler.clone(),
        Arc::new(db.page_cache()),
        Arc::new(db.record_cache()),
    );

    let client = build_http_client()?;
    coordinator
        .run(entry_points, move |_| HttpSession::new(client.clone()))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::ScriptedSession;

    fn fast_config(max_concurrent_walkers: u32) -> CrawlerConfig {
        CrawlerConfig {
            max_fetch_attempts: 3,
            retry_backoff_ms: 1,
            page_settle_ms: 0,
            pagination_settle_ms: 0,
            max_concurrent_walkers,
            ..CrawlerConfig::default()
        }
    }

    fn coordinator(db: &CacheDb, walkers: u32) -> Coordinator {
        Coordinator::new(
            fast_config(walkers),
            Arc::new(db.page_cache()),
            Arc::new(db.record_cache()),
        )
    }

    #[tokio::test]
    async fn test_results_grouped_by_entry_point_in_input_order() {
        let db = CacheDb::open_in_memory().unwrap();
        let entry_points = vec![
            "https://books.example.com/language/english".to_string(),
            "https://books.example.com/language/french".to_string(),
        ];

        let records = coordinator(&db, 5)
            .run(&entry_points, |entry_point| {
                if entry_point.ends_with("english") {
                    ScriptedSession::new(vec![vec![
                        "https://books.example.com/book/en-1".to_string(),
                        "https://books.example.com/book/en-2".to_string(),
                    ]])
                } else {
                    ScriptedSession::new(vec![vec![
                        "https://books.example.com/book/fr-1".to_string(),
                    ]])
                }
            })
            .await
            .unwrap();

        let sources: Vec<_> = records.iter().map(|r| r.source_url.as_str()).collect();
        assert_eq!(
            sources,
            vec![
                "https://books.example.com/book/en-1",
                "https://books.example.com/book/en-2",
                "https://books.example.com/book/fr-1",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_walker_does_not_abort_siblings() {
        let db = CacheDb::open_in_memory().unwrap();
        let entry_points = vec![
            "https://books.example.com/language/broken".to_string(),
            "https://books.example.com/language/english".to_string(),
        ];

        let records = coordinator(&db, 5)
            .run(&entry_points, |entry_point| {
                if entry_point.ends_with("broken") {
                    ScriptedSession::new(vec![vec![]]).fail_navigation()
                } else {
                    ScriptedSession::new(vec![vec![
                        "https://books.example.com/book/en-1".to_string(),
                    ]])
                }
            })
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_url, "https://books.example.com/book/en-1");
    }

    #[tokio::test]
    async fn test_bounded_to_one_walker_still_completes() {
        let db = CacheDb::open_in_memory().unwrap();
        let entry_points: Vec<String> = (0..4)
            .map(|n| format!("https://books.example.com/language/{n}"))
            .collect();

        let records = coordinator(&db, 1)
            .run(&entry_points, |entry_point| {
                let n = entry_point.rsplit('/').next().unwrap_or("0").to_string();
                ScriptedSession::new(vec![vec![format!(
                    "https://books.example.com/book/{n}"
                )]])
            })
            .await
            .unwrap();

        assert_eq!(records.len(), 4);
    }

    #[tokio::test]
    async fn test_no_entry_points_yields_nothing() {
        let db = CacheDb::open_in_memory().unwrap();
        let records = coordinator(&db, 5)
            .run(&[], |_| ScriptedSession::new(vec![]))
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_walkers_share_the_record_cache() {
        let db = CacheDb::open_in_memory().unwrap();
        let shared_link = "https://books.example.com/book/shared".to_string();
        let entry_points = vec![
            "https://books.example.com/language/a".to_string(),
            "https://books.example.com/language/b".to_string(),
        ];

        let records = coordinator(&db, 1)
            .run(&entry_points, |_| {
                ScriptedSession::new(vec![vec![shared_link.clone()]])
            })
            .await
            .unwrap();

        // Both walkers emit the record; the cache stores it once
        assert_eq!(records.len(), 2);
        assert_eq!(db.count_records().unwrap(), 1);
        assert_eq!(db.count_pages().unwrap(), 1);
    }
}
