//! Retrying detail page fetcher
//!
//! Fetches one detail URL through the walker's browsing session, writing
//! through the page cache. A cache hit returns immediately with no session
//! activity at all; a miss opens a transient side tab, waits a settle
//! interval for dynamic content, captures the rendered page, and tears the
//! tab down. Control is handed back to the shared listing context after
//! every attempt, on success and failure paths both.

use crate::browser::{BrowserError, BrowserSession};
use crate::cache::{Cache, CacheError};
use crate::config::CrawlerConfig;
use crate::crawler::retry::{with_retry, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a detail page fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Exhausted {attempts} fetch attempts for {url}: {source}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: BrowserError,
    },

    #[error("Fetch retry time budget exceeded for {url} after {attempts} attempts")]
    TimeBudgetExceeded { url: String, attempts: u32 },

    #[error("Cache error during fetch: {0}")]
    Cache(#[from] CacheError),
}

impl FetchError {
    /// Whether the record pipeline may treat this failure as "this URL
    /// yields no record" and continue the walk
    ///
    /// Exhausted retries are skippable; cache failures are infrastructure
    /// problems and propagate.
    pub fn is_skippable(&self) -> bool {
        !matches!(self, Self::Cache(_))
    }
}

/// Cache-first, retrying fetcher for detail pages
#[derive(Clone)]
pub struct PageFetcher {
    page_cache: Arc<dyn Cache<String>>,
    config: CrawlerConfig,
}

impl PageFetcher {
    pub fn new(page_cache: Arc<dyn Cache<String>>, config: CrawlerConfig) -> Self {
        Self { page_cache, config }
    }

    /// Fetches the raw content of a detail page
    ///
    /// On a page cache hit the session is never touched. On a miss the fetch
    /// is retried up to the configured attempt count; the successful result
    /// is written through to the page cache before being returned, so a
    /// subsequent fetch of the same URL is a cache hit.
    pub async fn fetch<S>(&self, session: &mut S, url: &str) -> Result<String, FetchError>
    where
        S: BrowserSession + ?Sized,
    {
        if self.page_cache.has(url)? {
            tracing::trace!("Page cache hit for {}", url);
            return Ok(self.page_cache.get(url)?);
        }

        let policy = RetryPolicy {
            max_attempts: self.config.max_fetch_attempts,
            backoff: self.config.retry_backoff(),
            time_cap: self.config.max_retry_time(),
        };
        let settle = self.config.page_settle();

        let content = with_retry(&policy, session, |session| {
            // Each attempt owns its URL copy; the future may not borrow
            // beyond the session's reborrow lifetime.
            let url = url.to_string();
            Box::pin(async move { attempt_fetch(session, &url, settle).await })
        })
        .await
        .map_err(|failure| {
            if failure.timed_out {
                FetchError::TimeBudgetExceeded {
                    url: url.to_string(),
                    attempts: failure.attempts,
                }
            } else {
                FetchError::RetriesExhausted {
                    url: url.to_string(),
                    attempts: failure.attempts,
                    source: failure.last_error,
                }
            }
        })?;

        self.page_cache.put(url, &content)?;
        tracing::debug!("Fetched and cached {}", url);
        Ok(content)
    }
}

/// One fetch attempt: open side tab, settle, capture, tear down
///
/// The return-to-listing handoff at the end is mandatory regardless of
/// outcome; the walker owns the listing context and must find it focused.
async fn attempt_fetch<S>(
    session: &mut S,
    url: &str,
    settle: Duration,
) -> Result<String, BrowserError>
where
    S: BrowserSession + ?Sized,
{
    let result = open_and_read(session, url, settle).await;
    let restored = session.switch_to_listing().await;

    match (result, restored) {
        (Ok(content), Ok(())) => Ok(content),
        (Ok(_), Err(e)) => Err(e),
        // A failed attempt keeps its own error even if the handoff also failed
        (Err(e), _) => Err(e),
    }
}

async fn open_and_read<S>(
    session: &mut S,
    url: &str,
    settle: Duration,
) -> Result<String, BrowserError>
where
    S: BrowserSession + ?Sized,
{
    let tab = session.open(url).await?;
    tokio::time::sleep(settle).await;

    let content = session.read_content(&tab).await;
    let closed = session.close(tab).await;

    let content = content?;
    closed?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::ScriptedSession;
    use crate::cache::CacheDb;
    use std::sync::atomic::Ordering;

    const DETAIL_URL: &str = "https://books.example.com/book/dune";

    fn fast_config(max_fetch_attempts: u32) -> CrawlerConfig {
        CrawlerConfig {
            max_fetch_attempts,
            retry_backoff_ms: 1,
            page_settle_ms: 0,
            pagination_settle_ms: 0,
            ..CrawlerConfig::default()
        }
    }

    fn listing_script() -> Vec<Vec<String>> {
        vec![vec![DETAIL_URL.to_string()]]
    }

    async fn navigated(mut session: ScriptedSession) -> ScriptedSession {
        session
            .navigate("https://books.example.com/listing")
            .await
            .unwrap();
        session
    }

    #[tokio::test]
    async fn test_cache_hit_touches_nothing() {
        let db = CacheDb::open_in_memory().unwrap();
        let page_cache = Arc::new(db.page_cache());
        page_cache.put(DETAIL_URL, &"<html>cached</html>".to_string()).unwrap();

        let fetcher = PageFetcher::new(page_cache, fast_config(3));
        let mut session = navigated(ScriptedSession::new(listing_script())).await;
        let counters = session.counters();

        let content = fetcher.fetch(&mut session, DETAIL_URL).await.unwrap();

        assert_eq!(content, "<html>cached</html>");
        assert_eq!(counters.side_fetches(), 0);
    }

    #[tokio::test]
    async fn test_miss_fetches_and_writes_through() {
        let db = CacheDb::open_in_memory().unwrap();
        let page_cache = Arc::new(db.page_cache());
        let fetcher = PageFetcher::new(page_cache.clone(), fast_config(3));

        let mut session = navigated(
            ScriptedSession::new(listing_script())
                .with_detail_body(DETAIL_URL, "<html>fresh</html>"),
        )
        .await;

        let content = fetcher.fetch(&mut session, DETAIL_URL).await.unwrap();

        assert_eq!(content, "<html>fresh</html>");
        assert_eq!(page_cache.get(DETAIL_URL).unwrap(), "<html>fresh</html>");
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let db = CacheDb::open_in_memory().unwrap();
        let fetcher = PageFetcher::new(Arc::new(db.page_cache()), fast_config(5));

        let mut session = navigated(
            ScriptedSession::new(listing_script()).fail_open_times(DETAIL_URL, 2),
        )
        .await;
        let counters = session.counters();

        let content = fetcher.fetch(&mut session, DETAIL_URL).await.unwrap();

        assert!(content.contains("Full Book Name:"));
        assert_eq!(counters.open.load(Ordering::Relaxed), 3);
        // The listing handoff happened after every attempt
        assert_eq!(counters.switch_to_listing.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn test_exhausts_exactly_configured_attempts() {
        let db = CacheDb::open_in_memory().unwrap();
        let page_cache = Arc::new(db.page_cache());
        let fetcher = PageFetcher::new(page_cache.clone(), fast_config(4));

        let mut session =
            navigated(ScriptedSession::new(listing_script()).fail_open_always(DETAIL_URL)).await;
        let counters = session.counters();

        let err = fetcher.fetch(&mut session, DETAIL_URL).await.unwrap_err();

        match err {
            FetchError::RetriesExhausted { attempts, ref url, .. } => {
                assert_eq!(attempts, 4);
                assert_eq!(url, DETAIL_URL);
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        assert!(err.is_skippable());
        assert_eq!(counters.open.load(Ordering::Relaxed), 4);
        // Handoff happens on failure paths too
        assert_eq!(counters.switch_to_listing.load(Ordering::Relaxed), 4);
        // Nothing was cached for the failed URL
        assert!(!page_cache.has(DETAIL_URL).unwrap());
    }

    #[test]
    fn test_cache_errors_are_not_skippable() {
        let err = FetchError::Cache(CacheError::NotFound {
            url: DETAIL_URL.to_string(),
        });
        assert!(!err.is_skippable());
    }
}
