//! Record pipeline: the two-stage cache orchestration
//!
//! For each detail URL the pipeline checks the record cache, then the page
//! cache (via the fetcher), then extracts. At most one fetch+extract happens
//! per URL per cache lifetime. Cached records written before the source URL
//! field existed are repaired in place on load instead of forcing a
//! re-scrape.

use crate::browser::BrowserSession;
use crate::cache::Cache;
use crate::crawler::fetcher::PageFetcher;
use crate::extract::extract;
use crate::record::BookRecord;
use crate::{FolioError, Result};
use std::sync::Arc;

/// Orchestrates record cache, page cache, fetcher, and extractor
#[derive(Clone)]
pub struct RecordPipeline {
    fetcher: PageFetcher,
    record_cache: Arc<dyn Cache<BookRecord>>,
}

impl RecordPipeline {
    pub fn new(fetcher: PageFetcher, record_cache: Arc<dyn Cache<BookRecord>>) -> Self {
        Self {
            fetcher,
            record_cache,
        }
    }

    /// Resolves the record for one detail URL
    ///
    /// Returns `Ok(None)` when the URL's fetch exhausted its retry budget;
    /// one bad detail page never aborts the walk. Cache and infrastructure
    /// errors propagate.
    pub async fn get_record<S>(&self, session: &mut S, url: &str) -> Result<Option<BookRecord>>
    where
        S: BrowserSession + ?Sized,
    {
        if self.record_cache.has(url)? {
            let mut record = self.record_cache.get(url)?;

            if !record.is_complete() {
                // Schema repair: backfill the source URL and persist, no
                // re-fetch or re-extract needed
                record.source_url = url.to_string();
                self.record_cache.put(url, &record)?;
                tracing::debug!("Repaired cached record for {}", url);
            }

            return Ok(Some(record));
        }

        let raw_page = match self.fetcher.fetch(session, url).await {
            Ok(raw) => raw,
            Err(e) if e.is_skippable() => {
                tracing::warn!("Skipping {}: {}", url, e);
                return Ok(None);
            }
            Err(e) => return Err(FolioError::Fetch(e)),
        };

        let record = extract(&raw_page, url);
        self.record_cache.put(url, &record)?;

        Ok(Some(record))
    }
}
