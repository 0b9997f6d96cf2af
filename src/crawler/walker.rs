//! Pagination-driven listing walker
//!
//! Drives one catalog entry point page by page, harvesting detail links and
//! resolving each through the record pipeline. The walker owns its browsing
//! session; everything within one walk is strictly sequential because
//! detail fetches borrow the session and hand it back before the walk
//! proceeds.

use crate::browser::BrowserSession;
use crate::config::CrawlerConfig;
use crate::crawler::pipeline::RecordPipeline;
use crate::record::BookRecord;
use crate::{FolioError, Result};

/// Selector for book detail links on a listing page
pub const BOOK_LINK_SELECTOR: &str = "h2 > a";

/// Selector for the next-page affordance
pub const NEXT_PAGE_SELECTOR: &str = "li.pagination-next > a";

/// Walker states over pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    /// Arriving on a listing page (initial navigation or after a click)
    LoadingPage,
    /// Collecting and resolving the detail links of the current page
    HarvestingLinks,
    /// Looking for the next-page affordance
    Advancing,
    /// No further page exists
    Done,
}

/// Walks one catalog entry point to exhaustion
pub struct ListingWalker<S: BrowserSession> {
    session: S,
    pipeline: RecordPipeline,
    config: CrawlerConfig,
}

impl<S: BrowserSession> ListingWalker<S> {
    pub fn new(session: S, pipeline: RecordPipeline, config: CrawlerConfig) -> Self {
        Self {
            session,
            pipeline,
            config,
        }
    }

    /// Walks the catalog starting at `entry_point`, returning every resolved
    /// record in page-then-link discovery order
    ///
    /// Duplicate detail links across pages are tolerated, not deduplicated;
    /// the record cache makes the repeats cheap. Failure to load the listing
    /// itself is fatal to this walker (and only this walker); failure of a
    /// single detail page is a logged skip.
    pub async fn walk(mut self, entry_point: &str) -> Result<Vec<BookRecord>> {
        let mut records = Vec::new();
        let mut pages_walked = 0u32;
        let mut state = WalkState::LoadingPage;

        tracing::info!("Walking catalog from {}", entry_point);

        loop {
            state = match state {
                WalkState::LoadingPage => {
                    if pages_walked == 0 {
                        self.session.navigate(entry_point).await.map_err(|e| {
                            FolioError::ListingUnavailable {
                                entry_point: entry_point.to_string(),
                                message: e.to_string(),
                            }
                        })?;
                    }
                    pages_walked += 1;
                    WalkState::HarvestingLinks
                }

                WalkState::HarvestingLinks => {
                    let links = self.session.query_all(BOOK_LINK_SELECTOR).await?;
                    tracing::debug!(
                        "Listing page {} of {}: {} detail links",
                        pages_walked,
                        entry_point,
                        links.len()
                    );

                    for link in &links {
                        if let Some(record) =
                            self.pipeline.get_record(&mut self.session, link).await?
                        {
                            records.push(record);
                        }
                    }
                    WalkState::Advancing
                }

                WalkState::Advancing => {
                    if self.session.click(NEXT_PAGE_SELECTOR).await? {
                        tokio::time::sleep(self.config.pagination_settle()).await;
                        WalkState::LoadingPage
                    } else {
                        WalkState::Done
                    }
                }

                WalkState::Done => {
                    tracing::info!(
                        "Finished {}: {} records over {} pages",
                        entry_point,
                        records.len(),
                        pages_walked
                    );
                    return Ok(records);
                }
            };
        }
    }
}
