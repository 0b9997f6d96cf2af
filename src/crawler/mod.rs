//! Crawler module for catalog walking and detail page processing
//!
//! This module contains the core crawling logic:
//! - Bounded-retry fetching of detail pages through a browsing session
//! - The record pipeline layering the record cache over the page cache
//! - The pagination-driven listing walker
//! - The top-level coordinator running walkers in parallel

mod coordinator;
mod fetcher;
mod pipeline;
mod retry;
mod walker;

pub use coordinator::{crawl, Coordinator};
pub use fetcher::{FetchError, PageFetcher};
pub use pipeline::RecordPipeline;
pub use retry::{with_retry, RetryFailure, RetryPolicy};
pub use walker::{ListingWalker, WalkState, BOOK_LINK_SELECTOR, NEXT_PAGE_SELECTOR};
