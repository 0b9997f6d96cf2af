//! Browsing session collaborator
//!
//! The crawler core consumes a stateful browsing session through the
//! [`BrowserSession`] trait rather than talking to any rendering engine
//! directly. A session owns one shared "listing" context that pagination
//! happens in, plus transient side tabs for detail page fetches. Every side
//! fetch must hand control back to the listing context before the walker
//! proceeds, on success and failure paths both.

mod http;
mod scripted;

pub use http::{build_http_client, HttpSession};
pub use scripted::{ScriptedSession, SessionCounters};

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a browsing session
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("No open tab for handle {0:?}")]
    NoSuchTab(TabHandle),

    #[error("No listing page loaded in this session")]
    NoListingLoaded,

    #[error("Invalid selector: {0}")]
    Selector(String),
}

/// Result type for browser operations
pub type BrowserResult<T> = Result<T, BrowserError>;

/// Opaque handle to an open side tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabHandle(pub(crate) u64);

/// A stateful browsing session with one listing context and side tabs
///
/// Methods take `&mut self`: a session is owned by exactly one listing
/// walker and all activity within it is sequential. Parallelism happens
/// across sessions, never within one.
#[async_trait]
pub trait BrowserSession: Send {
    /// Points the shared listing context at a URL
    async fn navigate(&mut self, url: &str) -> BrowserResult<()>;

    /// Opens a detail URL in a new side tab and focuses it
    async fn open(&mut self, url: &str) -> BrowserResult<TabHandle>;

    /// Reads the rendered content of an open side tab
    async fn read_content(&mut self, tab: &TabHandle) -> BrowserResult<String>;

    /// Closes a side tab
    async fn close(&mut self, tab: TabHandle) -> BrowserResult<()>;

    /// Returns focus to the shared listing context
    async fn switch_to_listing(&mut self) -> BrowserResult<()>;

    /// Clicks the first element matching `selector` on the listing page
    ///
    /// Returns `false` when nothing matches; the pagination walker uses this
    /// to detect the end of the catalog.
    async fn click(&mut self, selector: &str) -> BrowserResult<bool>;

    /// Collects the link targets of every element matching `selector` on the
    /// listing page, in document order
    async fn query_all(&mut self, selector: &str) -> BrowserResult<Vec<String>>;
}
