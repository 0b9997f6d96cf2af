//! Scripted in-memory browsing session
//!
//! A deterministic [`BrowserSession`] driven by a fixed script of listing
//! pages and detail page bodies, with per-URL failure injection. Unit and
//! integration tests use it to exercise the crawler without any network.

use crate::browser::{BrowserError, BrowserResult, BrowserSession, TabHandle};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Call counters shared out of a [`ScriptedSession`]
///
/// Kept behind an `Arc` so tests can inspect activity after the session has
/// been moved into a walker or coordinator task.
#[derive(Debug, Default)]
pub struct SessionCounters {
    pub navigate: AtomicU32,
    pub open: AtomicU32,
    pub read: AtomicU32,
    pub close: AtomicU32,
    pub switch_to_listing: AtomicU32,
    pub click: AtomicU32,
}

impl SessionCounters {
    /// Total side-tab network activity (opens + reads)
    pub fn side_fetches(&self) -> u32 {
        self.open.load(Ordering::Relaxed) + self.read.load(Ordering::Relaxed)
    }
}

/// Deterministic scripted browsing session
pub struct ScriptedSession {
    /// Listing pages in pagination order; each is the detail links it shows
    pages: Vec<Vec<String>>,
    /// Bodies served for detail URLs; unlisted URLs get a synthesized body
    detail_bodies: HashMap<String, String>,
    /// Remaining `open` failures per URL (`u32::MAX` means always fail)
    fail_open: HashMap<String, u32>,
    fail_navigate: bool,
    current_page: Option<usize>,
    open_tabs: HashMap<TabHandle, String>,
    next_tab_id: u64,
    counters: Arc<SessionCounters>,
}

impl ScriptedSession {
    /// Creates a session scripted with the given listing pages
    pub fn new(pages: Vec<Vec<String>>) -> Self {
        Self {
            pages,
            detail_bodies: HashMap::new(),
            fail_open: HashMap::new(),
            fail_navigate: false,
            current_page: None,
            open_tabs: HashMap::new(),
            next_tab_id: 0,
            counters: Arc::new(SessionCounters::default()),
        }
    }

    /// Serves `body` for the given detail URL
    pub fn with_detail_body(mut self, url: &str, body: &str) -> Self {
        self.detail_bodies.insert(url.to_string(), body.to_string());
        self
    }

    /// Makes the first `times` opens of `url` fail with a navigation error
    pub fn fail_open_times(mut self, url: &str, times: u32) -> Self {
        self.fail_open.insert(url.to_string(), times);
        self
    }

    /// Makes every open of `url` fail
    pub fn fail_open_always(self, url: &str) -> Self {
        self.fail_open_times(url, u32::MAX)
    }

    /// Makes listing navigation fail
    pub fn fail_navigation(mut self) -> Self {
        self.fail_navigate = true;
        self
    }

    /// Handle to this session's call counters
    pub fn counters(&self) -> Arc<SessionCounters> {
        Arc::clone(&self.counters)
    }

    fn current_links(&self) -> BrowserResult<&Vec<String>> {
        let index = self.current_page.ok_or(BrowserError::NoListingLoaded)?;
        Ok(&self.pages[index])
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        self.counters.navigate.fetch_add(1, Ordering::Relaxed);
        if self.fail_navigate || self.pages.is_empty() {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "scripted navigation failure".to_string(),
            });
        }
        self.current_page = Some(0);
        Ok(())
    }

    async fn open(&mut self, url: &str) -> BrowserResult<TabHandle> {
        self.counters.open.fetch_add(1, Ordering::Relaxed);
        if let Some(remaining) = self.fail_open.get_mut(url) {
            if *remaining > 0 {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                return Err(BrowserError::Navigation {
                    url: url.to_string(),
                    message: "scripted open failure".to_string(),
                });
            }
        }

        let handle = TabHandle(self.next_tab_id);
        self.next_tab_id += 1;
        self.open_tabs.insert(handle, url.to_string());
        Ok(handle)
    }

    async fn read_content(&mut self, tab: &TabHandle) -> BrowserResult<String> {
        self.counters.read.fetch_add(1, Ordering::Relaxed);
        let url = self
            .open_tabs
            .get(tab)
            .ok_or(BrowserError::NoSuchTab(*tab))?;

        Ok(self
            .detail_bodies
            .get(url)
            .cloned()
            .unwrap_or_else(|| synthesized_detail_body(url)))
    }

    async fn close(&mut self, tab: TabHandle) -> BrowserResult<()> {
        self.counters.close.fetch_add(1, Ordering::Relaxed);
        self.open_tabs
            .remove(&tab)
            .map(|_| ())
            .ok_or(BrowserError::NoSuchTab(tab))
    }

    async fn switch_to_listing(&mut self) -> BrowserResult<()> {
        self.counters
            .switch_to_listing
            .fetch_add(1, Ordering::Relaxed);
        if self.current_page.is_none() {
            return Err(BrowserError::NoListingLoaded);
        }
        Ok(())
    }

    async fn click(&mut self, _selector: &str) -> BrowserResult<bool> {
        self.counters.click.fetch_add(1, Ordering::Relaxed);
        let index = self.current_page.ok_or(BrowserError::NoListingLoaded)?;
        if index + 1 < self.pages.len() {
            self.current_page = Some(index + 1);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn query_all(&mut self, _selector: &str) -> BrowserResult<Vec<String>> {
        Ok(self.current_links()?.clone())
    }
}

/// Builds a plausible detail page body for a scripted URL
///
/// The book name is derived from the last URL path segment so extraction
/// produces distinct, predictable records.
pub fn synthesized_detail_body(url: &str) -> String {
    let slug = url.rsplit('/').next().unwrap_or("book");
    format!(
        "<html><body><ul>\
         <li><strong>Full Book Name:</strong> {slug}</li>\
         <li><strong>Author Name:</strong> Author of {slug}</li>\
         <li><strong>Edition Language:</strong> <span>English</span></li>\
         </ul></body></html>"
    )
}
