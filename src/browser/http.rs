//! HTTP-backed browsing session
//!
//! Emulates a tabbed browsing session over plain HTTP: the listing context
//! is the most recently navigated document, side tabs are independent GETs,
//! and "clicking" resolves the matched element's href against the current
//! listing URL and navigates to it. Dynamic rendering is out of scope; the
//! settle delays the crawler inserts after navigation cover the sites this
//! was built for.

use crate::browser::{BrowserError, BrowserResult, BrowserSession, TabHandle};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// A fetched document held by the session
struct Document {
    url: Url,
    body: String,
}

/// Browsing session backed by an HTTP client
pub struct HttpSession {
    client: Client,
    listing: Option<Document>,
    side_tabs: HashMap<TabHandle, Document>,
    next_tab_id: u64,
}

/// Builds the HTTP client used by [`HttpSession`]
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!("folio-fetch/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

impl HttpSession {
    /// Creates a session around an existing client
    ///
    /// Walkers running in parallel each get their own session but share one
    /// client (connection pooling).
    pub fn new(client: Client) -> Self {
        Self {
            client,
            listing: None,
            side_tabs: HashMap::new(),
            next_tab_id: 0,
        }
    }

    async fn get_document(&self, url: &str) -> BrowserResult<Document> {
        let parsed = Url::parse(url).map_err(|e| BrowserError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let response = self.client.get(parsed.clone()).send().await.map_err(|e| {
            BrowserError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| BrowserError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(Document {
            url: final_url,
            body,
        })
    }

    fn listing(&self) -> BrowserResult<&Document> {
        self.listing.as_ref().ok_or(BrowserError::NoListingLoaded)
    }
}

/// Resolves the `href` attributes of elements matching `selector`, in
/// document order, against `base_url`
///
/// Synchronous on purpose: `scraper::Html` is not `Send`, so parsing must
/// not be held across an await point.
fn select_hrefs(body: &str, base_url: &Url, selector: &str) -> BrowserResult<Vec<String>> {
    let parsed = Selector::parse(selector)
        .map_err(|e| BrowserError::Selector(format!("{selector}: {e}")))?;
    let document = Html::parse_document(body);

    let mut targets = Vec::new();
    for element in document.select(&parsed) {
        if let Some(href) = element.value().attr("href") {
            if let Ok(absolute) = base_url.join(href.trim()) {
                targets.push(absolute.to_string());
            }
        }
    }
    Ok(targets)
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        tracing::debug!("Navigating listing context to {}", url);
        self.listing = Some(self.get_document(url).await?);
        Ok(())
    }

    async fn open(&mut self, url: &str) -> BrowserResult<TabHandle> {
        tracing::debug!("Opening side tab for {}", url);
        let doc = self.get_document(url).await?;
        let handle = TabHandle(self.next_tab_id);
        self.next_tab_id += 1;
        self.side_tabs.insert(handle, doc);
        Ok(handle)
    }

    async fn read_content(&mut self, tab: &TabHandle) -> BrowserResult<String> {
        self.side_tabs
            .get(tab)
            .map(|doc| doc.body.clone())
            .ok_or(BrowserError::NoSuchTab(*tab))
    }

    async fn close(&mut self, tab: TabHandle) -> BrowserResult<()> {
        self.side_tabs
            .remove(&tab)
            .map(|_| ())
            .ok_or(BrowserError::NoSuchTab(tab))
    }

    async fn switch_to_listing(&mut self) -> BrowserResult<()> {
        // Focus is implicit over HTTP; the listing document just has to exist.
        self.listing().map(|_| ())
    }

    async fn click(&mut self, selector: &str) -> BrowserResult<bool> {
        let target = {
            let listing = self.listing()?;
            select_hrefs(&listing.body, &listing.url, selector)?
                .into_iter()
                .next()
        };

        match target {
            Some(url) => {
                self.navigate(&url).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn query_all(&mut self, selector: &str) -> BrowserResult<Vec<String>> {
        let listing = self.listing()?;
        select_hrefs(&listing.body, &listing.url, selector)
    }
}
