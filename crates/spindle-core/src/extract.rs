//! Link extractor
//!
//! Drives one browser session against the board's search page and reduces
//! the rendered anchors to the distinct candidate album links.
//!
//! ## Resource Scope
//!
//! ```text
//! open ─► navigate ─► wait_for_ready (bounded) ─► snapshot ─► close
//!   │          │                │                     │         ▲
//!   └──────────┴────── error ───┴──── timeout ────────┴─────────┘
//! ```
//!
//! The session is closed on every path out of [`LinkExtractor::extract`].

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::BoardConfig;
use crate::error::{Error, Result};
use crate::traits::{BrowserDriver, BrowserSession, PageSnapshot};

/// Reduce a page snapshot to distinct candidate album links
///
/// Keeps hrefs containing `marker`, trims whitespace, drops empties and
/// duplicates. First-seen order is kept so batches are reproducible.
pub fn extract_album_links(snapshot: &PageSnapshot, marker: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    snapshot
        .hrefs
        .iter()
        .map(|href| href.trim())
        .filter(|href| !href.is_empty() && href.contains(marker))
        .filter(|href| seen.insert(href.to_string()))
        .map(str::to_string)
        .collect()
}

/// Scoped board scraper
pub struct LinkExtractor<'a> {
    driver: &'a dyn BrowserDriver,
    board: &'a BoardConfig,
}

impl<'a> LinkExtractor<'a> {
    pub fn new(driver: &'a dyn BrowserDriver, board: &'a BoardConfig) -> Self {
        Self { driver, board }
    }

    /// Scrape the board and return the distinct candidate links
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<String>)`: Possibly empty list of links, in first-seen order
    /// - `Err(Error)`: Launch, navigation or extraction failure, or the
    ///   ready wait exceeded `ready_timeout_secs`. All are fatal for a batch.
    pub async fn extract(&self) -> Result<Vec<String>> {
        debug!(
            "Opening {} session for {}",
            self.driver.driver_name(),
            self.board.search_url
        );
        let session = self.driver.open().await?;

        let outcome = self.scrape(session.as_ref()).await;

        // Teardown must run on every path, including errors and timeouts
        if let Err(e) = session.close().await {
            warn!("Failed to close browser session: {}", e);
        }

        let snapshot = outcome?;
        let links = extract_album_links(&snapshot, &self.board.album_link_marker);
        info!(
            "Extracted {} candidate link(s) from {} anchor(s)",
            links.len(),
            snapshot.hrefs.len()
        );
        Ok(links)
    }

    async fn scrape(&self, session: &dyn BrowserSession) -> Result<PageSnapshot> {
        session.navigate(&self.board.search_url).await?;

        let timeout = Duration::from_secs(self.board.ready_timeout_secs);
        match tokio::time::timeout(timeout, session.wait_for_ready(&self.board.ready_selector))
            .await
        {
            Ok(ready) => ready?,
            Err(_) => {
                return Err(Error::timeout(format!(
                    "Results area '{}' not ready after {:?}",
                    self.board.ready_selector, timeout
                )));
            }
        }

        session.snapshot().await
    }
}
