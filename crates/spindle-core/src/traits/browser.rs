// # Browser Automation Traits
//
// Defines the interface for driving a headless browser against the
// discussion board.
//
// ## Split of Responsibilities
//
// The driver only knows how to navigate, wait and take a snapshot of the
// page's anchors. Deciding which anchors are candidate album links is a pure
// function in `crate::extract`, so it can be tested without a browser.
//
// ## Implementations
//
// - chromiumoxide: `spindle-board-chromium` crate
//
// ## Usage
//
// ```rust,ignore
// let session = driver.open().await?;
// let outcome = async {
//     session.navigate(url).await?;
//     session.wait_for_ready("main").await?;
//     session.snapshot().await
// }
// .await;
// session.close().await?; // on every path
// ```

use async_trait::async_trait;

/// Anchors observed on a rendered page
///
/// `hrefs` holds the `href` of every anchor in document order. Values are
/// taken as the browser resolved them, so relative links are absolute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    pub url: String,
    pub hrefs: Vec<String>,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>, hrefs: Vec<String>) -> Self {
        Self {
            url: url.into(),
            hrefs,
        }
    }
}

/// Factory for isolated browser sessions
///
/// # Trust Level: Untrusted
///
/// Drivers spawn OS processes. Each call to [`BrowserDriver::open`] MUST
/// produce a fresh, isolated context (no cookies or storage shared with other
/// sessions), and the returned session owns that context.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Launch or attach to a browser and open an isolated page
    async fn open(&self) -> Result<Box<dyn BrowserSession>, crate::Error>;

    /// Driver name (for logging/debugging)
    fn driver_name(&self) -> &'static str;
}

/// One isolated browser page
///
/// # Lifecycle
///
/// The caller MUST call [`BrowserSession::close`] exactly once on every exit
/// path. Implementations should still release their resources on drop if
/// `close` was never reached (panic unwinding, cancelled futures).
///
/// # Cancellation
///
/// [`BrowserSession::wait_for_ready`] may wait indefinitely; callers bound it
/// with a timeout, so it must be cancel-safe.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate to a URL and wait for the initial load
    async fn navigate(&self, url: &str) -> Result<(), crate::Error>;

    /// Block until an element matching `selector` is present
    async fn wait_for_ready(&self, selector: &str) -> Result<(), crate::Error>;

    /// Collect the `href` of every anchor currently on the page
    async fn snapshot(&self) -> Result<PageSnapshot, crate::Error>;

    /// Tear down the page and its browser context
    async fn close(&self) -> Result<(), crate::Error>;
}
