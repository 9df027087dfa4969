// # Chromium Board Driver
//
// This crate provides a headless Chromium implementation of the browser
// traits for the spindle ingestion pipeline, built on chromiumoxide.
//
// ## Resource Model
//
// One `open()` launches one browser process with one page. The session owns
// both, plus the task driving the CDP handler. Cleanup has two paths:
//
// 1. Explicit async `close()`: preferred, errors are reported
// 2. Drop fallback: spawns the same shutdown on the captured runtime handle
//
// chromiumoxide's `Page` has no Drop implementation, so without the fallback
// a panic between `open()` and `close()` would leak the browser process.
//
// ## Trust Level: Untrusted (Browser Driver)
//
// The driver only navigates, waits and reads anchors. It never decides
// whether a failure is fatal; `LinkExtractor` in spindle-core does.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use spindle_core::traits::{BrowserDriver, BrowserSession, PageSnapshot};
use spindle_core::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Poll interval while waiting for the ready selector
const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Collects every anchor's resolved href on the rendered page
const ANCHOR_SNAPSHOT_JS: &str =
    "Array.from(document.querySelectorAll('a[href]')).map(a => a.href)";

/// Headless Chromium driver
#[derive(Debug, Clone)]
pub struct ChromiumDriver {
    /// Browser binary; auto-detected when `None`
    executable: Option<PathBuf>,

    /// Run without a visible window
    headless: bool,
}

impl ChromiumDriver {
    /// Create a headless driver
    ///
    /// # Parameters
    ///
    /// - `executable`: Path to a Chrome/Chromium binary, or `None` to auto-detect
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self {
            executable,
            headless: true,
        }
    }

    /// Show the browser window (local debugging)
    pub fn with_head(mut self) -> Self {
        self.headless = false;
        self
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder().arg("--incognito");
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        if !self.headless {
            builder = builder.with_head();
        }
        builder
            .build()
            .map_err(|e| Error::browser(format!("Invalid browser configuration: {}", e)))
    }
}

impl Default for ChromiumDriver {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        let config = self.browser_config()?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::browser(format!("Failed to launch browser: {}", e)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                if let Err(close_err) = browser.close().await {
                    warn!("Failed to close browser after page error: {}", close_err);
                }
                handler_task.abort();
                return Err(Error::browser(format!("Failed to open page: {}", e)));
            }
        };

        debug!("Chromium session opened");
        Ok(Box::new(ChromiumSession {
            live: Mutex::new(Some(LiveBrowser {
                browser,
                page,
                handler_task,
            })),
            runtime_handle: tokio::runtime::Handle::current(),
        }))
    }

    fn driver_name(&self) -> &'static str {
        "chromium"
    }
}

/// Browser process, page and handler task for one session
struct LiveBrowser {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl LiveBrowser {
    async fn shutdown(mut self) -> Result<()> {
        if let Err(e) = self.page.close().await {
            warn!("Failed to close page: {}", e);
        }

        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| Error::browser(format!("Failed to close browser: {}", e)));

        if let Err(e) = self.browser.wait().await {
            warn!("Failed to reap browser process: {}", e);
        }
        self.handler_task.abort();

        closed
    }
}

/// One scoped browser session
///
/// Every method fails with [`Error::Browser`] once the session is closed.
pub struct ChromiumSession {
    live: Mutex<Option<LiveBrowser>>,
    runtime_handle: tokio::runtime::Handle,
}

impl ChromiumSession {
    async fn page(&self) -> Result<Page> {
        self.live
            .lock()
            .await
            .as_ref()
            .map(|live| live.page.clone())
            .ok_or_else(|| Error::browser("Browser session already closed"))
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        self.page()
            .await?
            .goto(url)
            .await
            .map(|_| ())
            .map_err(|e| Error::browser(format!("Navigation to {} failed: {}", url, e)))
    }

    async fn wait_for_ready(&self, selector: &str) -> Result<()> {
        let page = self.page().await?;
        // Unbounded here; the caller applies the timeout
        loop {
            if page.find_element(selector).await.is_ok() {
                debug!("Ready selector '{}' present", selector);
                return Ok(());
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    async fn snapshot(&self) -> Result<PageSnapshot> {
        let page = self.page().await?;

        let url = page
            .url()
            .await
            .map_err(|e| Error::browser(format!("Failed to read page URL: {}", e)))?
            .unwrap_or_default();

        let hrefs = page
            .evaluate(ANCHOR_SNAPSHOT_JS)
            .await
            .map_err(|e| Error::browser(format!("Anchor extraction failed: {}", e)))?
            .into_value::<Vec<String>>()
            .map_err(|e| Error::browser(format!("Unexpected anchor payload: {}", e)))?;

        Ok(PageSnapshot::new(url, hrefs))
    }

    async fn close(&self) -> Result<()> {
        match self.live.lock().await.take() {
            Some(live) => {
                let result = live.shutdown().await;
                debug!("Chromium session closed");
                result
            }
            None => Ok(()),
        }
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if let Some(live) = self.live.get_mut().take() {
            warn!("Chromium session dropped without close, cleaning up in background");
            self.runtime_handle.spawn(async move {
                if let Err(e) = live.shutdown().await {
                    warn!("Background browser cleanup failed: {}", e);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_name() {
        assert_eq!(ChromiumDriver::default().driver_name(), "chromium");
    }

    #[test]
    fn test_headless_by_default() {
        let driver = ChromiumDriver::new(Some(PathBuf::from("/usr/bin/chromium")));
        assert!(driver.headless);
        assert!(!driver.with_head().headless);
    }

    #[test]
    fn test_snapshot_script_reads_resolved_hrefs() {
        assert!(ANCHOR_SNAPSHOT_JS.contains("a[href]"));
        assert!(ANCHOR_SNAPSHOT_JS.contains("a.href"));
    }

    #[tokio::test]
    #[ignore = "requires a Chromium binary"]
    async fn test_open_and_close_real_browser() {
        let session = ChromiumDriver::default().open().await.unwrap();
        session.navigate("about:blank").await.unwrap();
        session.wait_for_ready("body").await.unwrap();
        let snapshot = session.snapshot().await.unwrap();
        assert!(snapshot.hrefs.is_empty());
        session.close().await.unwrap();

        // Closed sessions refuse further work
        assert!(session.navigate("about:blank").await.is_err());
    }
}
