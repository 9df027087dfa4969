//! Test doubles and common utilities for pipeline contract tests
//!
//! Every double counts its calls through shared `Arc<AtomicUsize>` counters
//! so a test can hand one copy to the engine and keep another for asserts.

#![allow(dead_code)]

use async_trait::async_trait;
use spindle_core::catalog::{RawExternalUrls, RawTrack, RawTrackPage};
use spindle_core::config::{BoardConfig, CatalogConfig, EngineConfig, IngestConfig, StoreConfig};
use spindle_core::error::{Error, Result};
use spindle_core::traits::{
    ArtistSummary, BrowserDriver, BrowserSession, CatalogClient, Identity, PageSnapshot,
    ReleaseStore, Role, SessionResolver, StoredRelease, TokenIssuer, UpsertOutcome,
};
use spindle_core::{AlbumRecord, BearerToken, IngestEngine, IngestEvent, MemoryReleaseStore};
use spindle_core::{RawAlbum, RawArtist};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

pub const ADMIN_HEADER: &str = "Bearer admin-token";
pub const MEMBER_HEADER: &str = "Bearer member-token";

/// Resolves two fixed session tokens, rejects everything else
pub struct MockSessionResolver {
    resolve_count: Arc<AtomicUsize>,
}

impl MockSessionResolver {
    pub fn new() -> Self {
        Self {
            resolve_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn resolve_count(&self) -> usize {
        self.resolve_count.load(Ordering::SeqCst)
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            resolve_count: other.resolve_count.clone(),
        }
    }
}

#[async_trait]
impl SessionResolver for MockSessionResolver {
    async fn resolve(&self, token: &str) -> Result<Identity> {
        self.resolve_count.fetch_add(1, Ordering::SeqCst);
        match token {
            "admin-token" => Ok(Identity::new("admin-1", Role::Admin)),
            "member-token" => Ok(Identity::new("member-1", Role::Member)),
            _ => Err(Error::unauthenticated("Unknown session")),
        }
    }
}

/// How the mock browser session behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserBehavior {
    /// Page renders and yields the configured anchors
    Render,
    /// Results area never appears
    NeverReady,
    /// Navigation fails
    NavigationError,
    /// Browser cannot be launched at all
    LaunchError,
}

/// Browser driver serving a fixed anchor list
pub struct MockBrowserDriver {
    hrefs: Vec<String>,
    behavior: BrowserBehavior,
    open_count: Arc<AtomicUsize>,
    close_count: Arc<AtomicUsize>,
}

impl MockBrowserDriver {
    pub fn new(hrefs: Vec<String>) -> Self {
        Self::with_behavior(hrefs, BrowserBehavior::Render)
    }

    pub fn with_behavior(hrefs: Vec<String>, behavior: BrowserBehavior) -> Self {
        Self {
            hrefs,
            behavior,
            open_count: Arc::new(AtomicUsize::new(0)),
            close_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn open_count(&self) -> usize {
        self.open_count.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            hrefs: other.hrefs.clone(),
            behavior: other.behavior,
            open_count: other.open_count.clone(),
            close_count: other.close_count.clone(),
        }
    }
}

#[async_trait]
impl BrowserDriver for MockBrowserDriver {
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        self.open_count.fetch_add(1, Ordering::SeqCst);
        if self.behavior == BrowserBehavior::LaunchError {
            return Err(Error::browser("failed to launch browser"));
        }
        Ok(Box::new(MockBrowserSession {
            hrefs: self.hrefs.clone(),
            behavior: self.behavior,
            close_count: self.close_count.clone(),
        }))
    }

    fn driver_name(&self) -> &'static str {
        "mock"
    }
}

struct MockBrowserSession {
    hrefs: Vec<String>,
    behavior: BrowserBehavior,
    close_count: Arc<AtomicUsize>,
}

#[async_trait]
impl BrowserSession for MockBrowserSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        if self.behavior == BrowserBehavior::NavigationError {
            return Err(Error::browser(format!("net::ERR_NAME_NOT_RESOLVED at {}", url)));
        }
        Ok(())
    }

    async fn wait_for_ready(&self, _selector: &str) -> Result<()> {
        if self.behavior == BrowserBehavior::NeverReady {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn snapshot(&self) -> Result<PageSnapshot> {
        Ok(PageSnapshot::new("https://board.test/search", self.hrefs.clone()))
    }

    async fn close(&self) -> Result<()> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Token issuer handing out `token-1`, `token-2`, ...
pub struct MockTokenIssuer {
    fail: bool,
    issue_count: Arc<AtomicUsize>,
}

impl MockTokenIssuer {
    pub fn new() -> Self {
        Self {
            fail: false,
            issue_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn issue_count(&self) -> usize {
        self.issue_count.load(Ordering::SeqCst)
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            fail: other.fail,
            issue_count: other.issue_count.clone(),
        }
    }
}

#[async_trait]
impl TokenIssuer for MockTokenIssuer {
    async fn issue_token(&self) -> Result<BearerToken> {
        let n = self.issue_count.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(Error::token_exchange("token endpoint returned 400 Bad Request"));
        }
        Ok(BearerToken::new(format!("token-{}", n), Some(3600)))
    }
}

/// Catalog serving a fixed id → album map; unknown ids are 404s
pub struct MockCatalog {
    albums: Arc<HashMap<String, RawAlbum>>,
    rejected_token: Option<String>,
    fetch_count: Arc<AtomicUsize>,
    search_count: Arc<AtomicUsize>,
}

impl MockCatalog {
    pub fn new(albums: Vec<RawAlbum>) -> Self {
        let albums = albums
            .into_iter()
            .filter_map(|album| album.id.clone().map(|id| (id, album)))
            .collect();
        Self {
            albums: Arc::new(albums),
            rejected_token: None,
            fetch_count: Arc::new(AtomicUsize::new(0)),
            search_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Answer 401 whenever this token value is presented
    pub fn rejecting_token(mut self, token: &str) -> Self {
        self.rejected_token = Some(token.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn search_count(&self) -> usize {
        self.search_count.load(Ordering::SeqCst)
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            albums: other.albums.clone(),
            rejected_token: other.rejected_token.clone(),
            fetch_count: other.fetch_count.clone(),
            search_count: other.search_count.clone(),
        }
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    async fn fetch_album(&self, album_id: &str, token: &BearerToken) -> Result<RawAlbum> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if self.rejected_token.as_deref() == Some(token.secret()) {
            return Err(Error::catalog_auth("The access token expired"));
        }
        self.albums
            .get(album_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("album {}", album_id)))
    }

    async fn search_artists(
        &self,
        name: &str,
        limit: u8,
        _token: &BearerToken,
    ) -> Result<Vec<ArtistSummary>> {
        self.search_count.fetch_add(1, Ordering::SeqCst);
        Ok((0..limit.min(2))
            .map(|i| ArtistSummary {
                id: format!("artist-{}", i),
                name: format!("{} {}", name, i),
                genres: Vec::new(),
                image_url: None,
                external_url: None,
                followers: None,
            })
            .collect())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Memory store with call counting and an optional poisoned key
pub struct MockReleaseStore {
    inner: MemoryReleaseStore,
    fail_on: Option<String>,
    upsert_count: Arc<AtomicUsize>,
}

impl MockReleaseStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryReleaseStore::new(),
            fail_on: None,
            upsert_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail every upsert for this external URL
    pub fn failing_on(mut self, external_url: &str) -> Self {
        self.fail_on = Some(external_url.to_string());
        self
    }

    pub fn upsert_count(&self) -> usize {
        self.upsert_count.load(Ordering::SeqCst)
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            inner: other.inner.clone(),
            fail_on: other.fail_on.clone(),
            upsert_count: other.upsert_count.clone(),
        }
    }
}

#[async_trait]
impl ReleaseStore for MockReleaseStore {
    async fn upsert_release(&self, record: &AlbumRecord) -> Result<UpsertOutcome> {
        self.upsert_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.as_deref() == Some(record.external_url.as_str()) {
            return Err(Error::store("UNIQUE constraint failed: releases.external_url"));
        }
        self.inner.upsert_release(record).await
    }

    async fn get_release(&self, external_url: &str) -> Result<Option<StoredRelease>> {
        self.inner.get_release(external_url).await
    }

    async fn count_releases(&self) -> Result<usize> {
        self.inner.count_releases().await
    }

    async fn list_releases(&self) -> Result<Vec<String>> {
        self.inner.list_releases().await
    }

    async fn delete_release(&self, external_url: &str) -> Result<()> {
        self.inner.delete_release(external_url).await
    }
}

/// All doubles for one engine, with counters kept on this side
pub struct Rig {
    pub sessions: MockSessionResolver,
    pub browser: MockBrowserDriver,
    pub issuer: MockTokenIssuer,
    pub catalog: MockCatalog,
    pub store: MockReleaseStore,
    pub config: IngestConfig,
}

impl Rig {
    /// Board serving `hrefs`, catalog knowing `albums`
    pub fn new(hrefs: Vec<String>, albums: Vec<RawAlbum>) -> Self {
        Self {
            sessions: MockSessionResolver::new(),
            browser: MockBrowserDriver::new(hrefs),
            issuer: MockTokenIssuer::new(),
            catalog: MockCatalog::new(albums),
            store: MockReleaseStore::new(),
            config: minimal_config(),
        }
    }

    pub fn engine(&self) -> (IngestEngine, mpsc::Receiver<IngestEvent>) {
        IngestEngine::new(
            Box::new(MockSessionResolver::sharing_counters_with(&self.sessions)),
            Box::new(MockBrowserDriver::sharing_counters_with(&self.browser)),
            Box::new(MockTokenIssuer::sharing_counters_with(&self.issuer)),
            Box::new(MockCatalog::sharing_counters_with(&self.catalog)),
            Box::new(MockReleaseStore::sharing_counters_with(&self.store)),
            self.config.clone(),
        )
        .expect("engine construction succeeds")
    }
}

/// Minimal config: memory store, one second ready timeout
pub fn minimal_config() -> IngestConfig {
    IngestConfig {
        board: BoardConfig {
            search_url: "https://board.test/search?q=album".to_string(),
            ready_timeout_secs: 1,
            ..BoardConfig::default()
        },
        catalog: CatalogConfig::spotify("test-client", "test-secret"),
        store: StoreConfig::Memory,
        engine: EngineConfig::default(),
    }
}

pub fn album_link(id: &str) -> String {
    format!("https://open.spotify.com/album/{}", id)
}

/// A complete raw album with `track_count` tracks
pub fn raw_album(id: &str, title: &str, track_count: usize) -> RawAlbum {
    let artist = RawArtist {
        name: Some("Test Artist".to_string()),
        ..Default::default()
    };

    RawAlbum {
        id: Some(id.to_string()),
        name: Some(title.to_string()),
        album_type: Some("album".to_string()),
        images: Vec::new(),
        genres: Vec::new(),
        external_urls: RawExternalUrls {
            spotify: Some(album_link(id)),
        },
        release_date: Some("2024-01-01".to_string()),
        artists: vec![artist.clone()],
        tracks: RawTrackPage {
            items: (1..=track_count)
                .map(|n| RawTrack {
                    name: Some(format!("{} track {}", title, n)),
                    track_number: Some(n as u32),
                    duration_ms: Some(180_000),
                    preview_url: None,
                    artists: vec![artist.clone()],
                })
                .collect(),
            total: Some(track_count as u32),
        },
    }
}

/// Drain every event currently buffered
pub fn drain_events(rx: &mut mpsc::Receiver<IngestEvent>) -> Vec<IngestEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
