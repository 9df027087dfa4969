//! Batch ingestion engine
//!
//! The IngestEngine is responsible for:
//! - Authorizing the caller via SessionResolver
//! - Scraping candidate links via BrowserDriver
//! - Issuing one catalog bearer token per batch
//! - Resolving, normalizing and upserting each link in order
//!
//! ## Architecture
//!
//! ```text
//!                  ┌──────────────────┐
//!   Authorization ─► IngestEngine     │
//!                  └──────────────────┘
//!                           │
//!     ┌──────────────┬──────┴───────┬────────────────┬──────────────┐
//!     ▼              ▼              ▼                ▼              ▼
//! ┌─────────┐  ┌───────────┐  ┌────────────┐  ┌──────────────┐  ┌────────┐
//! │ Session │  │ Browser   │  │ Token      │  │ Catalog      │  │ Events │
//! │Resolver │  │ Driver    │  │ Issuer     │  │ + Store      │  │(notify)│
//! └─────────┘  └───────────┘  └────────────┘  └──────────────┘  └────────┘
//! ```
//!
//! ## Batch State Machine
//!
//! ```text
//! Idle → Authorizing → Extracting → TokenFetch → ProcessingLinks(i) → Done
//!             │             │            │
//!             └─────────────┴────────────┴──► Fatal
//! ```
//!
//! A failure while processing a link marks that link failed and moves on.
//! It never moves the batch to `Fatal`.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::catalog::BearerToken;
use crate::config::{BoardConfig, IngestConfig};
use crate::error::{Error, Result};
use crate::extract::LinkExtractor;
use crate::guard::AccessGuard;
use crate::normalize::normalize_album;
use crate::release::AlbumRecord;
use crate::resolve::resolve_album;
use crate::traits::{
    ArtistSummary, BrowserDriver, CatalogClient, Identity, ReleaseStore, SessionResolver,
    TokenIssuer, UpsertOutcome,
};

/// Upper bound accepted by the catalog's search endpoint
const MAX_SEARCH_LIMIT: u8 = 50;

/// Stage of a single batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStage {
    Idle,
    Authorizing,
    Extracting,
    TokenFetch,
    /// Processing link `index` (0-based) of `total`
    ProcessingLinks { index: usize, total: usize },
    Done,
    Fatal,
}

impl std::fmt::Display for BatchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchStage::Idle => write!(f, "idle"),
            BatchStage::Authorizing => write!(f, "authorizing"),
            BatchStage::Extracting => write!(f, "extracting"),
            BatchStage::TokenFetch => write!(f, "token_fetch"),
            BatchStage::ProcessingLinks { index, total } => {
                write!(f, "processing_links({}/{})", index + 1, total)
            }
            BatchStage::Done => write!(f, "done"),
            BatchStage::Fatal => write!(f, "fatal"),
        }
    }
}

/// Events emitted by the IngestEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestEvent {
    /// Batch moved to a new stage
    StageChanged { stage: BatchStage },

    /// Link resolved, normalized and stored
    LinkImported {
        url: String,
        title: String,
        outcome: UpsertOutcome,
    },

    /// Link failed at resolve, normalize or store
    LinkFailed { url: String, error: String },

    /// Every candidate link was processed
    BatchCompleted { imported: usize, failed: usize },

    /// Batch stopped before link processing
    BatchAborted { stage: BatchStage, error: String },
}

/// Outcome of one batch run
///
/// Built fresh per run and never persisted.
/// `imported_count + failed_count` always equals the number of candidate links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub imported_count: usize,
    pub failed_count: usize,
    /// Titles of imported albums, in processing order
    pub imported_albums: Vec<String>,
    /// Candidate link URLs that failed, in processing order
    pub failed_albums: Vec<String>,
}

impl BatchResult {
    fn record_imported(&mut self, title: String) {
        self.imported_count += 1;
        self.imported_albums.push(title);
    }

    fn record_failed(&mut self, url: String) {
        self.failed_count += 1;
        self.failed_albums.push(url);
    }

    /// Number of candidate links the batch processed
    pub fn total(&self) -> usize {
        self.imported_count + self.failed_count
    }
}

/// Core ingestion engine
///
/// One engine serves many batches. Each call to [`IngestEngine::run_batch`]
/// is an independent run; concurrent runs are not coordinated, the store's
/// uniqueness key makes their end state converge.
///
/// ## Lifecycle
///
/// 1. Create with [`IngestEngine::new()`]
/// 2. Call [`IngestEngine::run_batch()`] per administrator request
/// 3. Drain the event receiver for monitoring (optional)
///
/// ## Load Resistance
///
/// Events go through a bounded channel with `try_send`. When the channel is
/// full the event is dropped with a warning; a batch never waits on a slow
/// consumer.
pub struct IngestEngine {
    /// Session lookup for the access guard
    sessions: Box<dyn SessionResolver>,

    /// Headless browser for board scraping
    browser: Box<dyn BrowserDriver>,

    /// Client-credentials exchange
    token_issuer: Box<dyn TokenIssuer>,

    /// Album and artist lookups
    catalog: Box<dyn CatalogClient>,

    /// Release persistence
    store: Box<dyn ReleaseStore>,

    /// Board scraping settings
    board: BoardConfig,

    /// Re-issue the token once per link on catalog 401/403
    refresh_token_on_unauthorized: bool,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<IngestEvent>,
}

impl IngestEngine {
    /// Create a new ingestion engine
    ///
    /// # Parameters
    ///
    /// - `sessions`: Session resolver implementation
    /// - `browser`: Browser driver implementation
    /// - `token_issuer`: Catalog token issuer
    /// - `catalog`: Catalog client
    /// - `store`: Release store implementation
    /// - `config`: Ingestion configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        sessions: Box<dyn SessionResolver>,
        browser: Box<dyn BrowserDriver>,
        token_issuer: Box<dyn TokenIssuer>,
        catalog: Box<dyn CatalogClient>,
        store: Box<dyn ReleaseStore>,
        config: IngestConfig,
    ) -> Result<(Self, mpsc::Receiver<IngestEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            sessions,
            browser,
            token_issuer,
            catalog,
            store,
            board: config.board,
            refresh_token_on_unauthorized: config.engine.refresh_token_on_unauthorized,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run one ingestion batch on behalf of the caller
    ///
    /// # Parameters
    ///
    /// - `authorization`: Raw `Authorization` header value, if any
    ///
    /// # Returns
    ///
    /// - `Ok(BatchResult)`: Every candidate link was processed; individual
    ///   link failures are listed in `failed_albums`
    /// - `Err(Error)`: Authorization, extraction or token failure. No link
    ///   was processed and nothing partial is reported.
    pub async fn run_batch(&self, authorization: Option<&str>) -> Result<BatchResult> {
        self.enter(BatchStage::Authorizing);
        let identity = AccessGuard::new(self.sessions.as_ref())
            .authorize_admin(authorization)
            .await
            .map_err(|e| self.abort(BatchStage::Authorizing, e))?;

        info!("Starting ingestion batch for {}", identity.id);
        self.run_for(&identity).await
    }

    async fn run_for(&self, identity: &Identity) -> Result<BatchResult> {
        self.enter(BatchStage::Extracting);
        let links = LinkExtractor::new(self.browser.as_ref(), &self.board)
            .extract()
            .await
            .map_err(|e| self.abort(BatchStage::Extracting, e))?;

        self.enter(BatchStage::TokenFetch);
        let mut token = self
            .token_issuer
            .issue_token()
            .await
            .map_err(|e| self.abort(BatchStage::TokenFetch, e))?;

        let total = links.len();
        let mut result = BatchResult::default();

        for (index, link) in links.into_iter().enumerate() {
            self.enter(BatchStage::ProcessingLinks { index, total });

            match self.process_link(&link, &identity.id, &mut token).await {
                Ok((record, outcome)) => {
                    info!("Imported '{}' ({:?}) from {}", record.title, outcome, link);
                    self.emit_event(IngestEvent::LinkImported {
                        url: link,
                        title: record.title.clone(),
                        outcome,
                    });
                    result.record_imported(record.title);
                }
                Err(e) => {
                    warn!("Failed to import {}: {}", link, e);
                    self.emit_event(IngestEvent::LinkFailed {
                        url: link.clone(),
                        error: e.to_string(),
                    });
                    result.record_failed(link);
                }
            }
        }

        self.enter(BatchStage::Done);
        info!(
            "Batch complete: {} imported, {} failed",
            result.imported_count, result.failed_count
        );
        self.emit_event(IngestEvent::BatchCompleted {
            imported: result.imported_count,
            failed: result.failed_count,
        });

        Ok(result)
    }

    /// Resolve, normalize and store one candidate link
    ///
    /// Every error returned here is a per-link failure.
    async fn process_link(
        &self,
        link: &str,
        imported_by: &str,
        token: &mut BearerToken,
    ) -> Result<(AlbumRecord, UpsertOutcome)> {
        let marker = &self.board.album_link_marker;

        debug!("Resolving {}", link);
        let raw = match resolve_album(self.catalog.as_ref(), link, marker, token).await {
            Err(Error::CatalogAuth(msg)) if self.refresh_token_on_unauthorized => {
                debug!("Catalog rejected bearer token ({}), re-issuing once", msg);
                *token = self.token_issuer.issue_token().await?;
                resolve_album(self.catalog.as_ref(), link, marker, token).await?
            }
            other => other?,
        };

        debug!("Normalizing {}", link);
        let record = normalize_album(&raw, imported_by)?;

        debug!("Storing {}", record.external_url);
        let outcome = self.store.upsert_release(&record).await?;

        Ok((record, outcome))
    }

    /// Search catalog artists by name
    ///
    /// Requires an authenticated session of any role. Issues one bearer token
    /// per call. `limit` is clamped to `1..=50`.
    pub async fn search_artists(
        &self,
        authorization: Option<&str>,
        name: &str,
        limit: u8,
    ) -> Result<Vec<ArtistSummary>> {
        let identity = AccessGuard::new(self.sessions.as_ref())
            .authenticate(authorization)
            .await?;

        let limit = limit.clamp(1, MAX_SEARCH_LIMIT);
        debug!(
            "Artist search '{}' (limit {}) for {}",
            name, limit, identity.id
        );

        let token = self.token_issuer.issue_token().await?;
        self.catalog.search_artists(name, limit, &token).await
    }

    fn enter(&self, stage: BatchStage) {
        debug!("Batch stage: {}", stage);
        self.emit_event(IngestEvent::StageChanged { stage });
    }

    /// Record a fatal stage failure and hand the error back
    fn abort(&self, stage: BatchStage, err: Error) -> Error {
        if err.is_authorization() {
            info!("Batch rejected during {}: {}", stage, err);
        } else {
            error!("Batch aborted during {}: {}", stage, err);
        }
        self.emit_event(IngestEvent::BatchAborted {
            stage,
            error: err.to_string(),
        });
        self.emit_event(IngestEvent::StageChanged {
            stage: BatchStage::Fatal,
        });
        err
    }

    /// Emit an engine event
    fn emit_event(&self, event: IngestEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
