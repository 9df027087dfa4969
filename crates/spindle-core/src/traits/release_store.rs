// # Release Store Trait
//
// Defines the interface for persistent release storage.
//
// ## Purpose
//
// The release store ensures idempotency: every release is keyed on its
// canonical external URL, and writing the same release twice leaves exactly
// one stored row whose fields equal the last write.
//
// ## Implementations
//
// - In-memory: `crate::store::MemoryReleaseStore`
// - SQLite: `spindle-store-sqlite` crate

use async_trait::async_trait;

use crate::release::AlbumRecord;

/// What an upsert did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No release with this URL existed
    Inserted,
    /// An existing release was replaced field-for-field
    Replaced,
}

/// A persisted release plus store-managed metadata
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRelease {
    pub record: AlbumRecord,
    /// Timestamp of the last upsert
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl StoredRelease {
    pub(crate) fn new(record: AlbumRecord) -> Self {
        Self {
            record,
            updated_at: chrono::Utc::now(),
        }
    }
}

/// Trait for release store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
/// Concurrent batches are not coordinated; the last writer wins.
///
/// # Trust Level: Trusted (Core Component)
///
/// ## Allowed Capabilities
/// - ✅ Perform I/O for persistent storage (files, databases, etc.)
/// - ✅ Make each upsert atomic
///
/// ## Forbidden Capabilities
/// - ❌ Merge fields of an existing release with the new one
/// - ❌ Open transactions spanning more than one upsert
/// - ❌ Decide whether a link should be imported (owned by `IngestEngine`)
#[async_trait]
pub trait ReleaseStore: Send + Sync {
    /// Insert or replace a release keyed on `record.external_url`
    ///
    /// # Returns
    ///
    /// - `Ok(UpsertOutcome)`: Whether the release was new
    /// - `Err(Error)`: Storage error (per-link failure for the caller)
    async fn upsert_release(&self, record: &AlbumRecord) -> Result<UpsertOutcome, crate::Error>;

    /// Get a release by canonical URL
    async fn get_release(&self, external_url: &str)
    -> Result<Option<StoredRelease>, crate::Error>;

    /// Number of stored releases
    async fn count_releases(&self) -> Result<usize, crate::Error>;

    /// Canonical URLs of all stored releases, sorted
    async fn list_releases(&self) -> Result<Vec<String>, crate::Error>;

    /// Delete a release (no-op if absent)
    async fn delete_release(&self, external_url: &str) -> Result<(), crate::Error>;
}
