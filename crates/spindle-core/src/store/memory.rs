// # Memory Release Store
//
// In-memory implementation of ReleaseStore.
//
// ## Purpose
//
// Provides a simple, fast store that doesn't persist across restarts.
// Useful for testing and for dry runs of the pipeline against a live board.
//
// ## Crash Behavior
//
// - All releases are lost on restart/crash
// - A re-run after restart re-inserts every release (still no duplicates)

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::release::AlbumRecord;
use crate::traits::release_store::{ReleaseStore, StoredRelease, UpsertOutcome};

/// In-memory release store implementation
///
/// Releases are kept in a HashMap keyed on canonical external URL and
/// protected by a RwLock. Clones share the same underlying map.
///
/// # Example
///
/// ```rust,no_run
/// use spindle_core::store::MemoryReleaseStore;
/// use spindle_core::traits::ReleaseStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryReleaseStore::new();
///     assert_eq!(store.count_releases().await?, 0);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryReleaseStore {
    inner: Arc<RwLock<HashMap<String, StoredRelease>>>,
}

impl MemoryReleaseStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReleaseStore for MemoryReleaseStore {
    async fn upsert_release(&self, record: &AlbumRecord) -> Result<UpsertOutcome, Error> {
        if record.external_url.is_empty() {
            return Err(Error::store("Release has an empty external URL"));
        }

        let mut guard = self.inner.write().await;
        let previous = guard.insert(
            record.external_url.clone(),
            StoredRelease::new(record.clone()),
        );

        Ok(match previous {
            Some(_) => UpsertOutcome::Replaced,
            None => UpsertOutcome::Inserted,
        })
    }

    async fn get_release(&self, external_url: &str) -> Result<Option<StoredRelease>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(external_url).cloned())
    }

    async fn count_releases(&self) -> Result<usize, Error> {
        Ok(self.inner.read().await.len())
    }

    async fn list_releases(&self) -> Result<Vec<String>, Error> {
        let guard = self.inner.read().await;
        let mut urls: Vec<String> = guard.keys().cloned().collect();
        urls.sort();
        Ok(urls)
    }

    async fn delete_release(&self, external_url: &str) -> Result<(), Error> {
        self.inner.write().await.remove(external_url);
        Ok(())
    }
}
