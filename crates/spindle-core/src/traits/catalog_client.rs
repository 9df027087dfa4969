// # Catalog Traits
//
// Defines the interface to the third-party music catalog.
//
// ## Implementations
//
// - Spotify Web API: `spindle-catalog-spotify` crate
//
// ## Usage
//
// ```rust,ignore
// let token = catalog.issue_token().await?;          // once per batch
// let album = catalog.fetch_album("3USQKOs5VWZ3wfHdvuf7YI", &token).await?;
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::{BearerToken, RawAlbum};

/// Artist hit returned by the search proxy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistSummary {
    pub id: String,
    pub name: String,
    pub genres: Vec<String>,
    pub image_url: Option<String>,
    pub external_url: Option<String>,
    pub followers: Option<u64>,
}

/// Trait for client-credentials token issuance
///
/// # Error Contract
///
/// A non-success response from the token endpoint MUST be reported as
/// [`crate::Error::TokenExchange`]. The orchestrator treats any error from
/// this call as fatal for the batch.
///
/// # Caching
///
/// Implementations MUST NOT cache tokens across calls. The orchestrator calls
/// this once per batch and owns the resulting token. With
/// `refresh_token_on_unauthorized` it may call again after a catalog 401.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Exchange the configured client credentials for a bearer token
    async fn issue_token(&self) -> Result<BearerToken, crate::Error>;
}

/// Trait for catalog lookups
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to the catalog only
/// - ✅ Parse catalog-specific responses
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (owned by `IngestEngine`)
/// - ❌ Access the release store (owned by `IngestEngine`)
/// - ❌ Refresh the bearer token (owned by `IngestEngine`)
///
/// # Error Contract
///
/// - 401/403 → [`crate::Error::CatalogAuth`]
/// - 404 → [`crate::Error::NotFound`]
/// - 429 → [`crate::Error::RateLimited`]
/// - anything else → [`crate::Error::Catalog`]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch the full album resource for a catalog identifier
    ///
    /// # Parameters
    ///
    /// - `album_id`: Catalog identifier parsed from a candidate link
    /// - `token`: The batch's bearer credential
    async fn fetch_album(&self, album_id: &str, token: &BearerToken)
    -> Result<RawAlbum, crate::Error>;

    /// Search artists by name (single-call proxy, not part of the batch)
    async fn search_artists(
        &self,
        name: &str,
        limit: u8,
        token: &BearerToken,
    ) -> Result<Vec<ArtistSummary>, crate::Error>;

    /// Catalog name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
