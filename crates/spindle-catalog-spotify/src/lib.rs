// # Spotify Catalog Client
//
// This crate provides the Spotify Web API implementation of the catalog
// traits for the spindle ingestion pipeline.
//
// ## Implementation Status
//
// - ✅ Client-credentials token exchange (one token per call, no caching)
// - ✅ Album lookup by catalog id
// - ✅ Artist search
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Specific error handling for HTTP status codes (401/403, 404, 429, 5xx)
// - ❌ NO retry logic (a failed link is recorded by IngestEngine)
// - ❌ NO token caching (the token is owned by the batch)
// - ❌ NO pagination of album tracks beyond the first page
//
// ## Trust Level: Untrusted (Catalog Client)
//
// **Allowed Capabilities**:
// - ✅ Perform HTTPS calls to the accounts and API endpoints only
// - ✅ Parse catalog responses into spindle-core raw types
//
// **Forbidden Capabilities**:
// - ❌ Spawn tasks or threads
// - ❌ Access the release store
// - ❌ Hold tokens between calls
//
// ## Security Requirements
//
// - Client secret and bearer tokens NEVER appear in logs
// - Credentials MUST be provided via environment variables only
// - Construction fails fast if a credential is empty
//
// ## API Reference
//
// - Token: POST `https://accounts.spotify.com/api/token` (client credentials)
// - Get Album: GET `/v1/albums/{id}`
// - Search: GET `/v1/search?q=...&type=artist&limit=...`

use async_trait::async_trait;
use serde::Deserialize;
use spindle_core::config::CatalogConfig;
use spindle_core::traits::{ArtistSummary, CatalogClient, TokenIssuer};
use spindle_core::{BearerToken, Error, RawAlbum, Result};
use std::time::Duration;

/// Accounts service token endpoint
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Web API base URL
pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER: &str = "spotify";

/// Spotify catalog client
///
/// # Trust Level: Untrusted
///
/// Stateless and single-shot: every method is one HTTP request. Cloning is
/// cheap and clones share the connection pool, so one value can back both
/// the [`TokenIssuer`] and the [`CatalogClient`] slots of the engine.
///
/// # Security
///
/// The Debug implementation does NOT expose the client secret.
#[derive(Clone)]
pub struct SpotifyCatalog {
    client_id: String,

    /// ⚠️ NEVER log this value
    client_secret: String,

    token_url: String,

    api_base: String,

    client: reqwest::Client,
}

// Custom Debug implementation that hides the client secret
impl std::fmt::Debug for SpotifyCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCatalog")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<REDACTED>")
            .field("token_url", &self.token_url)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl SpotifyCatalog {
    /// Create a client against the production endpoints
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if either credential is empty or the HTTP client
    /// cannot be built.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        Self::with_endpoints(client_id, client_secret, SPOTIFY_TOKEN_URL, SPOTIFY_API_BASE)
    }

    /// Create a client against explicit endpoints (tests, proxies)
    pub fn with_endpoints(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_url: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();

        if client_id.is_empty() {
            return Err(Error::config("Spotify client id cannot be empty"));
        }
        if client_secret.is_empty() {
            return Err(Error::config("Spotify client secret cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client_id,
            client_secret,
            token_url: token_url.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Build from the library configuration
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        match config {
            CatalogConfig::Spotify {
                client_id,
                client_secret,
                token_url,
                api_base,
            } => Self::with_endpoints(
                client_id.clone(),
                client_secret.clone(),
                token_url.as_deref().unwrap_or(SPOTIFY_TOKEN_URL),
                api_base.as_deref().unwrap_or(SPOTIFY_API_BASE),
            ),
        }
    }

    /// Send an authorized GET and map non-success statuses
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
        token: &BearerToken,
    ) -> Result<T> {
        let response = request
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error(status, what, &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| Error::catalog(PROVIDER, format!("Failed to parse {}: {}", what, e)))
    }
}

/// Map a non-success catalog status to the core error contract
fn status_error(status: reqwest::StatusCode, what: &str, body: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::catalog_auth(format!(
            "Catalog rejected bearer token for {}. Status: {}",
            what, status
        )),
        404 => Error::not_found(format!("{} not found", what)),
        429 => Error::rate_limited(format!("Catalog rate limit exceeded. Status: {}", status)),
        500..=599 => Error::catalog(
            PROVIDER,
            format!("Catalog server error (transient): {} - {}", status, body),
        ),
        _ => Error::catalog(PROVIDER, format!("{} lookup failed: {} - {}", what, status, body)),
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    artists: Option<ArtistPage>,
}

#[derive(Deserialize)]
struct ArtistPage {
    #[serde(default)]
    items: Vec<ArtistItem>,
}

#[derive(Deserialize)]
struct ArtistItem {
    id: String,
    name: String,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    images: Vec<ImageItem>,
    #[serde(default)]
    external_urls: ExternalUrls,
    #[serde(default)]
    followers: Option<Followers>,
}

#[derive(Deserialize)]
struct ImageItem {
    url: String,
}

#[derive(Deserialize, Default)]
struct ExternalUrls {
    #[serde(default)]
    spotify: Option<String>,
}

#[derive(Deserialize)]
struct Followers {
    #[serde(default)]
    total: Option<u64>,
}

impl From<ArtistItem> for ArtistSummary {
    fn from(item: ArtistItem) -> Self {
        ArtistSummary {
            id: item.id,
            name: item.name,
            genres: item.genres,
            image_url: item.images.into_iter().next().map(|image| image.url),
            external_url: item.external_urls.spotify,
            followers: item.followers.and_then(|f| f.total),
        }
    }
}

#[async_trait]
impl TokenIssuer for SpotifyCatalog {
    /// Exchange client credentials for a bearer token
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /api/token
    /// Authorization: Basic <client_id:client_secret>
    /// Content-Type: application/x-www-form-urlencoded
    ///
    /// grant_type=client_credentials
    /// ```
    async fn issue_token(&self) -> Result<BearerToken> {
        tracing::debug!("Requesting client-credentials token");

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| Error::token_exchange(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(Error::token_exchange(format!(
                "Token endpoint returned {} - {}",
                status, error_text
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::token_exchange(format!("Failed to parse token response: {}", e)))?;

        if body.access_token.is_empty() {
            return Err(Error::token_exchange("Token endpoint returned an empty token"));
        }

        tracing::debug!("Token issued (expires in {:?}s)", body.expires_in);
        Ok(BearerToken::new(body.access_token, body.expires_in))
    }
}

#[async_trait]
impl CatalogClient for SpotifyCatalog {
    /// Fetch one album by catalog id
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /v1/albums/{id}
    /// Authorization: Bearer <token>
    /// ```
    async fn fetch_album(&self, album_id: &str, token: &BearerToken) -> Result<RawAlbum> {
        let url = format!("{}/albums/{}", self.api_base, album_id);
        let request = self.client.get(&url);
        self.get_json(request, &format!("Album {}", album_id), token)
            .await
    }

    async fn search_artists(
        &self,
        name: &str,
        limit: u8,
        token: &BearerToken,
    ) -> Result<Vec<ArtistSummary>> {
        let url = format!("{}/search", self.api_base);
        let limit = limit.to_string();
        let request = self
            .client
            .get(&url)
            .query(&[("q", name), ("type", "artist"), ("limit", limit.as_str())]);

        let body: SearchResponse = self.get_json(request, "Artist search", token).await?;

        Ok(body
            .artists
            .map(|page| page.items.into_iter().map(ArtistSummary::from).collect())
            .unwrap_or_default())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
