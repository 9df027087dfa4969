// # HTTP Session Resolver
//
// This crate provides an HTTP-based session resolver for the spindle
// ingestion pipeline.
//
// ## Architecture
//
// The caller's bearer token is forwarded unchanged to a session lookup
// endpoint owned by the platform's identity service. The endpoint answers
// with the caller's id and role:
//
// ```json
// { "id": "user-42", "role": "admin" }
// ```
//
// Unknown roles decode as `member`. Any non-success status means the
// session is not usable; the resolver never retries.

use serde::Deserialize;
use spindle_core::traits::{Identity, Role, SessionResolver};
use spindle_core::{Error, Result};

use std::time::Duration;

/// Default HTTP timeout for session lookups
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Session resolver backed by an identity HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpSessionResolver {
    /// Session lookup URL
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
    role: Role,
}

impl HttpSessionResolver {
    /// Create a new resolver
    ///
    /// # Parameters
    ///
    /// - `url`: Session lookup endpoint (e.g. "https://auth.internal/session")
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the URL is not HTTP(S) or the client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(Error::config(format!(
                "Identity URL must use HTTP or HTTPS scheme. Got: {}",
                url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { url, client })
    }
}

#[async_trait::async_trait]
impl SessionResolver for HttpSessionResolver {
    async fn resolve(&self, token: &str) -> Result<Identity> {
        let response = self
            .client
            .get(&self.url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::http(format!("Session lookup failed: {}", e)))?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => {}
            401 | 403 | 404 => {
                return Err(Error::unauthenticated(format!(
                    "Session rejected by identity service. Status: {}",
                    status
                )));
            }
            _ => {
                return Err(Error::http(format!(
                    "Identity service error: {}",
                    status
                )));
            }
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| Error::http(format!("Malformed session response: {}", e)))?;

        tracing::debug!("Resolved session for {} ({:?})", session.id, session.role);
        Ok(Identity::new(session.id, session.role))
    }
}
