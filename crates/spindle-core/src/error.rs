//! Error types for the ingestion pipeline
//!
//! This module defines all error types used throughout the crate, and the
//! three-way classification the batch orchestrator relies on.

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// How a failure affects a running batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing/invalid session or insufficient role; the batch never starts
    Authorization,
    /// Browser, token exchange or configuration failure; the batch aborts
    Infrastructure,
    /// A single candidate link failed; the batch continues
    PerLink,
}

/// Core error type for the ingestion pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Missing, malformed, invalid or expired session
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Caller is authenticated but lacks the elevated role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Headless browser launch/navigation/extraction errors
    #[error("Browser error: {0}")]
    Browser(String),

    /// A bounded wait expired
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Client-credentials exchange failed
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// Candidate link does not carry a parseable catalog identifier
    #[error("Invalid link: {0}")]
    InvalidLink(String),

    /// Catalog-specific error
    #[error("Catalog error ({provider}): {message}")]
    Catalog {
        /// Catalog name
        provider: String,
        /// Error message
        message: String,
    },

    /// Catalog rejected the bearer credential
    #[error("Catalog authentication failed: {0}")]
    CatalogAuth(String),

    /// Raw catalog metadata is structurally incomplete
    #[error("Normalization failed: {0}")]
    Normalize(String),

    /// Release store errors
    #[error("Release store error: {0}")]
    Store(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an unauthenticated error
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a browser error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a token exchange error
    pub fn token_exchange(msg: impl Into<String>) -> Self {
        Self::TokenExchange(msg.into())
    }

    /// Create an invalid link error
    pub fn invalid_link(msg: impl Into<String>) -> Self {
        Self::InvalidLink(msg.into())
    }

    /// Create a catalog-specific error
    pub fn catalog(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Catalog {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a catalog authentication error
    pub fn catalog_auth(msg: impl Into<String>) -> Self {
        Self::CatalogAuth(msg.into())
    }

    /// Create a normalization error
    pub fn normalize(msg: impl Into<String>) -> Self {
        Self::Normalize(msg.into())
    }

    /// Create a release store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Natural category of this error when raised outside a batch
    ///
    /// Inside a batch the orchestrator classifies by stage instead: any
    /// error raised while processing a link is per-link, whatever its variant.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Unauthenticated(_) | Error::Forbidden(_) => ErrorCategory::Authorization,
            Error::Browser(_)
            | Error::Timeout(_)
            | Error::TokenExchange(_)
            | Error::Config(_)
            | Error::Network(_)
            | Error::Other(_) => ErrorCategory::Infrastructure,
            Error::InvalidLink(_)
            | Error::Catalog { .. }
            | Error::CatalogAuth(_)
            | Error::Normalize(_)
            | Error::Store(_)
            | Error::Json(_)
            | Error::Http(_)
            | Error::RateLimited(_)
            | Error::NotFound(_) => ErrorCategory::PerLink,
        }
    }

    /// Whether this error must be reported to the caller as an auth failure
    pub fn is_authorization(&self) -> bool {
        self.category() == ErrorCategory::Authorization
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
