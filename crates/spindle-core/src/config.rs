//! Configuration types for the ingestion pipeline
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Default board search: album links posted to the community, top of the day
pub const DEFAULT_SEARCH_URL: &str = "https://www.reddit.com/r/indieheads/search/?q=open.spotify.com%2Falbum&restrict_sr=1&sort=top&t=day";

/// Path marker preceding the catalog identifier in album links
pub const DEFAULT_ALBUM_LINK_MARKER: &str = "open.spotify.com/album/";

/// Main ingestion configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Discussion board scraping
    #[serde(default)]
    pub board: BoardConfig,

    /// Catalog API credentials and endpoints
    pub catalog: CatalogConfig,

    /// Release store
    #[serde(default)]
    pub store: StoreConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl IngestConfig {
    /// Create a configuration with the given catalog and defaults elsewhere
    pub fn new(catalog: CatalogConfig) -> Self {
        Self {
            board: BoardConfig::default(),
            catalog,
            store: StoreConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.board.validate()?;
        self.catalog.validate()?;
        self.store.validate()?;

        if self.engine.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }

        Ok(())
    }
}

/// Discussion board configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Search results page to scrape
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// CSS selector whose presence signals the results area is ready
    #[serde(default = "default_ready_selector")]
    pub ready_selector: String,

    /// Maximum wait for the ready selector (in seconds)
    ///
    /// Expiry is a hard failure for the whole batch.
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,

    /// Substring identifying catalog album links
    #[serde(default = "default_album_link_marker")]
    pub album_link_marker: String,
}

impl BoardConfig {
    /// Validate the board configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !self.search_url.starts_with("https://") && !self.search_url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "Board search URL must use HTTP or HTTPS scheme. Got: {}",
                self.search_url
            )));
        }
        if self.ready_selector.trim().is_empty() {
            return Err(crate::Error::config("Board ready selector cannot be empty"));
        }
        if self.ready_timeout_secs == 0 {
            return Err(crate::Error::config("Board ready timeout must be > 0"));
        }
        if !self.album_link_marker.ends_with('/') {
            return Err(crate::Error::config(
                "Album link marker must end with '/' (e.g. \"open.spotify.com/album/\")",
            ));
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            ready_selector: default_ready_selector(),
            ready_timeout_secs: default_ready_timeout_secs(),
            album_link_marker: default_album_link_marker(),
        }
    }
}

/// Catalog configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogConfig {
    /// Spotify Web API
    Spotify {
        /// Client id for the client-credentials grant
        client_id: String,
        /// Client secret
        /// ⚠️ NEVER log this value
        client_secret: String,
        /// Token endpoint override (tests)
        #[serde(default)]
        token_url: Option<String>,
        /// API base override (tests)
        #[serde(default)]
        api_base: Option<String>,
    },
}

impl CatalogConfig {
    /// Spotify credentials with production endpoints
    pub fn spotify(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        CatalogConfig::Spotify {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: None,
            api_base: None,
        }
    }

    /// Validate the catalog configuration
    ///
    /// Missing credentials are startup-fatal.
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            CatalogConfig::Spotify {
                client_id,
                client_secret,
                ..
            } => {
                if client_id.is_empty() {
                    return Err(crate::Error::config("Catalog client id cannot be empty"));
                }
                if client_secret.is_empty() {
                    return Err(crate::Error::config(
                        "Catalog client secret cannot be empty",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the catalog type name
    pub fn type_name(&self) -> &str {
        match self {
            CatalogConfig::Spotify { .. } => "spotify",
        }
    }
}

// Custom Debug implementation that hides the client secret
impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogConfig::Spotify {
                client_id,
                token_url,
                api_base,
                ..
            } => f
                .debug_struct("Spotify")
                .field("client_id", client_id)
                .field("client_secret", &"<REDACTED>")
                .field("token_url", token_url)
                .field("api_base", api_base)
                .finish(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig::spotify(String::new(), String::new())
    }
}

/// Release store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// In-memory store (not persistent)
    Memory,

    /// SQLite store
    Sqlite {
        /// Connection URL (e.g. "sqlite://spindle.db")
        url: String,
    },
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::Sqlite { url } if !url.starts_with("sqlite:") => {
                Err(crate::Error::config(format!(
                    "SQLite store URL must start with \"sqlite:\". Got: {}",
                    url
                )))
            }
            _ => Ok(()),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Sqlite {
            url: "sqlite://spindle.db".to_string(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Re-issue the bearer token once when the catalog rejects it mid-batch
    ///
    /// Off by default: a batch then issues exactly one token.
    #[serde(default)]
    pub refresh_token_on_unauthorized: bool,

    /// Capacity of the internal event channel
    ///
    /// When full, new events are dropped (with a warning log).
    ///
    /// Default: 1000 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            refresh_token_on_unauthorized: false,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_search_url() -> String {
    DEFAULT_SEARCH_URL.to_string()
}

fn default_ready_selector() -> String {
    "main".to_string()
}

fn default_ready_timeout_secs() -> u64 {
    30
}

fn default_album_link_marker() -> String {
    DEFAULT_ALBUM_LINK_MARKER.to_string()
}

fn default_event_channel_capacity() -> usize {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_rejected() {
        let config = IngestConfig::new(CatalogConfig::spotify("", "secret"));
        assert!(config.validate().is_err());

        let config = IngestConfig::new(CatalogConfig::spotify("client", ""));
        assert!(config.validate().is_err());

        let config = IngestConfig::new(CatalogConfig::spotify("client", "secret"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_board_defaults() {
        let board = BoardConfig::default();
        assert!(board.search_url.contains("sort=top"));
        assert!(board.search_url.contains("t=day"));
        assert_eq!(board.ready_timeout_secs, 30);
        assert!(board.validate().is_ok());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = serde_json::json!({
            "catalog": { "type": "spotify", "client_id": "id", "client_secret": "secret" },
            "store": { "type": "memory" }
        });
        let config: IngestConfig = serde_json::from_value(json).unwrap();

        assert_eq!(config.catalog.type_name(), "spotify");
        assert!(matches!(config.store, StoreConfig::Memory));
        assert!(!config.engine.refresh_token_on_unauthorized);
        assert_eq!(config.engine.event_channel_capacity, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_client_secret_not_exposed_in_debug() {
        let config = CatalogConfig::spotify("client", "super_secret_value");
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("super_secret_value"));
        assert!(debug_str.contains("client"));
    }

    #[test]
    fn test_invalid_store_url() {
        let store = StoreConfig::Sqlite {
            url: "postgres://db".to_string(),
        };
        assert!(store.validate().is_err());
    }
}
