//! Daemon configuration
//!
//! All configuration comes from `SPINDLE_*` environment variables. Lookup is
//! injected so tests never touch the process environment.

use anyhow::{Context, Result};
use spindle_core::config::{
    BoardConfig, CatalogConfig, DEFAULT_SEARCH_URL, EngineConfig, IngestConfig, StoreConfig,
};
use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";
const DEFAULT_STORE_URL: &str = "sqlite://spindle.db";

/// Application configuration
pub struct Config {
    pub bind_addr: String,
    pub catalog_client_id: String,
    /// ⚠️ NEVER log this value
    pub catalog_client_secret: String,
    pub identity_url: String,
    pub board_search_url: String,
    pub board_ready_selector: String,
    pub board_ready_timeout_secs: u64,
    pub chrome_executable: Option<PathBuf>,
    pub store_type: String,
    pub store_url: String,
    pub refresh_token_on_unauthorized: bool,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} is required. Set it via: export {}=...", key, key))
        };

        Ok(Self {
            bind_addr: lookup("SPINDLE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            catalog_client_id: required("SPINDLE_CATALOG_CLIENT_ID")?,
            catalog_client_secret: required("SPINDLE_CATALOG_CLIENT_SECRET")?,
            identity_url: required("SPINDLE_IDENTITY_URL")?,
            board_search_url: lookup("SPINDLE_BOARD_SEARCH_URL")
                .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
            board_ready_selector: lookup("SPINDLE_BOARD_READY_SELECTOR")
                .unwrap_or_else(|| "main".to_string()),
            board_ready_timeout_secs: match lookup("SPINDLE_BOARD_READY_TIMEOUT_SECS") {
                Some(v) => v.parse().with_context(|| {
                    format!("SPINDLE_BOARD_READY_TIMEOUT_SECS must be a number. Got: {}", v)
                })?,
                None => 30,
            },
            chrome_executable: lookup("SPINDLE_CHROME_EXECUTABLE").map(PathBuf::from),
            store_type: lookup("SPINDLE_STORE_TYPE").unwrap_or_else(|| "sqlite".to_string()),
            store_url: lookup("SPINDLE_STORE_URL").unwrap_or_else(|| DEFAULT_STORE_URL.to_string()),
            refresh_token_on_unauthorized: match lookup("SPINDLE_REFRESH_TOKEN_ON_UNAUTHORIZED") {
                Some(v) => parse_bool(&v).with_context(|| {
                    format!(
                        "SPINDLE_REFRESH_TOKEN_ON_UNAUTHORIZED must be true or false. Got: {}",
                        v
                    )
                })?,
                None => false,
            },
            log_level: lookup("SPINDLE_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            anyhow::bail!(
                "SPINDLE_BIND_ADDR must be a socket address (e.g. 127.0.0.1:8787). Got: {}",
                self.bind_addr
            );
        }

        if !self.identity_url.starts_with("https://") && !self.identity_url.starts_with("http://")
        {
            anyhow::bail!(
                "SPINDLE_IDENTITY_URL must use HTTP or HTTPS scheme. Got: {}",
                self.identity_url
            );
        }

        if !(1..=300).contains(&self.board_ready_timeout_secs) {
            anyhow::bail!(
                "SPINDLE_BOARD_READY_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.board_ready_timeout_secs
            );
        }

        match self.store_type.as_str() {
            "sqlite" | "memory" => {}
            _ => anyhow::bail!(
                "SPINDLE_STORE_TYPE '{}' is not supported. \
                Supported types: sqlite, memory",
                self.store_type
            ),
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "SPINDLE_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        self.ingest_config()
            .validate()
            .context("Invalid pipeline configuration")?;

        Ok(())
    }

    /// Library configuration for the ingestion engine
    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            board: BoardConfig {
                search_url: self.board_search_url.clone(),
                ready_selector: self.board_ready_selector.clone(),
                ready_timeout_secs: self.board_ready_timeout_secs,
                ..BoardConfig::default()
            },
            catalog: CatalogConfig::spotify(
                self.catalog_client_id.clone(),
                self.catalog_client_secret.clone(),
            ),
            store: match self.store_type.as_str() {
                "memory" => StoreConfig::Memory,
                _ => StoreConfig::Sqlite {
                    url: self.store_url.clone(),
                },
            },
            engine: EngineConfig {
                refresh_token_on_unauthorized: self.refresh_token_on_unauthorized,
                ..EngineConfig::default()
            },
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
