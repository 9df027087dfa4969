//! Raw catalog types
//!
//! These mirror the catalog's "album by id" resource closely enough for serde
//! to decode it directly. Required fields are still `Option` so that a
//! structurally incomplete album surfaces as a normalization failure for that
//! link instead of an opaque decode error.

use serde::{Deserialize, Serialize};

/// Bearer credential for catalog API calls
///
/// One per batch run. The token value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    value: String,
    expires_in_secs: Option<u64>,
}

impl BearerToken {
    /// Wrap a token string returned by the catalog
    pub fn new(value: impl Into<String>, expires_in_secs: Option<u64>) -> Self {
        Self {
            value: value.into(),
            expires_in_secs,
        }
    }

    /// The raw token, for the `Authorization` header only
    pub fn secret(&self) -> &str {
        &self.value
    }

    /// Lifetime advertised by the catalog, if any
    pub fn expires_in_secs(&self) -> Option<u64> {
        self.expires_in_secs
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("value", &"<REDACTED>")
            .field("expires_in_secs", &self.expires_in_secs)
            .finish()
    }
}

/// Album resource as returned by the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAlbum {
    /// Catalog identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Album title
    #[serde(default)]
    pub name: Option<String>,
    /// "album", "single" or "compilation"
    #[serde(default)]
    pub album_type: Option<String>,
    /// Cover art, largest first
    #[serde(default)]
    pub images: Vec<RawImage>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub external_urls: RawExternalUrls,
    /// Release date at the catalog's precision ("1997", "1997-06", "1997-06-16")
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub artists: Vec<RawArtist>,
    #[serde(default)]
    pub tracks: RawTrackPage,
}

/// Cover image reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Canonical links keyed by service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

/// Artist reference on an album or track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArtist {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub external_urls: RawExternalUrls,
}

/// First page of an album's tracks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrackPage {
    #[serde(default)]
    pub items: Vec<RawTrack>,
    #[serde(default)]
    pub total: Option<u32>,
}

/// Track entry inside an album resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrack {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub artists: Vec<RawArtist>,
}
