//! Internal release schema
//!
//! An [`AlbumRecord`] is what the ingestion writer persists. Its
//! `external_url` is the idempotency key: two records with the same URL are
//! the same release.

use serde::{Deserialize, Serialize};

/// Normalized album ready for storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumRecord {
    pub title: String,
    pub release_type: String,
    pub cover_url: Option<String>,
    pub genres: Vec<String>,
    /// Canonical external URL (unique key)
    pub external_url: String,
    pub release_date: String,
    /// Identity of the administrator whose batch imported this release
    pub imported_by: String,
    pub artists: Vec<ArtistRef>,
    pub tracks: Vec<TrackRecord>,
}

/// Album-level artist reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

/// Track inside an album record, in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    pub name: String,
    /// 1-based position on the release
    pub track_number: u32,
    /// Length in milliseconds, `0` when the catalog omits it
    pub duration_ms: u64,
    pub preview_url: Option<String>,
    pub credits: Vec<Credit>,
}

/// Contributor credit on a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    pub name: String,
    pub role: CreditRole,
}

/// Role of a credited contributor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditRole {
    Artist,
}
