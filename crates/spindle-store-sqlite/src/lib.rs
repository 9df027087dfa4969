// # SQLite Release Store
//
// Persistent implementation of `ReleaseStore` on SQLite via sqlx.
//
// ## Schema
//
// One row per release, keyed on the canonical external URL. Nested values
// (genres, artists, tracks with credits) are stored as JSON text so a
// replace is a single-row write.
//
// ## Crash Behavior
//
// Each upsert is one `INSERT ... ON CONFLICT DO UPDATE` statement, atomic on
// its own. A crash mid-batch leaves every completed link stored and nothing
// half-written; re-running the batch converges to the same rows.
//
// No explicit transaction wraps the existence check and the write. A deferred
// transaction that reads first cannot upgrade to a write lock while another
// connection writes, and SQLite reports that as busy without waiting.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use spindle_core::release::{AlbumRecord, ArtistRef, TrackRecord};
use spindle_core::traits::{ReleaseStore, StoredRelease, UpsertOutcome};
use spindle_core::{Error, Result};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::str::FromStr;

const CREATE_RELEASES: &str = "CREATE TABLE IF NOT EXISTS releases (
    external_url TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    release_type TEXT NOT NULL,
    cover_url TEXT,
    genres TEXT NOT NULL,
    release_date TEXT NOT NULL,
    imported_by TEXT NOT NULL,
    artists TEXT NOT NULL,
    tracks TEXT NOT NULL,
    updated_at INTEGER NOT NULL
)";

const UPSERT_RELEASE: &str = "INSERT INTO releases
    (external_url, title, release_type, cover_url, genres, release_date, imported_by, artists, tracks, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(external_url) DO UPDATE SET
        title = excluded.title,
        release_type = excluded.release_type,
        cover_url = excluded.cover_url,
        genres = excluded.genres,
        release_date = excluded.release_date,
        imported_by = excluded.imported_by,
        artists = excluded.artists,
        tracks = excluded.tracks,
        updated_at = excluded.updated_at";

/// SQLite-backed release store
#[derive(Debug, Clone)]
pub struct SqliteReleaseStore {
    pool: SqlitePool,
}

impl SqliteReleaseStore {
    /// Open (creating if missing) the database at `url` and ensure the schema
    ///
    /// In-memory URLs get a single connection so every query sees the same
    /// database.
    ///
    /// # Errors
    ///
    /// [`Error::Store`] if the URL is invalid, the file cannot be opened, or
    /// the schema cannot be created.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(store_error)?
            .create_if_missing(true);

        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(store_error)?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and ensure the schema
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(CREATE_RELEASES)
            .execute(&pool)
            .await
            .map_err(store_error)?;
        tracing::debug!("Release schema ready");
        Ok(Self { pool })
    }
}

fn store_error(err: sqlx::Error) -> Error {
    Error::store(format!("SQLite error: {}", err))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::store(format!("Encode failed: {}", e)))
}

fn from_json<T: serde::de::DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| Error::store(format!("Decode failed: {}", e)))
}

fn release_from_row(row: &SqliteRow) -> Result<StoredRelease> {
    let genres: String = row.try_get("genres").map_err(store_error)?;
    let artists: String = row.try_get("artists").map_err(store_error)?;
    let tracks: String = row.try_get("tracks").map_err(store_error)?;
    let updated_at: i64 = row.try_get("updated_at").map_err(store_error)?;

    let record = AlbumRecord {
        title: row.try_get("title").map_err(store_error)?,
        release_type: row.try_get("release_type").map_err(store_error)?,
        cover_url: row.try_get("cover_url").map_err(store_error)?,
        genres: from_json::<Vec<String>>(&genres)?,
        external_url: row.try_get("external_url").map_err(store_error)?,
        release_date: row.try_get("release_date").map_err(store_error)?,
        imported_by: row.try_get("imported_by").map_err(store_error)?,
        artists: from_json::<Vec<ArtistRef>>(&artists)?,
        tracks: from_json::<Vec<TrackRecord>>(&tracks)?,
    };

    let updated_at = DateTime::<Utc>::from_timestamp_millis(updated_at)
        .ok_or_else(|| Error::store(format!("Invalid timestamp: {}", updated_at)))?;

    Ok(StoredRelease { record, updated_at })
}

#[async_trait]
impl ReleaseStore for SqliteReleaseStore {
    async fn upsert_release(&self, record: &AlbumRecord) -> Result<UpsertOutcome> {
        if record.external_url.is_empty() {
            return Err(Error::store("Release has an empty external URL"));
        }

        let genres = to_json(&record.genres)?;
        let artists = to_json(&record.artists)?;
        let tracks = to_json(&record.tracks)?;

        // Labels the outcome only; the upsert below is the atomic step
        let existing = sqlx::query("SELECT 1 FROM releases WHERE external_url = ?")
            .bind(&record.external_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        sqlx::query(UPSERT_RELEASE)
            .bind(&record.external_url)
            .bind(&record.title)
            .bind(&record.release_type)
            .bind(&record.cover_url)
            .bind(genres)
            .bind(&record.release_date)
            .bind(&record.imported_by)
            .bind(artists)
            .bind(tracks)
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(if existing.is_some() {
            UpsertOutcome::Replaced
        } else {
            UpsertOutcome::Inserted
        })
    }

    async fn get_release(&self, external_url: &str) -> Result<Option<StoredRelease>> {
        let row = sqlx::query("SELECT * FROM releases WHERE external_url = ?")
            .bind(external_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.as_ref().map(release_from_row).transpose()
    }

    async fn count_releases(&self) -> Result<usize> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM releases")
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?
            .try_get("n")
            .map_err(store_error)?;
        Ok(count as usize)
    }

    async fn list_releases(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT external_url FROM releases ORDER BY external_url")
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        rows.iter()
            .map(|row| row.try_get("external_url").map_err(store_error))
            .collect()
    }

    async fn delete_release(&self, external_url: &str) -> Result<()> {
        sqlx::query("DELETE FROM releases WHERE external_url = ?")
            .bind(external_url)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url() {
        let err = SqliteReleaseStore::connect("postgres://nope").await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let store = SqliteReleaseStore::connect("sqlite::memory:").await.unwrap();
        SqliteReleaseStore::from_pool(store.pool.clone()).await.unwrap();
        assert_eq!(store.count_releases().await.unwrap(), 0);
    }
}
