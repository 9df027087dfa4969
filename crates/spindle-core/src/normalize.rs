//! Record normalizer
//!
//! Pure transform from [`RawAlbum`] to [`AlbumRecord`]. No I/O, no clock:
//! the same input always yields the same record.

use crate::catalog::{RawAlbum, RawArtist, RawTrack};
use crate::error::{Error, Result};
use crate::release::{AlbumRecord, ArtistRef, Credit, CreditRole, TrackRecord};

/// Normalize a raw catalog album into the internal release schema
///
/// # Parameters
///
/// - `raw`: Album resource as returned by the catalog
/// - `imported_by`: Identity of the caller running the batch
///
/// # Errors
///
/// [`Error::Normalize`] if the title, canonical URL, release type, release
/// date or any track name is missing or blank.
///
/// Track duration is optional and stored as `0` when the catalog omits it.
pub fn normalize_album(raw: &RawAlbum, imported_by: &str) -> Result<AlbumRecord> {
    let title = required(raw.name.as_deref(), "album name")?;
    let external_url = required(raw.external_urls.spotify.as_deref(), "external URL")?;
    let release_type = required(raw.album_type.as_deref(), "album type")?;
    let release_date = required(raw.release_date.as_deref(), "release date")?;

    let tracks = raw
        .tracks
        .items
        .iter()
        .enumerate()
        .map(|(index, track)| normalize_track(track, index))
        .collect::<Result<Vec<_>>>()?;

    Ok(AlbumRecord {
        title,
        release_type,
        cover_url: raw.images.first().map(|image| image.url.clone()),
        genres: raw.genres.clone(),
        external_url,
        release_date,
        imported_by: imported_by.to_string(),
        artists: raw
            .artists
            .iter()
            .filter_map(artist_name)
            .map(|name| ArtistRef { name })
            .collect(),
        tracks,
    })
}

fn normalize_track(track: &RawTrack, index: usize) -> Result<TrackRecord> {
    let name = required(track.name.as_deref(), "track name")
        .map_err(|e| Error::normalize(format!("track {}: {}", index + 1, e)))?;

    // Zero or missing numbers fall back to the source position
    let track_number = match track.track_number {
        Some(number) if number > 0 => number,
        _ => (index + 1) as u32,
    };

    Ok(TrackRecord {
        name,
        track_number,
        duration_ms: track.duration_ms.unwrap_or(0),
        preview_url: track.preview_url.clone(),
        credits: track
            .artists
            .iter()
            .filter_map(artist_name)
            .map(|name| Credit {
                name,
                role: CreditRole::Artist,
            })
            .collect(),
    })
}

fn artist_name(artist: &RawArtist) -> Option<String> {
    artist
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn required(value: Option<&str>, field: &str) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::normalize(format!("missing {}", field))),
    }
}
