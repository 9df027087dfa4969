//! Metadata resolver
//!
//! Turns one candidate link into a raw catalog album: parse the catalog
//! identifier out of the link, then fetch the album resource.

use crate::catalog::{BearerToken, RawAlbum};
use crate::error::{Error, Result};
use crate::traits::CatalogClient;

/// Parse the catalog identifier from an album link
///
/// The identifier is the path segment between `marker` and the end of the
/// path (`?`, `#` or `/`). Identifiers are non-empty and ASCII alphanumeric.
///
/// ```
/// use spindle_core::resolve::album_id_from_link;
///
/// let id = album_id_from_link(
///     "https://open.spotify.com/album/4m2880jivSbbyEGAKfITCa?si=abc",
///     "open.spotify.com/album/",
/// )
/// .unwrap();
/// assert_eq!(id, "4m2880jivSbbyEGAKfITCa");
/// ```
pub fn album_id_from_link(link: &str, marker: &str) -> Result<String> {
    let start = link
        .find(marker)
        .map(|pos| pos + marker.len())
        .ok_or_else(|| Error::invalid_link(format!("No album marker in link: {}", link)))?;

    let rest = &link[start..];
    let end = rest.find(['?', '#', '/']).unwrap_or(rest.len());
    let id = &rest[..end];

    if id.is_empty() {
        return Err(Error::invalid_link(format!(
            "Empty album identifier in link: {}",
            link
        )));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::invalid_link(format!(
            "Malformed album identifier '{}' in link: {}",
            id, link
        )));
    }

    Ok(id.to_string())
}

/// Resolve a candidate link to its raw catalog album
pub async fn resolve_album(
    catalog: &dyn CatalogClient,
    link: &str,
    marker: &str,
    token: &BearerToken,
) -> Result<RawAlbum> {
    let album_id = album_id_from_link(link, marker)?;
    tracing::debug!(
        "Fetching album {} from {}",
        album_id,
        catalog.provider_name()
    );
    catalog.fetch_album(&album_id, token).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "open.spotify.com/album/";

    #[test]
    fn test_plain_link() {
        let id = album_id_from_link("https://open.spotify.com/album/1A2GTWGtFfWp7KSQTwWOyo", MARKER);
        assert_eq!(id.unwrap(), "1A2GTWGtFfWp7KSQTwWOyo");
    }

    #[test]
    fn test_query_fragment_and_trailing_slash() {
        for link in [
            "https://open.spotify.com/album/abc123?si=xyz",
            "https://open.spotify.com/album/abc123#top",
            "https://open.spotify.com/album/abc123/",
        ] {
            assert_eq!(album_id_from_link(link, MARKER).unwrap(), "abc123", "{}", link);
        }
    }

    #[test]
    fn test_malformed_links() {
        for link in [
            "https://open.spotify.com/track/abc123",
            "https://open.spotify.com/album/",
            "https://open.spotify.com/album/?si=1",
            "https://open.spotify.com/album/abc%20123",
        ] {
            let err = album_id_from_link(link, MARKER).unwrap_err();
            assert!(matches!(err, Error::InvalidLink(_)), "{}", link);
        }
    }

    #[test]
    fn test_locale_prefixed_link() {
        let id = album_id_from_link("https://open.spotify.com/intl-de/album/xyz9", MARKER);
        assert!(id.is_err());
        let id = album_id_from_link("https://open.spotify.com/intl-de/album/xyz9", "/album/");
        assert_eq!(id.unwrap(), "xyz9");
    }
}
