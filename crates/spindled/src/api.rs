//! HTTP handlers

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use spindle_core::BatchResult;
use spindle_core::traits::ArtistSummary;

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_SEARCH_LIMIT: u8 = 10;

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Body of the import endpoint, on success and on batch failure
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub result: BatchResult,
}

/// POST /api/admin/import-albums
///
/// 200 with counts on completion, 401 `{error}` on any authorization
/// failure, 500 with zeroed counts when the batch aborts.
pub async fn import_albums(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.engine.run_batch(authorization(&headers)).await {
        Ok(result) => Json(ImportResponse {
            success: true,
            error: None,
            result,
        })
        .into_response(),
        Err(e) if e.is_authorization() => ApiError::from(e).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ImportResponse {
                success: false,
                error: Some(e.to_string()),
                result: BatchResult::default(),
            }),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
    pub limit: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub artists: Vec<ArtistSummary>,
}

/// GET /api/artists/search?name=&limit=
pub async fn search_artists(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let name = params
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'name' is required".to_string()))?;

    let artists = state
        .engine
        .search_artists(
            authorization(&headers),
            name,
            params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
        )
        .await?;

    Ok(Json(SearchResponse { artists }))
}
