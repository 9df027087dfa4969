//! spindled library
//!
//! Thin HTTP layer over spindle-core. Handlers translate headers and query
//! strings into engine calls and engine results into JSON; no pipeline
//! logic lives here.

pub mod api;
pub mod config;
pub mod error;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::ApiError;
pub use state::AppState;

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/api/admin/import-albums", post(api::import_albums))
        .route("/api/artists/search", get(api::search_artists))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
