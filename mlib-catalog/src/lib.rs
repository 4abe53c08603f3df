//! mlib-catalog library - song lyrics catalog service
//!
//! Stores songs (group, title, lyrics, release date, link), lists them with
//! filters and pagination, pages lyrics by verse, and fills in new songs
//! from an external metadata service.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod enrichment;
pub mod error;
pub mod services;

pub use error::{CatalogError, CatalogResult};

use enrichment::MetadataClient;
use services::CatalogService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    /// Source of details for songs created through `POST /song`
    pub metadata: Arc<dyn MetadataClient>,
}

impl AppState {
    pub fn new(catalog: Arc<CatalogService>, metadata: Arc<dyn MetadataClient>) -> Self {
        Self { catalog, metadata }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let songs = Router::new()
        .route("/songs", get(api::list_songs))
        .route(
            "/song/:id",
            get(api::get_song_text)
                .put(api::update_song)
                .delete(api::delete_song),
        )
        .route("/song", post(api::add_song));

    Router::new()
        .merge(songs)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
