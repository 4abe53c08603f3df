//! Song catalog endpoints
//!
//! Handlers only extract raw request values and hand them to
//! [`CatalogService`](crate::services::CatalogService); parsing and
//! validation happen there so every rule has one home.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use mlib_common::{Song, SongFilter};
use serde::Deserialize;
use tracing::debug;

use crate::error::CatalogResult;
use crate::AppState;

/// Query parameters for `GET /songs`.
///
/// Everything arrives as text; absent parameters are empty strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub page: String,
    #[serde(rename = "pageSize")]
    pub page_size: String,
    pub group_name: String,
    pub song_name: String,
    pub song_text: String,
    pub release_date: String,
    pub link: String,
}

impl ListQuery {
    fn filter(&self) -> SongFilter {
        SongFilter {
            group: Some(self.group_name.clone()),
            title: Some(self.song_name.clone()),
            lyrics: Some(self.song_text.clone()),
            release_date: Some(self.release_date.clone()),
            link: Some(self.link.clone()),
        }
    }
}

/// Query parameters for `GET /song/:id`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TextPageQuery {
    pub page: String,
    #[serde(rename = "pageSize")]
    pub page_size: String,
}

/// Body of `POST /song`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewSongRequest {
    pub group: String,
    pub song: String,
}

/// GET /songs
pub async fn list_songs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> CatalogResult<Json<Vec<Song>>> {
    debug!(?query, "GET /songs");
    let songs = state
        .catalog
        .list_by_filter(query.filter(), &query.page_size, &query.page)
        .await?;
    Ok(Json(songs))
}

/// GET /song/:id
///
/// Responds with one page of lyrics as a JSON string.
pub async fn get_song_text(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<TextPageQuery>,
) -> CatalogResult<Json<String>> {
    let text = state
        .catalog
        .get_text_page(&id, &query.page_size, &query.page)
        .await?;
    Ok(Json(text))
}

/// DELETE /song/:id
pub async fn delete_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> CatalogResult<&'static str> {
    state.catalog.delete_by_id(&id).await?;
    Ok("ok")
}

/// PUT /song/:id
pub async fn update_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(song): Json<Song>,
) -> CatalogResult<&'static str> {
    state.catalog.update_by_id(&id, song).await?;
    Ok("ok")
}

/// POST /song
///
/// Looks the song up in the metadata service before storing it.
pub async fn add_song(
    State(state): State<AppState>,
    Json(request): Json<NewSongRequest>,
) -> CatalogResult<&'static str> {
    state
        .catalog
        .enrich_and_create(&request.group, &request.song, state.metadata.as_ref())
        .await?;
    Ok("ok")
}
