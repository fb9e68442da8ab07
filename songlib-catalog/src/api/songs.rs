//! Song endpoints
//!
//! Handlers decode the request, build a request-scoped [`OpContext`] from the
//! server shutdown token, call one service operation and encode the result.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::ApiResult;
use crate::filter::SongFilter;
use crate::models::{Song, SongPatch};
use crate::service::OpContext;
use crate::AppState;

/// Body of POST /songs
#[derive(Debug, Deserialize)]
pub struct CreateSongRequest {
    pub group: String,
    pub song: String,
}

/// Response of POST /songs
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSongResponse {
    pub song_id: Uuid,
}

/// Response of DELETE /songs/:id
#[derive(Debug, Serialize)]
pub struct DeleteSongResponse {
    pub message: String,
}

/// Query parameters for GET /songs
///
/// Filter fields mirror [`SongFilter`]; kept flat because query-string
/// decoding cannot pass numbers through `#[serde(flatten)]`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub id: Option<Uuid>,
    pub group: Option<String>,
    pub song: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub text: Option<String>,
    pub link: Option<String>,

    #[serde(default = "default_limit")]
    pub limit: u32,

    #[serde(default)]
    pub offset: u32,
}

impl ListQuery {
    fn filter(&self) -> SongFilter {
        SongFilter {
            id: self.id,
            group: self.group.clone(),
            title: self.song.clone(),
            release_date: self.release_date,
            text: self.text.clone(),
            link: self.link.clone(),
        }
    }
}

/// Query parameters for GET /songs/:id/verses
#[derive(Debug, Deserialize)]
pub struct VersesQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: usize,

    /// Verses per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_limit() -> u32 {
    10
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    5
}

fn request_context(state: &AppState) -> OpContext {
    OpContext::new(state.shutdown.child_token())
}

/// POST /songs
pub async fn create_song(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateSongRequest>,
) -> ApiResult<(StatusCode, Json<CreateSongResponse>)> {
    let ctx = request_context(&state);
    let song_id = state
        .service
        .create_song(&ctx, &request.group, &request.song)
        .await?;

    Ok((StatusCode::CREATED, Json(CreateSongResponse { song_id })))
}

/// PUT /songs/:id
pub async fn update_song(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<SongPatch>,
) -> ApiResult<Json<Song>> {
    let ctx = request_context(&state);
    let song = state.service.update_song(&ctx, id, patch).await?;
    Ok(Json(song))
}

/// DELETE /songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DeleteSongResponse>> {
    let ctx = request_context(&state);
    state.service.delete_song(&ctx, id).await?;
    Ok(Json(DeleteSongResponse {
        message: "Song deleted successfully".to_string(),
    }))
}

/// GET /songs
pub async fn list_songs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<Song>>> {
    let ctx = request_context(&state);
    let songs = state
        .service
        .list_songs(&ctx, &query.filter(), query.limit, query.offset)
        .await?;
    Ok(Json(songs))
}

/// GET /songs/:id/verses
pub async fn get_verses(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<VersesQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let ctx = request_context(&state);
    let lines = state
        .service
        .get_verses(&ctx, id, query.page, query.page_size)
        .await?;
    Ok(Json(lines))
}

/// Build song routes
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/songs", get(list_songs).post(create_song))
        .route("/songs/:id", put(update_song).delete(delete_song))
        .route("/songs/:id/verses", get(get_verses))
}
