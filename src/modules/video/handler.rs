use axum::{Json, extract::State, response::IntoResponse};

use super::model::VideoRecord;
use crate::state::AppState;

/// List processed videos
#[utoipa::path(
    get,
    path = "/api/videos",
    responses(
        (status = 200, description = "Processed videos, unordered", body = Vec<VideoRecord>)
    ),
    tag = "Videos"
)]
pub async fn list_videos(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.list())
}
