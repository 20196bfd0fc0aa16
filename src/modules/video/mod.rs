use axum::Router;
use axum::routing::get;
use tower_http::services::ServeDir;

use crate::infrastructure::storage::local::{PREVIEWS_MOUNT, VIDEOS_MOUNT};
use crate::state::AppState;

pub mod handler;
pub mod model;
pub mod repository;

pub fn router(state: &AppState) -> Router<AppState> {
    let storage = &state.storage;

    Router::new()
        .route("/api/videos", get(handler::list_videos))
        .nest_service(VIDEOS_MOUNT, ServeDir::new(storage.videos_dir()))
        .nest_service(PREVIEWS_MOUNT, ServeDir::new(storage.previews_dir()))
}
