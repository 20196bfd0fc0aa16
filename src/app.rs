use axum::Router;
use crate::state::AppState;
use tower_http::trace::TraceLayer;

pub fn create_app(state: AppState) -> Router {
    crate::routes::configure_routes(&state)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::hash::Fingerprint;
    use crate::modules::video::model::VideoRecord;
    use crate::state::testing::test_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use time::OffsetDateTime;
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn lists_recorded_videos() {
        let (_dir, state) = test_state(1).await;
        let id = Uuid::new_v4();
        state.store.add(VideoRecord {
            id,
            file_name: "clip.mp4".into(),
            video_path: format!("/videos/{id}.mp4"),
            preview_path: String::new(),
            compressed: false,
            uploaded_at: OffsetDateTime::now_utc(),
            producer_id: "p1".into(),
            hash: Fingerprint::of(b"clip"),
        });

        let (status, body) = get(create_app(state), "/api/videos").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(1));
        assert_eq!(json[0]["id"], id.to_string());
        assert_eq!(json[0]["fileName"], "clip.mp4");
    }

    #[tokio::test]
    async fn serves_stored_video_files() {
        let (_dir, state) = test_state(1).await;
        std::fs::write(state.storage.videos_dir().join("abc.mp4"), b"mp4 bytes").unwrap();

        let (status, body) = get(create_app(state.clone()), "/videos/abc.mp4").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"mp4 bytes");

        let (status, _) = get(create_app(state), "/previews/missing.mp4").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_and_openapi_respond() {
        let (_dir, state) = test_state(1).await;
        let (status, body) = get(create_app(state.clone()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");

        let (status, body) = get(create_app(state), "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(doc["paths"].get("/api/videos").is_some());
    }

    #[tokio::test]
    async fn serves_embedded_dashboard() {
        let (_dir, state) = test_state(1).await;
        let app = create_app(state);

        let (status, body) = get(app.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("/app.js"));

        let (status, body) = get(app, "/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("/api/videos"));
    }
}
