//! HTTP routes

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::error::Error;
use crate::registry::CameraId;
use crate::stream::{multipart, StreamBroadcaster};

use super::pages;

const NOT_FOUND: &str = "Camera not found";
const TOO_MANY_VIEWERS: &str = "Too many viewers";

/// State shared by all handlers
#[derive(Clone)]
pub(crate) struct AppState {
    pub broadcaster: Arc<StreamBroadcaster>,
}

/// Build the router for the dashboard, camera pages and MJPEG feeds
pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/video_feed/:camera_id", get(video_feed))
        .route("/video_stream/:camera_id", get(video_stream))
        .with_state(state)
}

async fn dashboard(State(state): State<AppState>) -> Html<String> {
    Html(pages::dashboard(state.broadcaster.registry()))
}

async fn video_feed(State(state): State<AppState>, Path(camera_id): Path<String>) -> Response {
    // ids that do not parse cannot be registered
    let Ok(id) = camera_id.parse::<CameraId>() else {
        return not_found();
    };

    match state.broadcaster.stream(id) {
        Ok(stream) => (
            [
                (header::CONTENT_TYPE, multipart::CONTENT_TYPE),
                (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
                (header::PRAGMA, "no-cache"),
            ],
            Body::from_stream(stream),
        )
            .into_response(),
        Err(e) if e.is_not_found() => not_found(),
        Err(Error::ViewerLimitReached(_)) => {
            (StatusCode::SERVICE_UNAVAILABLE, TOO_MANY_VIEWERS).into_response()
        }
        Err(e) => {
            tracing::error!(camera = %id, error = %e, "Failed to start stream");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn video_stream(State(state): State<AppState>, Path(camera_id): Path<String>) -> Response {
    let registry = state.broadcaster.registry();
    match camera_id.parse::<CameraId>().map(|id| registry.get(id)) {
        Ok(Ok(entry)) => Html(pages::camera_view(entry)).into_response(),
        _ => not_found(),
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND).into_response()
}
