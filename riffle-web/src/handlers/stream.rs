//! Streaming request handlers.
//!
//! One handler per resource class, both funneling through the same flow:
//! allow-list the identifier, require a `Range` header, delegate to the
//! class's stream service, and hand the bounded byte stream to the response
//! body. Dropping the body on any termination path (completion, client
//! disconnect, downstream error) closes the underlying handle.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use riffle_core::streaming::{StreamDetails, StreamService};
use riffle_core::RuntimeMode;
use tracing::info;

use super::validate::{is_valid_song_name, is_valid_video_name};
use crate::error::ApiError;
use crate::server::AppState;

/// Streams a byte range of a song.
pub async fn stream_song(
    State(state): State<AppState>,
    Path(song_name): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !is_valid_song_name(&song_name) {
        return ApiError::invalid_resource_name(&song_name).into_response();
    }
    serve_media(&state.audio, state.runtime_mode, &song_name, &headers).await
}

/// Streams a byte range of a video.
pub async fn stream_video(
    State(state): State<AppState>,
    Path(video_name): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !is_valid_video_name(&video_name) {
        return ApiError::invalid_resource_name(&video_name).into_response();
    }
    serve_media(&state.video, state.runtime_mode, &video_name, &headers).await
}

/// Shared handler tail for both resource classes.
async fn serve_media(
    service: &StreamService,
    mode: RuntimeMode,
    resource: &str,
    headers: &HeaderMap,
) -> Response {
    // The HTTP spec requires a Range header for streaming; whole-file
    // responses are never served.
    let Some(range) = headers.get(header::RANGE).and_then(|v| v.to_str().ok()) else {
        return ApiError::missing_range().into_response();
    };

    info!(resource, range, "streaming request");

    match service.serve(resource, range).await {
        Ok(details) => stream_response(details),
        Err(err) => ApiError::from_stream_error(err, mode).into_response(),
    }
}

/// Frames resolved stream details as a 206 response.
fn stream_response(details: StreamDetails) -> Response {
    let built = Response::builder()
        .status(details.status)
        .header(header::CONTENT_RANGE, details.headers.content_range)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(
            header::CONTENT_LENGTH,
            details.headers.content_length.to_string(),
        )
        .header(header::CONTENT_TYPE, details.headers.content_type)
        .body(Body::from_stream(details.stream));

    match built {
        Ok(response) => response,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "message": "Riffle streaming API is healthy",
        "mode": state.runtime_mode.to_string(),
        "uptime_seconds": state.server_started_at.elapsed().as_secs(),
    }))
}
