//! Stream service over the remote upstream source.
//!
//! Spins up an in-process axum upstream with controllable range behavior to
//! verify the proxy variant: HEAD size probe, scoped ranged GET, rejection
//! of upstreams that ignore ranges, and clamping of over-delivery.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use futures::TryStreamExt;
use riffle_core::streaming::{RemoteMediaSource, StreamService};
use riffle_core::StreamError;

/// How the fake upstream answers range requests.
#[derive(Clone, Copy, PartialEq)]
enum RangeBehavior {
    /// Honor the requested window exactly (well-behaved CDN)
    Honor,
    /// Answer 200 with the whole file, ignoring the Range header
    Ignore,
    /// Answer 206 but stream from start to end of file, past the window
    OverDeliver,
}

#[derive(Clone)]
struct UpstreamState {
    data: Arc<Vec<u8>>,
    behavior: RangeBehavior,
}

async fn upstream_song(
    State(state): State<UpstreamState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    if name != "music1.mp3" {
        return StatusCode::NOT_FOUND.into_response();
    }
    let data = &state.data;

    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .filter(|_| state.behavior != RangeBehavior::Ignore)
        .and_then(|v| {
            let (start, end) = v.strip_prefix("bytes=")?.split_once('-')?;
            Some((start.parse::<usize>().ok()?, end.parse::<usize>().ok()?))
        });

    match range {
        Some((start, end)) => {
            let served = match state.behavior {
                RangeBehavior::OverDeliver => data[start..].to_vec(),
                _ => data[start..=end].to_vec(),
            };
            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {start}-{end}/{}", data.len()),
                )
                .header(header::CONTENT_LENGTH, served.len().to_string())
                .body(Body::from(served))
                .unwrap()
        }
        None => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_LENGTH, data.len().to_string())
            .body(Body::from(data.as_slice().to_vec()))
            .unwrap(),
    }
}

/// Binds the fake upstream on an ephemeral port; returns its base URL.
async fn spawn_upstream(data: Vec<u8>, behavior: RangeBehavior) -> String {
    let app = Router::new()
        .route("/songs/{name}", get(upstream_song))
        .with_state(UpstreamState {
            data: Arc::new(data),
            behavior,
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/songs/")
}

fn service_for(base: &str) -> StreamService {
    let source = RemoteMediaSource::new(base.parse().unwrap());
    StreamService::new(Arc::new(source), "audio/mpeg")
}

async fn collect(details: riffle_core::streaming::StreamDetails) -> Vec<u8> {
    details
        .stream
        .try_fold(Vec::new(), |mut acc, chunk| async move {
            acc.extend_from_slice(&chunk);
            Ok(acc)
        })
        .await
        .unwrap()
}

fn song_bytes() -> Vec<u8> {
    (0..2000u32).map(|i| (i % 253) as u8).collect()
}

#[tokio::test]
async fn proxies_exact_window_from_upstream() {
    let data = song_bytes();
    let base = spawn_upstream(data.clone(), RangeBehavior::Honor).await;
    let service = service_for(&base);

    let details = service.serve("music1.mp3", "bytes=100-299").await.unwrap();
    assert_eq!(details.status.as_u16(), 206);
    assert_eq!(details.headers.content_range, "bytes 100-299/2000");
    assert_eq!(details.headers.content_length, 200);
    assert_eq!(details.headers.content_type, "audio/mpeg");
    assert_eq!(collect(details).await, &data[100..300]);
}

#[tokio::test]
async fn head_probe_supplies_total_size_for_open_ranges() {
    let data = song_bytes();
    let base = spawn_upstream(data.clone(), RangeBehavior::Honor).await;
    let service = service_for(&base);

    let details = service.serve("music1.mp3", "bytes=1900-").await.unwrap();
    assert_eq!(details.headers.content_range, "bytes 1900-1999/2000");
    assert_eq!(collect(details).await, &data[1900..]);
}

#[tokio::test]
async fn upstream_ignoring_range_is_a_server_error() {
    let base = spawn_upstream(song_bytes(), RangeBehavior::Ignore).await;
    let service = service_for(&base);

    // A 200 response would deliver bytes from offset zero; serving it would
    // silently corrupt seeks, so it must be refused.
    assert!(matches!(
        service.serve("music1.mp3", "bytes=100-299").await,
        Err(StreamError::Upstream { .. })
    ));
}

#[tokio::test]
async fn over_delivering_upstream_is_clamped_to_the_window() {
    let data = song_bytes();
    let base = spawn_upstream(data.clone(), RangeBehavior::OverDeliver).await;
    let service = service_for(&base);

    let details = service.serve("music1.mp3", "bytes=100-299").await.unwrap();
    let body = collect(details).await;
    assert_eq!(body.len(), 200);
    assert_eq!(body, &data[100..300]);
}

#[tokio::test]
async fn unknown_upstream_resource_is_not_found() {
    let base = spawn_upstream(song_bytes(), RangeBehavior::Honor).await;
    let service = service_for(&base);

    assert!(matches!(
        service.serve("music9.mp3", "bytes=0-").await,
        Err(StreamError::NotFound)
    ));
}

#[tokio::test]
async fn upstream_url_escape_is_denied_without_a_request() {
    let base = spawn_upstream(song_bytes(), RangeBehavior::Honor).await;
    let service = service_for(&base);

    assert!(matches!(
        service.serve("../admin/users.mp3", "bytes=0-").await,
        Err(StreamError::PathTraversal { .. })
    ));
}
