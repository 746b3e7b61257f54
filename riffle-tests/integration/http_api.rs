//! End-to-end tests over the HTTP boundary.
//!
//! Runs the full router on an ephemeral port and drives it with a real HTTP
//! client: partial-content framing, the collaborator checks (missing Range,
//! filename allow-list), and the error response shape.

use riffle_core::config::{RiffleConfig, SourceConfig};
use riffle_core::RuntimeMode;
use tempfile::TempDir;

/// Media roots with one song and one video, each 1000 deterministic bytes.
fn media_roots() -> (TempDir, RiffleConfig, Vec<u8>) {
    let dir = TempDir::new().unwrap();
    let audio_root = dir.path().join("audio");
    let video_root = dir.path().join("videos");
    std::fs::create_dir(&audio_root).unwrap();
    std::fs::create_dir(&video_root).unwrap();

    let contents: Vec<u8> = (0..1000u32).map(|i| (i % 247) as u8).collect();
    std::fs::write(audio_root.join("music1.mp3"), &contents).unwrap();
    std::fs::write(video_root.join("clip.mp4"), &contents).unwrap();

    let mut config = RiffleConfig::default();
    config.media.audio = SourceConfig::Local { root: audio_root };
    config.media.video = SourceConfig::Local { root: video_root };
    config.runtime_mode = RuntimeMode::Development;

    (dir, config, contents)
}

/// Serves the router on an ephemeral port; returns the base URL.
async fn spawn_server(config: RiffleConfig) -> String {
    let app = riffle_web::router(&config).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn get_with_range(url: &str, range: &str) -> reqwest::Response {
    reqwest::Client::new()
        .get(url)
        .header("Range", range)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn first_half_of_video_is_framed_exactly() {
    let (_dir, config, contents) = media_roots();
    let base = spawn_server(config).await;

    let response = get_with_range(&format!("{base}/api/videos/clip.mp4"), "bytes=0-499").await;
    assert_eq!(response.status().as_u16(), 206);
    assert_eq!(
        response.headers()["content-range"].to_str().unwrap(),
        "bytes 0-499/1000"
    );
    assert_eq!(response.headers()["accept-ranges"].to_str().unwrap(), "bytes");
    assert_eq!(response.headers()["content-length"].to_str().unwrap(), "500");
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "video/mp4"
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), &contents[..500]);
}

#[tokio::test]
async fn open_ended_tail_of_song() {
    let (_dir, config, contents) = media_roots();
    let base = spawn_server(config).await;

    let response = get_with_range(&format!("{base}/api/stream/music1.mp3"), "bytes=900-").await;
    assert_eq!(response.status().as_u16(), 206);
    assert_eq!(
        response.headers()["content-range"].to_str().unwrap(),
        "bytes 900-999/1000"
    );
    assert_eq!(response.headers()["content-length"].to_str().unwrap(), "100");
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "audio/mpeg"
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), &contents[900..]);
}

#[tokio::test]
async fn range_past_end_of_file_is_416() {
    let (_dir, config, _) = media_roots();
    let base = spawn_server(config).await;

    let response =
        get_with_range(&format!("{base}/api/videos/clip.mp4"), "bytes=1000-1010").await;
    assert_eq!(response.status().as_u16(), 416);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn missing_range_header_is_416_with_fixed_message() {
    let (_dir, config, _) = media_roots();
    let base = spawn_server(config).await;

    let response = reqwest::get(format!("{base}/api/videos/clip.mp4"))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 416);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Requires Range header for streaming");
}

#[tokio::test]
async fn malformed_range_header_is_416() {
    let (_dir, config, _) = media_roots();
    let base = spawn_server(config).await;

    let response =
        get_with_range(&format!("{base}/api/videos/clip.mp4"), "bytes=abc-def").await;
    assert_eq!(response.status().as_u16(), 416);
}

#[tokio::test]
async fn disallowed_resource_name_is_400() {
    let (_dir, config, _) = media_roots();
    let base = spawn_server(config).await;

    // Encoded traversal decodes to a name with a slash, which the
    // allow-list rejects before the core ever runs.
    let response = get_with_range(
        &format!("{base}/api/videos/..%2F..%2Fsecret.mp4"),
        "bytes=0-",
    )
    .await;
    assert_eq!(response.status().as_u16(), 400);

    let response = get_with_range(&format!("{base}/api/videos/clip.exe"), "bytes=0-").await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn missing_resource_is_404() {
    let (_dir, config, _) = media_roots();
    let base = spawn_server(config).await;

    let response = get_with_range(&format!("{base}/api/videos/absent.mp4"), "bytes=0-").await;
    assert_eq!(response.status().as_u16(), 404);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn health_endpoint_reports_mode() {
    let (_dir, config, _) = media_roots();
    let base = spawn_server(config).await;

    let response = reqwest::get(format!("{base}/api")).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["mode"], "DEVELOPMENT");
}

#[tokio::test]
async fn identical_concurrent_requests_both_succeed() {
    let (_dir, config, contents) = media_roots();
    let base = spawn_server(config).await;
    let url = format!("{base}/api/videos/clip.mp4");

    let (first, second) = tokio::join!(
        get_with_range(&url, "bytes=0-499"),
        get_with_range(&url, "bytes=0-499"),
    );

    for response in [first, second] {
        assert_eq!(response.status().as_u16(), 206);
        assert_eq!(response.bytes().await.unwrap().as_ref(), &contents[..500]);
    }
}
