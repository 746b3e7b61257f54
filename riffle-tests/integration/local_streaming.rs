//! Stream service over the local filesystem source.
//!
//! Exercises the responder contract end to end against real files: exact
//! window delivery, containment checked ahead of existence, and the
//! not-found folding for resources missing from the root.

use std::sync::Arc;

use futures::TryStreamExt;
use riffle_core::streaming::{LocalMediaSource, StreamService};
use riffle_core::StreamError;
use tempfile::TempDir;

/// A media root with one 1000-byte video and a same-named decoy outside it.
fn media_fixture() -> (TempDir, StreamService, Vec<u8>) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("media");
    std::fs::create_dir(&root).unwrap();

    let contents: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(root.join("clip.mp4"), &contents).unwrap();

    // A file outside the root that a traversal would reach if unchecked.
    std::fs::write(dir.path().join("secret.mp4"), b"outside the jail").unwrap();

    let service = StreamService::new(Arc::new(LocalMediaSource::new(root)), "video/mp4");
    (dir, service, contents)
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

#[tokio::test]
async fn serves_first_half_with_exact_framing() {
    let (_dir, service, contents) = media_fixture();

    let details = service.serve("clip.mp4", "bytes=0-499").await.unwrap();
    assert_eq!(details.status.as_u16(), 206);
    assert_eq!(details.headers.content_range, "bytes 0-499/1000");
    assert_eq!(details.headers.content_length, 500);
    assert_eq!(collect(details).await, &contents[..500]);
}

#[tokio::test]
async fn serves_open_ended_tail() {
    let (_dir, service, contents) = media_fixture();

    let details = service.serve("clip.mp4", "bytes=900-").await.unwrap();
    assert_eq!(details.headers.content_range, "bytes 900-999/1000");
    assert_eq!(details.headers.content_length, 100);
    assert_eq!(collect(details).await, &contents[900..]);
}

#[tokio::test]
async fn rejects_window_past_end_of_file() {
    let (_dir, service, _) = media_fixture();

    assert!(matches!(
        service.serve("clip.mp4", "bytes=1000-1010").await,
        Err(StreamError::UnsatisfiableRange { .. })
    ));
}

#[tokio::test]
async fn traversal_is_denied_even_when_the_target_exists() {
    let (_dir, service, _) = media_fixture();

    // secret.mp4 really exists one level above the root; the request must
    // fail with access denied, not found, proving containment runs first.
    assert!(matches!(
        service.serve("../secret.mp4", "bytes=0-").await,
        Err(StreamError::PathTraversal { .. })
    ));
}

#[tokio::test]
async fn missing_resource_inside_root_is_not_found() {
    let (_dir, service, _) = media_fixture();

    assert!(matches!(
        service.serve("absent.mp4", "bytes=0-").await,
        Err(StreamError::NotFound)
    ));
}

#[tokio::test]
async fn concurrent_overlapping_windows_are_independent() {
    let (_dir, service, contents) = media_fixture();

    let (first, second) = tokio::join!(
        service.serve("clip.mp4", "bytes=0-599"),
        service.serve("clip.mp4", "bytes=400-999"),
    );

    assert_eq!(collect(first.unwrap()).await, &contents[..600]);
    assert_eq!(collect(second.unwrap()).await, &contents[400..]);
}
