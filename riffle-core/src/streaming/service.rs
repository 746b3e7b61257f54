//! Partial Content Responder.
//!
//! Orchestrates one request end to end: size lookup, window resolution,
//! bounded cursor open, header assembly. Headers and status are produced
//! only after the full window is resolved; every failure before that point
//! propagates through [`StreamError`] and nothing is emitted.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::debug;

use super::range::{ByteWindow, resolve_range};
use super::source::{MediaSource, MediaStream};
use super::StreamError;

/// Response headers for one partial-content stream.
///
/// `Accept-Ranges: bytes` is implied on every response and added at the
/// transport boundary alongside these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeaders {
    /// `Content-Range: bytes {start}-{end}/{total_size}`
    pub content_range: String,
    /// Exact byte count the stream will deliver
    pub content_length: u64,
    /// Fixed per resource class, never sniffed
    pub content_type: String,
}

/// Everything the transport layer needs to answer one range request.
///
/// The stream is the sole owner of the underlying handle; dropping it on any
/// termination path (completion, disconnect, downstream error) releases the
/// handle.
pub struct StreamDetails {
    pub stream: MediaStream,
    pub headers: StreamHeaders,
    /// Always 206; this service never serves whole-file 200 responses.
    pub status: StatusCode,
}

/// Serves byte windows of one resource class through a pluggable source.
///
/// Cheap to clone; holds no per-request state. Concurrent requests resolve
/// independent windows and open independent cursors without coordination.
#[derive(Clone)]
pub struct StreamService {
    source: Arc<dyn MediaSource>,
    content_type: String,
}

impl StreamService {
    /// Creates a service for one resource class with its fixed content type.
    pub fn new(source: Arc<dyn MediaSource>, content_type: impl Into<String>) -> Self {
        Self {
            source,
            content_type: content_type.into(),
        }
    }

    /// Resolves and opens a partial-content stream for `resource`.
    ///
    /// # Errors
    ///
    /// - `StreamError::PathTraversal` - identifier escapes the configured root
    /// - `StreamError::NotFound` - resource missing or unreadable
    /// - `StreamError::MalformedRange` / `StreamError::UnsatisfiableRange` -
    ///   the range header does not resolve against the resource size
    /// - `StreamError::Upstream` / `StreamError::Io` - source failure
    pub async fn serve(
        &self,
        resource: &str,
        range_header: &str,
    ) -> Result<StreamDetails, StreamError> {
        let total_size = self.source.size(resource).await?;
        let window = resolve_range(range_header, total_size)?;
        let stream = self.source.open_range(resource, &window).await?;

        debug!(
            resource,
            start = window.start,
            end = window.end,
            total_size,
            "serving partial content"
        );

        Ok(StreamDetails {
            stream,
            headers: self.headers_for(&window),
            status: StatusCode::PARTIAL_CONTENT,
        })
    }

    fn headers_for(&self, window: &ByteWindow) -> StreamHeaders {
        StreamHeaders {
            content_range: window.content_range(),
            content_length: window.chunk_size(),
            content_type: self.content_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bytes::Bytes;
    use futures::{StreamExt, TryStreamExt};

    use super::*;

    /// In-memory source for exercising the responder without a filesystem.
    struct MemorySource {
        files: HashMap<String, Vec<u8>>,
    }

    impl MemorySource {
        fn with_file(name: &str, data: Vec<u8>) -> Self {
            let mut files = HashMap::new();
            files.insert(name.to_string(), data);
            Self { files }
        }
    }

    #[async_trait::async_trait]
    impl MediaSource for MemorySource {
        async fn size(&self, resource: &str) -> Result<u64, StreamError> {
            if resource.contains("..") {
                return Err(StreamError::PathTraversal {
                    resource: resource.to_string(),
                });
            }
            self.files
                .get(resource)
                .map(|data| data.len() as u64)
                .ok_or(StreamError::NotFound)
        }

        async fn open_range(
            &self,
            resource: &str,
            window: &ByteWindow,
        ) -> Result<MediaStream, StreamError> {
            let data = self.files.get(resource).ok_or(StreamError::NotFound)?;
            let chunk = Bytes::copy_from_slice(
                &data[window.start as usize..=window.end as usize],
            );
            Ok(Box::pin(futures::stream::iter(vec![Ok(chunk)])))
        }
    }

    fn service_with(data: Vec<u8>) -> StreamService {
        StreamService::new(
            Arc::new(MemorySource::with_file("clip.mp4", data)),
            "video/mp4",
        )
    }

    async fn body_of(details: StreamDetails) -> Vec<u8> {
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
    async fn serves_exact_window_with_framing_headers() {
        let data: Vec<u8> = (0..1000u32).map(|b| (b % 256) as u8).collect();
        let service = service_with(data.clone());

        let details = service.serve("clip.mp4", "bytes=0-499").await.unwrap();
        assert_eq!(details.status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(details.headers.content_range, "bytes 0-499/1000");
        assert_eq!(details.headers.content_length, 500);
        assert_eq!(details.headers.content_type, "video/mp4");
        assert_eq!(body_of(details).await, &data[..500]);
    }

    #[tokio::test]
    async fn open_ended_range_serves_tail() {
        let data: Vec<u8> = vec![7u8; 1000];
        let service = service_with(data);

        let details = service.serve("clip.mp4", "bytes=900-").await.unwrap();
        assert_eq!(details.headers.content_range, "bytes 900-999/1000");
        assert_eq!(details.headers.content_length, 100);
        assert_eq!(body_of(details).await.len(), 100);
    }

    #[tokio::test]
    async fn out_of_bounds_range_is_rejected() {
        let service = service_with(vec![0u8; 1000]);
        assert!(matches!(
            service.serve("clip.mp4", "bytes=1000-1010").await,
            Err(StreamError::UnsatisfiableRange { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_resource_is_not_found() {
        let service = service_with(vec![0u8; 10]);
        assert!(matches!(
            service.serve("missing.mp4", "bytes=0-").await,
            Err(StreamError::NotFound)
        ));
    }

    /// Source whose cursor dies partway through the window.
    struct FaultySource {
        total_size: u64,
    }

    #[async_trait::async_trait]
    impl MediaSource for FaultySource {
        async fn size(&self, _resource: &str) -> Result<u64, StreamError> {
            Ok(self.total_size)
        }

        async fn open_range(
            &self,
            _resource: &str,
            _window: &ByteWindow,
        ) -> Result<MediaStream, StreamError> {
            let items: Vec<std::io::Result<Bytes>> = vec![
                Ok(Bytes::from_static(b"partial")),
                Err(std::io::Error::other("read failed mid-stream")),
            ];
            Ok(Box::pin(futures::stream::iter(items)))
        }
    }

    #[tokio::test]
    async fn mid_stream_failure_surfaces_through_the_stream() {
        let service =
            StreamService::new(Arc::new(FaultySource { total_size: 1000 }), "video/mp4");

        // Headers commit before the cursor is consumed; the failure must
        // arrive as an Err item, not as a silent short read.
        let mut details = service.serve("clip.mp4", "bytes=0-499").await.unwrap();
        assert_eq!(details.status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(details.headers.content_length, 500);

        let first = details.stream.next().await.unwrap().unwrap();
        assert_eq!(&first[..], b"partial");

        let err = details.stream.next().await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "read failed mid-stream");
        assert!(details.stream.next().await.is_none());
    }

    #[tokio::test]
    async fn traversal_fails_before_range_resolution() {
        let service = service_with(vec![0u8; 10]);
        // Even with a nonsense range, the identifier check fires first.
        assert!(matches!(
            service.serve("../clip.mp4", "bytes=broken").await,
            Err(StreamError::PathTraversal { .. })
        ));
    }
}
