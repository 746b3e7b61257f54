//! Remote HTTP upstream media source.
//!
//! Proxy variant of the resource-access capability: resource size comes from
//! a HEAD probe of the upstream, and the read cursor is a scoped upstream
//! byte-range request. The responder logic is identical to the local
//! filesystem variant; only this seam differs.

use bytes::Bytes;
use futures::{Stream, StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode, header};
use tracing::{debug, warn};
use url::Url;

use super::range::ByteWindow;
use super::source::{MediaSource, MediaStream};
use super::StreamError;

/// Serves byte ranges by proxying a remote HTTP upstream.
#[derive(Debug, Clone)]
pub struct RemoteMediaSource {
    client: Client,
    base: Url,
}

impl RemoteMediaSource {
    /// Creates a source proxying `base`. The base URL should end with a
    /// trailing slash so resource names join as path segments under it.
    pub fn new(base: Url) -> Self {
        Self::with_client(Client::new(), base)
    }

    /// Creates a source using a caller-provided client, e.g. one with
    /// custom timeouts.
    pub fn with_client(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    /// Joins `resource` under the base URL and verifies it stays there.
    ///
    /// The containment check mirrors the local source's root jail: relative
    /// segments or absolute URLs that resolve outside the base are rejected
    /// before any request is made.
    fn resource_url(&self, resource: &str) -> Result<Url, StreamError> {
        let traversal = || {
            warn!(resource, "rejected upstream URL escape attempt");
            StreamError::PathTraversal {
                resource: resource.to_string(),
            }
        };

        let url = self.base.join(resource).map_err(|_| traversal())?;
        if !url.as_str().starts_with(self.base.as_str()) {
            return Err(traversal());
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl MediaSource for RemoteMediaSource {
    async fn size(&self, resource: &str) -> Result<u64, StreamError> {
        let url = self.resource_url(resource)?;

        // HEAD probe: cheap size lookup without pulling any content.
        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(|e| StreamError::Upstream {
                reason: format!("HEAD {url} failed: {e}"),
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StreamError::NotFound);
        }
        if !response.status().is_success() {
            return Err(StreamError::Upstream {
                reason: format!("HEAD {url} returned {}", response.status()),
            });
        }

        response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
            .ok_or_else(|| StreamError::Upstream {
                reason: format!("upstream did not report a content length for {url}"),
            })
    }

    async fn open_range(
        &self,
        resource: &str,
        window: &ByteWindow,
    ) -> Result<MediaStream, StreamError> {
        let url = self.resource_url(resource)?;

        let response = self
            .client
            .get(url.clone())
            .header(
                header::RANGE,
                format!("bytes={}-{}", window.start, window.end),
            )
            .send()
            .await
            .map_err(|e| StreamError::Upstream {
                reason: format!("GET {url} failed: {e}"),
            })?;

        match response.status() {
            StatusCode::PARTIAL_CONTENT => {}
            StatusCode::NOT_FOUND => return Err(StreamError::NotFound),
            status => {
                // A 200 here would carry the whole file from offset zero;
                // serving it would break the Content-Length contract.
                return Err(StreamError::Upstream {
                    reason: format!("upstream returned {status} to a range request"),
                });
            }
        }

        debug!(%url, start = window.start, end = window.end, "opened upstream range");

        let body = response.bytes_stream().map_err(std::io::Error::other);
        Ok(clamp_stream(body, window.chunk_size()))
    }
}

/// Bounds a byte stream to at most `limit` bytes, truncating the final chunk.
///
/// The window contract holds even against an upstream that over-delivers.
fn clamp_stream(
    stream: impl Stream<Item = std::io::Result<Bytes>> + Send + 'static,
    limit: u64,
) -> MediaStream {
    let clamped = stream.scan(limit, |remaining, item| {
        let next = match item {
            Err(e) => Some(Err(e)),
            Ok(mut chunk) => {
                if *remaining == 0 {
                    None
                } else {
                    if chunk.len() as u64 > *remaining {
                        chunk.truncate(*remaining as usize);
                    }
                    *remaining -= chunk.len() as u64;
                    Some(Ok(chunk))
                }
            }
        };
        futures::future::ready(next)
    });
    Box::pin(clamped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(base: &str) -> RemoteMediaSource {
        RemoteMediaSource::new(base.parse().unwrap())
    }

    #[test]
    fn resource_url_joins_under_base() {
        let source = source("https://media.example.com/songs/");
        let url = source.resource_url("music1.mp3").unwrap();
        assert_eq!(url.as_str(), "https://media.example.com/songs/music1.mp3");
    }

    #[test]
    fn resource_url_rejects_escapes() {
        let source = source("https://media.example.com/songs/");
        for resource in ["../admin/secret.mp3", "/etc/passwd", "https://evil.example.com/x.mp3"] {
            assert!(
                matches!(
                    source.resource_url(resource),
                    Err(StreamError::PathTraversal { .. })
                ),
                "expected escape rejection for {resource:?}"
            );
        }
    }

    #[tokio::test]
    async fn clamp_stream_truncates_over_delivery() {
        let chunks = vec![
            Ok(Bytes::from_static(b"0123")),
            Ok(Bytes::from_static(b"4567")),
            Ok(Bytes::from_static(b"89ab")),
        ];
        let clamped = clamp_stream(futures::stream::iter(chunks), 6);
        let collected: Vec<u8> = clamped
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
            .unwrap();
        assert_eq!(collected, b"012345");
    }

    #[tokio::test]
    async fn clamp_stream_propagates_upstream_errors() {
        let chunks: Vec<std::io::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"0123")),
            Err(std::io::Error::other("connection reset")),
        ];
        let mut clamped = clamp_stream(futures::stream::iter(chunks), 100);

        let first = clamped.next().await.unwrap().unwrap();
        assert_eq!(&first[..], b"0123");
        let err = clamped.next().await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
    }

    #[tokio::test]
    async fn clamp_stream_passes_short_streams_through() {
        let chunks = vec![Ok(Bytes::from_static(b"0123"))];
        let clamped = clamp_stream(futures::stream::iter(chunks), 100);
        let collected: Vec<u8> = clamped
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
            .unwrap();
        assert_eq!(collected, b"0123");
    }
}
