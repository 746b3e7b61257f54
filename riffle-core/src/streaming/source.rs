//! Core abstraction over media storage.
//!
//! The stream service is written once against [`MediaSource`]; where the
//! bytes actually live (a directory on disk, a remote HTTP upstream) is an
//! implementation detail behind this seam.

use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;

use super::range::ByteWindow;
use super::StreamError;

/// A bounded, read-only byte stream over exactly one resolved window.
///
/// The stream owns whatever handle or connection backs it and releases it
/// when the stream is fully consumed or dropped, including on client
/// disconnect. Mid-transfer failures surface as `Err` items, the same
/// structured channel the synchronous path uses.
pub type MediaStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// Resource-access capability for one class of media.
///
/// Implementations resolve opaque resource identifiers to stored bytes and
/// open scoped read cursors over them. Each call is independent; nothing is
/// shared between concurrent requests, and resources are treated as
/// immutable for the duration of service.
#[async_trait::async_trait]
pub trait MediaSource: Send + Sync {
    /// Returns the total size of the resource in bytes.
    ///
    /// Implementations must check identifier containment before any access
    /// that could reveal whether the resource exists.
    ///
    /// # Errors
    ///
    /// - `StreamError::PathTraversal` - identifier escapes the configured root
    /// - `StreamError::NotFound` - resource missing or unreadable
    /// - `StreamError::Upstream` - remote source could not report a size
    /// - `StreamError::Io` - unexpected failure during the lookup
    async fn size(&self, resource: &str) -> Result<u64, StreamError>;

    /// Opens a read cursor bounded to exactly `[window.start, window.end]`.
    ///
    /// The returned stream never yields bytes outside the window, even when
    /// the underlying reader buffers past it.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`MediaSource::size`].
    async fn open_range(
        &self,
        resource: &str,
        window: &ByteWindow,
    ) -> Result<MediaStream, StreamError>;
}
