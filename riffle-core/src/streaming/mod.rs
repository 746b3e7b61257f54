//! Partial-content streaming pipeline.
//!
//! Three layers with one error channel between them: the pure range resolver
//! (`range`), the pluggable media sources (`source`, `local`, `remote`), and
//! the stream service (`service`) that orchestrates a single request from raw
//! `Range` header to framed 206 response parts.

mod local;
mod range;
mod remote;
mod service;
mod source;

pub use local::LocalMediaSource;
pub use range::{ByteWindow, resolve_range};
pub use remote::RemoteMediaSource;
pub use service::{StreamDetails, StreamHeaders, StreamService};
pub use source::{MediaSource, MediaStream};

/// Errors that can occur while resolving and serving a byte range.
///
/// This is the single structured channel for every failure in the serving
/// path, synchronous or mid-stream. Each variant maps to exactly one HTTP
/// status at the web boundary; the core never emits response parts for a
/// failed request.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The resource identifier resolves outside the configured root.
    ///
    /// Checked before any filesystem or network access, so a traversal
    /// attempt is indistinguishable from a lookup that never happened.
    #[error("access denied: '{resource}' escapes the media root")]
    PathTraversal { resource: String },

    /// The resource is missing or not readable.
    ///
    /// The two conditions are deliberately folded together so clients cannot
    /// probe filesystem detail through error responses.
    #[error("resource not found or not readable")]
    NotFound,

    /// The `Range` header does not match `bytes=<start>-[<end>]`.
    #[error("malformed range header: '{header}'")]
    MalformedRange { header: String },

    /// The requested window falls outside the resource's actual size.
    ///
    /// Over-long ranges are rejected, never clamped.
    #[error("range '{header}' not satisfiable for resource of {total_size} bytes")]
    UnsatisfiableRange { header: String, total_size: u64 },

    /// A remote upstream misbehaved (bad status, missing metadata).
    #[error("upstream error: {reason}")]
    Upstream { reason: String },

    /// Unexpected I/O failure during size lookup or stream setup.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
