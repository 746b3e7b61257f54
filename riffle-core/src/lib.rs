//! Riffle Core - Partial-content media streaming
//!
//! This crate provides the fundamental building blocks for byte-range media
//! serving: HTTP range resolution, pluggable media sources (local filesystem
//! and remote upstream), the partial-content stream service, and
//! configuration management.

pub mod config;
pub mod mode;
pub mod streaming;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::{MediaConfig, RiffleConfig, ServerConfig, SourceConfig};
pub use mode::RuntimeMode;
pub use streaming::{
    ByteWindow, LocalMediaSource, MediaSource, MediaStream, RemoteMediaSource, StreamDetails,
    StreamError, StreamHeaders, StreamService, resolve_range,
};

/// Core errors that can bubble up from any Riffle subsystem.
#[derive(Debug, thiserror::Error)]
pub enum RiffleError {
    #[error("Streaming error: {0}")]
    Streaming(#[from] StreamError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RiffleError>;
