//! Integration tests for Riffle
//!
//! These tests verify the interaction between the range resolver, the media
//! sources, the stream service, and the HTTP boundary, including full
//! request/response cycles against a running server.

#[path = "integration/range_resolution.rs"]
mod range_resolution;

#[path = "integration/local_streaming.rs"]
mod local_streaming;

#[path = "integration/remote_streaming.rs"]
mod remote_streaming;

#[path = "integration/http_api.rs"]
mod http_api;
