//! Riffle Web - JSON API Server
//!
//! HTTP boundary for partial-content media streaming. Routes requests per
//! resource class (audio, video), validates identifiers and the `Range`
//! header, and maps every core failure through one centralized error
//! response shape.

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]

pub mod error;
pub mod handlers;
pub mod server;

// Re-export main types
pub use server::{AppState, router, run_server};
