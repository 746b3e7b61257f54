//! HTTP request handlers organized by functionality

pub mod stream;
pub mod validate;

// Re-export handler functions
pub use stream::{health, stream_song, stream_video};
pub use validate::{is_valid_song_name, is_valid_video_name};
