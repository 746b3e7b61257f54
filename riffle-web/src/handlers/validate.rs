//! Resource identifier allow-listing.
//!
//! First line of defense against path traversal: identifiers must be a bare
//! filename with an alphanumeric/hyphen/underscore stem and the single
//! extension expected by the route's resource class. The media sources
//! re-check path containment independently (defense in depth).

use std::sync::LazyLock;

use regex::Regex;

static SONG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+\.mp3$").expect("valid song name pattern"));

static VIDEO_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+\.mp4$").expect("valid video name pattern"));

/// Checks a requested song name against the audio allow-list.
pub fn is_valid_song_name(name: &str) -> bool {
    SONG_NAME.is_match(name)
}

/// Checks a requested video name against the video allow-list.
pub fn is_valid_video_name(name: &str) -> bool {
    VIDEO_NAME.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_media_names() {
        assert!(is_valid_song_name("music1.mp3"));
        assert!(is_valid_song_name("my-song_42.mp3"));
        assert!(is_valid_video_name("trailer-1080p.mp4"));
    }

    #[test]
    fn rejects_traversal_shaped_names() {
        assert!(!is_valid_song_name("../secrets.mp3"));
        assert!(!is_valid_song_name("..%2Fsecrets.mp3"));
        assert!(!is_valid_video_name("a/b.mp4"));
        assert!(!is_valid_video_name("..\\evil.mp4"));
    }

    #[test]
    fn rejects_wrong_or_stacked_extensions() {
        assert!(!is_valid_song_name("music1.mp4"));
        assert!(!is_valid_video_name("clip.mp4.exe"));
        assert!(!is_valid_song_name("music1"));
        assert!(!is_valid_song_name("music.1.mp3"));
    }

    #[test]
    fn rejects_empty_and_extension_only_names() {
        assert!(!is_valid_song_name(""));
        assert!(!is_valid_song_name(".mp3"));
    }
}
