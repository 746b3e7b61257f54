//! HTTP Range header resolution for media streaming.
//!
//! Resolves a raw `bytes=<start>-[<end>]` header against a known resource
//! size into a concrete byte window, or rejects it. Resolution is a pure
//! function of its inputs; resolving the same header against the same size
//! twice always yields the same window.

use super::StreamError;

/// A resolved byte window over one resource.
///
/// Invariant: `0 <= start <= end < total_size`. Constructed only by
/// [`resolve_range`]; immutable once computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteWindow {
    /// First byte offset to serve, inclusive
    pub start: u64,
    /// Last byte offset to serve, inclusive
    pub end: u64,
    /// Total size of the underlying resource in bytes
    pub total_size: u64,
}

impl ByteWindow {
    /// Number of bytes the window covers. Always at least 1.
    pub fn chunk_size(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for this window.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total_size)
    }
}

/// Resolves a `Range` header against the total resource size.
///
/// `start` is required; an absent `end` means serve to the last byte. The
/// bounds check is strict: a window touching any offset at or beyond
/// `total_size` is rejected rather than clamped, so `Content-Length` always
/// matches exactly what the client asked for.
///
/// # Errors
///
/// - `StreamError::MalformedRange` - header does not parse as `bytes=<start>-[<end>]`
/// - `StreamError::UnsatisfiableRange` - window falls outside `[0, total_size)`,
///   or is inverted (`start > end`)
pub fn resolve_range(header: &str, total_size: u64) -> Result<ByteWindow, StreamError> {
    let malformed = || StreamError::MalformedRange {
        header: header.to_string(),
    };
    let unsatisfiable = || StreamError::UnsatisfiableRange {
        header: header.to_string(),
        total_size,
    };

    let spec = header.strip_prefix("bytes=").ok_or_else(malformed)?;
    let (start_str, end_str) = spec.split_once('-').ok_or_else(malformed)?;

    let start: u64 = start_str.parse().map_err(|_| malformed())?;
    let end: Option<u64> = if end_str.is_empty() {
        None
    } else {
        Some(end_str.parse().map_err(|_| malformed())?)
    };

    // Strict boundary check; also covers zero-length resources.
    if start >= total_size {
        return Err(unsatisfiable());
    }
    let end = end.unwrap_or(total_size - 1);
    if end >= total_size || start > end {
        return Err(unsatisfiable());
    }

    Ok(ByteWindow {
        start,
        end,
        total_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_closed_range() {
        let window = resolve_range("bytes=100-199", 1000).unwrap();
        assert_eq!(window.start, 100);
        assert_eq!(window.end, 199);
        assert_eq!(window.chunk_size(), 100);
        assert_eq!(window.content_range(), "bytes 100-199/1000");
    }

    #[test]
    fn open_end_serves_to_last_byte() {
        let window = resolve_range("bytes=500-", 1000).unwrap();
        assert_eq!(window.end, 999);
        assert_eq!(window.chunk_size(), 500);
    }

    #[test]
    fn single_byte_windows() {
        let first = resolve_range("bytes=0-0", 1000).unwrap();
        assert_eq!(first.chunk_size(), 1);

        let last = resolve_range("bytes=999-999", 1000).unwrap();
        assert_eq!(last.chunk_size(), 1);
    }

    #[test]
    fn rejects_start_beyond_size() {
        assert!(matches!(
            resolve_range("bytes=1000-", 1000),
            Err(StreamError::UnsatisfiableRange { .. })
        ));
    }

    #[test]
    fn rejects_end_beyond_size_without_clamping() {
        // Exact-bounds semantics: an over-long end is an error, not a clamp.
        assert!(matches!(
            resolve_range("bytes=0-1000", 1000),
            Err(StreamError::UnsatisfiableRange { .. })
        ));
        assert!(matches!(
            resolve_range("bytes=1000-1010", 1000),
            Err(StreamError::UnsatisfiableRange { .. })
        ));
    }

    #[test]
    fn rejects_inverted_window() {
        assert!(matches!(
            resolve_range("bytes=500-100", 1000),
            Err(StreamError::UnsatisfiableRange { .. })
        ));
    }

    #[test]
    fn rejects_zero_length_resource() {
        assert!(matches!(
            resolve_range("bytes=0-", 0),
            Err(StreamError::UnsatisfiableRange { .. })
        ));
    }

    #[test]
    fn rejects_missing_prefix() {
        assert!(matches!(
            resolve_range("0-499", 1000),
            Err(StreamError::MalformedRange { .. })
        ));
    }

    #[test]
    fn rejects_non_numeric_input() {
        for header in ["bytes=abc-def", "bytes=-", "bytes=-500", "bytes=12"] {
            assert!(
                matches!(
                    resolve_range(header, 1000),
                    Err(StreamError::MalformedRange { .. })
                ),
                "expected malformed rejection for {header:?}"
            );
        }
    }

    #[test]
    fn rejects_multiple_ranges() {
        // Multi-range requests are outside the supported grammar.
        assert!(matches!(
            resolve_range("bytes=0-99,200-299", 1000),
            Err(StreamError::MalformedRange { .. })
        ));
    }

    #[test]
    fn resolution_is_idempotent() {
        let first = resolve_range("bytes=250-750", 1000).unwrap();
        let second = resolve_range("bytes=250-750", 1000).unwrap();
        assert_eq!(first, second);
    }
}
