//! Property tests for range resolution.
//!
//! The resolver is a pure function, so its contract can be checked
//! exhaustively over generated inputs: exactness of the computed window,
//! open-end defaulting, strict rejection of out-of-bounds requests, and
//! idempotence.

use proptest::prelude::*;
use riffle_core::streaming::resolve_range;
use riffle_core::StreamError;

proptest! {
    /// Valid closed ranges resolve to exactly the requested window.
    #[test]
    fn closed_ranges_resolve_exactly(
        total_size in 1u64..10_000_000,
        start_frac in 0.0f64..1.0,
        len in 1u64..1_000_000,
    ) {
        let start = ((total_size - 1) as f64 * start_frac) as u64;
        let end = (start + len - 1).min(total_size - 1);

        let window = resolve_range(&format!("bytes={start}-{end}"), total_size).unwrap();
        prop_assert_eq!(window.start, start);
        prop_assert_eq!(window.end, end);
        prop_assert_eq!(window.chunk_size(), end - start + 1);
        prop_assert!(window.chunk_size() >= 1);
    }

    /// Open-ended ranges always serve to the last byte.
    #[test]
    fn open_ranges_default_to_last_byte(
        total_size in 1u64..10_000_000,
        start_frac in 0.0f64..1.0,
    ) {
        let start = ((total_size - 1) as f64 * start_frac) as u64;
        let window = resolve_range(&format!("bytes={start}-"), total_size).unwrap();
        prop_assert_eq!(window.end, total_size - 1);
        prop_assert_eq!(window.chunk_size(), total_size - start);
    }

    /// Any window touching an offset at or past the size is rejected, never clamped.
    #[test]
    fn out_of_bounds_windows_are_rejected(
        total_size in 1u64..1_000_000,
        overshoot in 0u64..1_000,
    ) {
        let start_past = resolve_range(&format!("bytes={}-", total_size + overshoot), total_size);
        prop_assert!(
            matches!(start_past, Err(StreamError::UnsatisfiableRange { .. })),
            "expected UnsatisfiableRange, got {:?}",
            start_past
        );

        let end_past = resolve_range(
            &format!("bytes=0-{}", total_size + overshoot),
            total_size,
        );
        prop_assert!(
            matches!(end_past, Err(StreamError::UnsatisfiableRange { .. })),
            "expected UnsatisfiableRange, got {:?}",
            end_past
        );
    }

    /// Resolution has no hidden state: same inputs, same window.
    #[test]
    fn resolution_is_idempotent(
        total_size in 1u64..1_000_000,
        start_frac in 0.0f64..1.0,
    ) {
        let start = ((total_size - 1) as f64 * start_frac) as u64;
        let header = format!("bytes={start}-");
        let first = resolve_range(&header, total_size).unwrap();
        let second = resolve_range(&header, total_size).unwrap();
        prop_assert_eq!(first, second);
    }
}

#[test]
fn boundary_windows_at_exact_edges() {
    // Last valid byte is servable.
    let window = resolve_range("bytes=999-999", 1000).unwrap();
    assert_eq!(window.chunk_size(), 1);

    // One past it is not.
    assert!(matches!(
        resolve_range("bytes=1000-", 1000),
        Err(StreamError::UnsatisfiableRange { .. })
    ));
    assert!(matches!(
        resolve_range("bytes=0-999", 1000).map(|w| w.chunk_size()),
        Ok(1000)
    ));
}
