use crate::types::{IndexRange, Measurement};

/// Resolves the inclusive index interval intersecting `[offset, offset + viewport_size)`.
///
/// `offset` must already be clamped and `measurements` flushed. `anchor` seeds the search for
/// the first index: small scroll deltas land within a few items of the previous start, so the
/// search is amortized O(1) while staying O(log n) in the worst case. The seed never changes
/// the result.
///
/// Returns `None` when the viewport is empty or nothing is measured.
pub fn resolve_range(
    measurements: &[Measurement],
    viewport_size: f64,
    offset: f64,
    anchor: usize,
) -> Option<IndexRange> {
    if viewport_size <= 0.0 || measurements.is_empty() {
        return None;
    }

    let max_index = measurements.len() - 1;
    let anchor = anchor.min(max_index);
    let anchor_start = measurements[anchor].start;

    // An anchor covering `offset` is the answer: everything before it ends at or before its start.
    let start = if anchor_start > offset {
        first_covering(measurements, offset, 0, anchor)
    } else if measurements[anchor].end <= offset {
        first_covering(measurements, offset, anchor, max_index)
    } else {
        anchor
    };

    // Linear on purpose: the far edge is usually a handful of items past `start`.
    let far = offset + viewport_size;
    let mut end = start;
    while end < max_index {
        let m = &measurements[end];
        if m.start < far && m.end >= far {
            break;
        }
        end += 1;
    }

    Some(IndexRange::new(start, end))
}

/// Widens `range` by `overscan` on both sides, clamped to `[0, max_index]`.
pub fn overscan_range(range: IndexRange, overscan: usize, max_index: usize) -> IndexRange {
    IndexRange::new(
        range.start.saturating_sub(overscan),
        range.end.saturating_add(overscan).min(max_index),
    )
}

/// The leftmost index in `[lo, hi]` whose end lies past `offset` (clamped to `hi`).
fn first_covering(measurements: &[Measurement], offset: f64, lo: usize, hi: usize) -> usize {
    let found = lo + measurements[lo..=hi].partition_point(|m| m.end <= offset);
    found.min(hi)
}
