//! Discard-based overlap resolution.
//!
//! Both suppressors run the same greedy loop over a candidate pool kept in
//! ascending score order: pop the best remaining row, drop every pool member
//! that overlaps it at or above the threshold, repeat until the pool is empty.
//! The origin-aware variant seeds the pool with two streams and re-admits any
//! original row the loop discarded.

use crate::geometry::{pool_overlaps, Detection, MatchParams};
use crate::trace::{trace_event, trace_span};
use crate::util::order::{sort_desc, sort_pop_order};

/// Runs the greedy suppression loop over `pool`, popping from the back.
///
/// Returns kept indices in pop order.
fn suppress_pool(rows: &[Detection], mut pool: Vec<usize>, params: MatchParams) -> Vec<usize> {
    let mut keep = Vec::new();
    let mut overlaps = Vec::with_capacity(pool.len());

    while let Some(pivot) = pool.pop() {
        keep.push(pivot);
        if pool.is_empty() {
            break;
        }

        pool_overlaps(rows, pivot, &pool, params.metric, &mut overlaps);
        let mut values = overlaps.iter();
        // `retain` visits the pool in order, one value per member.
        pool.retain(|_| values.next().is_some_and(|&v| v < params.threshold));
    }

    keep
}

/// Class-agnostic non-maximum suppression.
///
/// Returns the indices of surviving rows sorted by descending score. Equal
/// scores are resolved in favour of the lower index.
pub fn nms(rows: &[Detection], params: MatchParams) -> Vec<usize> {
    let _span = trace_span!("nms", rows = rows.len()).entered();
    if rows.is_empty() {
        return Vec::new();
    }

    let mut pool: Vec<usize> = (0..rows.len()).collect();
    sort_pop_order(rows, &mut pool);
    let mut keep = suppress_pool(rows, pool, params);
    sort_desc(rows, &mut keep);

    trace_event!("nms_kept", kept = keep.len());
    keep
}

/// Non-maximum suppression that never discards "original" rows.
///
/// The first `len_new` rows are newly produced detections; the remaining rows
/// are originals accepted by an earlier pass. Each stream is ordered by score
/// on its own and the original stream is placed after the new one, so the
/// loop pops every original before any new row. Originals can suppress new
/// rows (and each other during the loop), but any original the loop dropped
/// is appended back afterwards. At equal scores an original therefore wins
/// over a new row.
///
/// With `len_new == 0` every row is kept. With `len_new >= rows.len()` this
/// is plain [`nms`].
pub fn origin_nms(rows: &[Detection], len_new: usize, params: MatchParams) -> Vec<usize> {
    let _span = trace_span!("origin_nms", rows = rows.len(), len_new = len_new).entered();
    if rows.is_empty() {
        return Vec::new();
    }

    let split = len_new.min(rows.len());
    let mut new_stream: Vec<usize> = (0..split).collect();
    let mut original_stream: Vec<usize> = (split..rows.len()).collect();
    sort_pop_order(rows, &mut new_stream);
    sort_pop_order(rows, &mut original_stream);

    let mut pool = Vec::with_capacity(rows.len());
    pool.extend_from_slice(&new_stream);
    pool.extend_from_slice(&original_stream);

    let mut keep = suppress_pool(rows, pool, params);
    let looped = keep.len();

    let mut kept = vec![false; rows.len()];
    for &idx in &keep {
        kept[idx] = true;
    }
    for &idx in &original_stream {
        if !kept[idx] {
            kept[idx] = true;
            keep.push(idx);
        }
    }
    sort_desc(rows, &mut keep);

    trace_event!(
        "origin_nms_kept",
        kept = keep.len(),
        restored = keep.len() - looped
    );
    keep
}
