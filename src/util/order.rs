//! Deterministic score ordering over row indices.

use crate::geometry::Detection;
use std::cmp::Ordering;

/// Descending score, lower index first on ties.
pub(crate) fn cmp_desc(rows: &[Detection], a: usize, b: usize) -> Ordering {
    rows[b]
        .score
        .total_cmp(&rows[a].score)
        .then_with(|| a.cmp(&b))
}

/// Sorts indices by descending score with deterministic tie-breaking.
pub(crate) fn sort_desc(rows: &[Detection], indices: &mut [usize]) {
    indices.sort_by(|&a, &b| cmp_desc(rows, a, b));
}

/// Sorts indices so that popping from the back yields descending score order.
pub(crate) fn sort_pop_order(rows: &[Detection], indices: &mut [usize]) {
    indices.sort_by(|&a, &b| cmp_desc(rows, b, a));
}

#[cfg(test)]
mod tests {
    use super::{sort_desc, sort_pop_order};
    use crate::geometry::{BBox, Detection};

    fn rows(scores: &[f32]) -> Vec<Detection> {
        scores
            .iter()
            .map(|&score| Detection {
                bbox: BBox::default(),
                score,
                category_id: 0,
            })
            .collect()
    }

    #[test]
    fn sort_desc_breaks_ties_by_index() {
        let rows = rows(&[0.5, 0.9, 0.5, 0.1]);
        let mut idx = vec![3, 2, 1, 0];
        sort_desc(&rows, &mut idx);
        assert_eq!(idx, vec![1, 0, 2, 3]);
    }

    #[test]
    fn pop_order_is_reverse_of_desc() {
        let rows = rows(&[0.5, 0.9, 0.5, 0.1]);
        let mut idx: Vec<usize> = (0..4).collect();
        sort_pop_order(&rows, &mut idx);
        assert_eq!(idx, vec![3, 2, 0, 1]);
        assert_eq!(idx.pop(), Some(1));
        assert_eq!(idx.pop(), Some(0));
    }
}
