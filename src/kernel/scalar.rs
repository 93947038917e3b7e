//! Scalar reference kernel for overlap evaluation.

use crate::geometry::{overlap_from_areas, BBox, Detection, OverlapMetric};
use crate::kernel::OverlapKernel;

/// Scalar overlap kernel; the reference for all other kernels.
pub struct ScalarOverlap;

impl OverlapKernel for ScalarOverlap {
    #[inline]
    fn overlap_pair(a: &BBox, b: &BBox, metric: OverlapMetric) -> f32 {
        overlap_from_areas(a.intersection(b), a.area(), b.area(), metric)
    }

    fn overlap_pool(
        pivot: &BBox,
        rows: &[Detection],
        pool: &[usize],
        metric: OverlapMetric,
        out: &mut Vec<f32>,
    ) {
        out.clear();
        out.reserve(pool.len());
        let pivot_area = pivot.area();
        for &idx in pool {
            let other = &rows[idx].bbox;
            let inter = pivot.intersection(other);
            out.push(overlap_from_areas(inter, pivot_area, other.area(), metric));
        }
    }
}
