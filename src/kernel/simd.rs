//! SIMD-accelerated overlap kernel using the `wide` crate.
//!
//! The pivot is broadcast across eight lanes and compared against eight pool
//! entries at a time using `f32x8`. Results match the scalar kernel exactly,
//! including the zero-denominator rule.

use crate::geometry::{overlap_from_areas, BBox, Detection, OverlapMetric};
use crate::kernel::OverlapKernel;
use wide::f32x8;

const LANES: usize = 8;

/// Gathers one coordinate of eight pool entries into a vector.
#[inline]
fn gather(rows: &[Detection], idx: &[usize], pick: impl Fn(&BBox) -> f32) -> f32x8 {
    f32x8::from([
        pick(&rows[idx[0]].bbox),
        pick(&rows[idx[1]].bbox),
        pick(&rows[idx[2]].bbox),
        pick(&rows[idx[3]].bbox),
        pick(&rows[idx[4]].bbox),
        pick(&rows[idx[5]].bbox),
        pick(&rows[idx[6]].bbox),
        pick(&rows[idx[7]].bbox),
    ])
}

/// SIMD overlap kernel.
pub struct SimdOverlap;

impl OverlapKernel for SimdOverlap {
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

        let px1 = f32x8::splat(pivot.x1);
        let py1 = f32x8::splat(pivot.y1);
        let px2 = f32x8::splat(pivot.x2);
        let py2 = f32x8::splat(pivot.y2);
        let pivot_area = pivot.area();
        let parea = f32x8::splat(pivot_area);

        let mut chunks = pool.chunks_exact(LANES);
        for idx in chunks.by_ref() {
            let x1 = gather(rows, idx, |b| b.x1);
            let y1 = gather(rows, idx, |b| b.y1);
            let x2 = gather(rows, idx, |b| b.x2);
            let y2 = gather(rows, idx, |b| b.y2);

            let w = (x2.min(px2) - x1.max(px1)).max(f32x8::ZERO);
            let h = (y2.min(py2) - y1.max(py1)).max(f32x8::ZERO);
            let inter = w * h;
            let area = (x2 - x1).max(f32x8::ZERO) * (y2 - y1).max(f32x8::ZERO);

            let denom = match metric {
                OverlapMetric::Iou => parea + area - inter,
                OverlapMetric::Ios => area.min(parea),
            };
            let valid = denom.simd_gt(f32x8::ZERO);
            let values = valid.blend(inter / denom, f32x8::ZERO);
            out.extend_from_slice(&values.to_array());
        }

        // Scalar remainder
        for &i in chunks.remainder() {
            let other = &rows[i].bbox;
            let inter = pivot.intersection(other);
            out.push(overlap_from_areas(inter, pivot_area, other.area(), metric));
        }
    }
}
