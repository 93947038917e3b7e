#![cfg(feature = "simd")]

use detmerge::lowlevel::{OverlapKernel, ScalarOverlap, SimdOverlap};
use detmerge::{BBox, Detection, OverlapMetric};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn simd_pool_overlaps_match_scalar() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut rows = Vec::new();
    for i in 0..67 {
        let x1 = rng.random_range(0.0f32..50.0);
        let y1 = rng.random_range(0.0f32..50.0);
        // Every fifth box is degenerate to exercise the zero-denominator lanes.
        let (w, h) = if i % 5 == 0 {
            (0.0, rng.random_range(0.0f32..10.0))
        } else {
            (rng.random_range(0.0f32..20.0), rng.random_range(0.0f32..20.0))
        };
        rows.push(Detection::new(BBox::new(x1, y1, x1 + w, y1 + h).unwrap(), 0.5, 0));
    }
    let pool: Vec<usize> = (1..rows.len()).rev().collect();

    for metric in [OverlapMetric::Iou, OverlapMetric::Ios] {
        for pivot in [0usize, 1, 7] {
            let mut scalar = Vec::new();
            let mut simd = Vec::new();
            ScalarOverlap::overlap_pool(&rows[pivot].bbox, &rows, &pool, metric, &mut scalar);
            SimdOverlap::overlap_pool(&rows[pivot].bbox, &rows, &pool, metric, &mut simd);
            assert_eq!(scalar.len(), pool.len());
            assert_eq!(scalar, simd);
            assert!(simd.iter().all(|v| v.is_finite()));
        }
    }
}
