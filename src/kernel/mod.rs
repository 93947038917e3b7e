//! Overlap kernel implementations.

use crate::geometry::{BBox, Detection, OverlapMetric};

/// Kernel trait for pairwise and pivot-against-pool overlap evaluation.
pub trait OverlapKernel {
    /// Computes the overlap between two boxes.
    fn overlap_pair(a: &BBox, b: &BBox, metric: OverlapMetric) -> f32;

    /// Computes the overlap of `pivot` against `rows[pool[i]]` for every `i`.
    ///
    /// `out` is cleared first and holds `pool.len()` values on return.
    fn overlap_pool(
        pivot: &BBox,
        rows: &[Detection],
        pool: &[usize],
        metric: OverlapMetric,
        out: &mut Vec<f32>,
    );
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;
