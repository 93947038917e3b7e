//! Low-level building blocks for custom postprocessing pipelines.
//!
//! These items expose the index-level algorithms, the category partition and
//! the overlap kernels. Most users should prefer the postprocessors in
//! [`crate::postprocess`].

pub use crate::batch::{
    batched_greedy_nmm, batched_nmm, batched_nms, batched_origin_nms, partition_by_category,
    CategoryBatch,
};
pub use crate::geometry::validate_threshold;
pub use crate::kernel::scalar::ScalarOverlap;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::SimdOverlap;
pub use crate::kernel::OverlapKernel;
pub use crate::merge::{greedy_nmm, nmm, MergeGroup};
pub use crate::suppress::{nms, origin_nms};
