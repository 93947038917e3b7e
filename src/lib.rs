//! detmerge reconciles overlapping object detections.
//!
//! Detections from overlapping image tiles or repeated detector passes are
//! resolved either by suppression (keep the best, drop the overlapping rest)
//! or by merging (fuse overlapping detections into one). All algorithms work
//! on a flat slice of [`Detection`] rows and identify rows by their index.
//! Per-category batching can run in parallel via the `rayon` feature, the
//! overlap kernel can use `f32x8` lanes via the `simd` feature, and spans and
//! events are emitted via the `tracing` feature.

pub mod batch;
pub mod geometry;
pub mod kernel;
pub mod lowlevel;
pub mod merge;
pub mod postprocess;
pub mod suppress;
mod trace;
pub mod util;

pub use batch::{batched_greedy_nmm, batched_nmm, batched_nms, batched_origin_nms};
pub use geometry::{is_match, overlap, overlap_values, BBox, Detection, MatchParams, OverlapMetric};
pub use merge::{greedy_nmm, nmm, MergeGroup};
pub use postprocess::{
    GreedyNmmPostprocess, NmmPostprocess, NmsPostprocess, ObjectPrediction, PostprocessConfig,
    PostprocessKind, Postprocessor, Prediction,
};
pub use suppress::{nms, origin_nms};
pub use util::{DetMergeError, DetMergeResult};
