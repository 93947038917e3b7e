//! Box geometry and overlap metrics.
//!
//! Boxes use corner coordinates `(x1, y1, x2, y2)` with `x1 <= x2` and
//! `y1 <= y2`. Zero-area boxes are legal. Every overlap value produced here is
//! finite: a zero denominator yields an overlap of `0.0` instead of NaN.

use crate::kernel::OverlapKernel;
use crate::util::{DetMergeError, DetMergeResult};
use std::fmt;
use std::str::FromStr;

#[cfg(not(feature = "simd"))]
use crate::kernel::scalar::ScalarOverlap as ActiveOverlap;
#[cfg(feature = "simd")]
use crate::kernel::simd::SimdOverlap as ActiveOverlap;

/// Axis-aligned bounding box in corner format.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BBox {
    /// Left edge.
    pub x1: f32,
    /// Top edge.
    pub y1: f32,
    /// Right edge.
    pub x2: f32,
    /// Bottom edge.
    pub y2: f32,
}

impl BBox {
    /// Creates a box, rejecting non-finite or unordered corners.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> DetMergeResult<Self> {
        if !(x1.is_finite() && y1.is_finite() && x2.is_finite() && y2.is_finite()) {
            return Err(DetMergeError::InvalidInput("bbox coordinates must be finite"));
        }
        if x1 > x2 || y1 > y2 {
            return Err(DetMergeError::InvalidInput("bbox corners are not ordered"));
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    /// Returns the box width, clamped at zero.
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    /// Returns the box height, clamped at zero.
    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    /// Returns the box area; zero for degenerate boxes.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Returns the intersection area with `other`.
    pub fn intersection(&self, other: &BBox) -> f32 {
        let w = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let h = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        w * h
    }

    /// Returns the smallest box enclosing both `self` and `other`.
    pub fn union_box(&self, other: &BBox) -> BBox {
        BBox {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }
}

/// One detection row: a box, its confidence and its category.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Box coordinates.
    pub bbox: BBox,
    /// Confidence used only for relative ordering.
    pub score: f32,
    /// Category label used for batching.
    pub category_id: u32,
}

impl Detection {
    /// Creates a detection row.
    pub fn new(bbox: BBox, score: f32, category_id: u32) -> Self {
        Self {
            bbox,
            score,
            category_id,
        }
    }
}

/// Overlap metric used to decide whether two boxes match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverlapMetric {
    /// Intersection over union.
    #[default]
    Iou,
    /// Intersection over the smaller of the two areas.
    Ios,
}

impl OverlapMetric {
    /// Returns the canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlapMetric::Iou => "IOU",
            OverlapMetric::Ios => "IOS",
        }
    }
}

impl fmt::Display for OverlapMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverlapMetric {
    type Err = DetMergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("iou") {
            Ok(OverlapMetric::Iou)
        } else if s.eq_ignore_ascii_case("ios") {
            Ok(OverlapMetric::Ios)
        } else {
            Err(DetMergeError::UnknownMetric(s.to_owned()))
        }
    }
}

/// Turns an intersection and the two areas into an overlap value.
#[inline]
pub(crate) fn overlap_from_areas(inter: f32, area_a: f32, area_b: f32, metric: OverlapMetric) -> f32 {
    let denom = match metric {
        OverlapMetric::Iou => area_a + area_b - inter,
        OverlapMetric::Ios => area_a.min(area_b),
    };
    if denom > 0.0 {
        inter / denom
    } else {
        0.0
    }
}

/// Overlap between two boxes.
pub fn overlap(a: &BBox, b: &BBox, metric: OverlapMetric) -> f32 {
    ActiveOverlap::overlap_pair(a, b, metric)
}

/// Overlap of `pivot` against every box in `candidates`, in input order.
pub fn overlap_values(pivot: &BBox, candidates: &[BBox], metric: OverlapMetric) -> Vec<f32> {
    candidates
        .iter()
        .map(|candidate| ActiveOverlap::overlap_pair(pivot, candidate, metric))
        .collect()
}

/// Overlap of row `pivot` against the rows listed in `pool`.
///
/// `out` is cleared and refilled with one value per pool entry.
pub(crate) fn pool_overlaps(
    rows: &[Detection],
    pivot: usize,
    pool: &[usize],
    metric: OverlapMetric,
    out: &mut Vec<f32>,
) {
    ActiveOverlap::overlap_pool(&rows[pivot].bbox, rows, pool, metric, out);
}

/// Returns `true` when the two boxes overlap at or above `threshold`.
pub fn is_match(a: &BBox, b: &BBox, metric: OverlapMetric, threshold: f32) -> bool {
    overlap(a, b, metric) >= threshold
}

/// Overlap metric and threshold shared by every suppression and merge call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchParams {
    /// Metric used to compare boxes.
    pub metric: OverlapMetric,
    /// Boxes with overlap at or above this value match.
    pub threshold: f32,
}

impl MatchParams {
    /// Creates validated match parameters.
    pub fn new(metric: OverlapMetric, threshold: f32) -> DetMergeResult<Self> {
        validate_threshold(threshold)?;
        Ok(Self { metric, threshold })
    }

    /// Returns `true` when `a` and `b` match under these parameters.
    pub fn is_match(&self, a: &BBox, b: &BBox) -> bool {
        is_match(a, b, self.metric, self.threshold)
    }
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            metric: OverlapMetric::Iou,
            threshold: 0.5,
        }
    }
}

/// Validates a match threshold, which must be finite and within `(0, 1]`.
pub fn validate_threshold(threshold: f32) -> DetMergeResult<()> {
    if threshold.is_finite() && threshold > 0.0 && threshold <= 1.0 {
        Ok(())
    } else {
        Err(DetMergeError::InvalidThreshold(threshold))
    }
}
