//! Prediction entities consumed by the postprocessors.

use crate::geometry::{BBox, Detection, MatchParams};

/// A detection-like value the postprocessors can select and fuse.
///
/// Implementors expose their row view for the algorithms and decide how two
/// predictions combine. The default match check compares the two boxes with
/// the geometry kernel.
pub trait Prediction: Clone {
    /// Returns the row used by the suppression and merge algorithms.
    fn detection(&self) -> Detection;

    /// Combines `self` with `other` into one representative prediction.
    fn fuse(&self, other: &Self) -> Self;

    /// Returns `true` when `self` and `other` should be fused.
    fn matches(&self, other: &Self, params: MatchParams) -> bool {
        params.is_match(&self.detection().bbox, &other.detection().bbox)
    }
}

// Bare rows fuse like `ObjectPrediction`, minus the category name.
impl Prediction for Detection {
    fn detection(&self) -> Detection {
        *self
    }

    fn fuse(&self, other: &Self) -> Self {
        let best = if other.score > self.score { other } else { self };
        Detection {
            bbox: self.bbox.union_box(&other.bbox),
            score: best.score,
            category_id: best.category_id,
        }
    }
}

/// An object prediction with an optional human-readable category name.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectPrediction {
    /// Box coordinates.
    pub bbox: BBox,
    /// Detector confidence.
    pub score: f32,
    /// Category label.
    pub category_id: u32,
    /// Category name, when the detector provides one.
    pub category_name: Option<String>,
}

impl ObjectPrediction {
    /// Creates a prediction without a category name.
    pub fn new(bbox: BBox, score: f32, category_id: u32) -> Self {
        Self {
            bbox,
            score,
            category_id,
            category_name: None,
        }
    }

    /// Attaches a category name.
    pub fn with_category_name(mut self, name: impl Into<String>) -> Self {
        self.category_name = Some(name.into());
        self
    }
}

impl Prediction for ObjectPrediction {
    fn detection(&self) -> Detection {
        Detection::new(self.bbox, self.score, self.category_id)
    }

    fn fuse(&self, other: &Self) -> Self {
        let best = if other.score > self.score { other } else { self };
        Self {
            bbox: self.bbox.union_box(&other.bbox),
            score: best.score,
            category_id: best.category_id,
            category_name: best.category_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ObjectPrediction, Prediction};
    use crate::geometry::{BBox, Detection, MatchParams, OverlapMetric};

    #[test]
    fn fuse_takes_enclosing_box_and_best_label() {
        let a = ObjectPrediction::new(BBox::new(0.0, 0.0, 10.0, 10.0).unwrap(), 0.6, 1)
            .with_category_name("car");
        let b = ObjectPrediction::new(BBox::new(2.0, -1.0, 12.0, 8.0).unwrap(), 0.8, 2)
            .with_category_name("truck");
        let fused = a.fuse(&b);
        assert_eq!(fused.bbox, BBox::new(0.0, -1.0, 12.0, 10.0).unwrap());
        assert_eq!(fused.score, 0.8);
        assert_eq!(fused.category_id, 2);
        assert_eq!(fused.category_name.as_deref(), Some("truck"));
    }

    #[test]
    fn fuse_prefers_self_on_equal_scores() {
        let a = ObjectPrediction::new(BBox::new(0.0, 0.0, 1.0, 1.0).unwrap(), 0.5, 1);
        let b = ObjectPrediction::new(BBox::new(0.0, 0.0, 1.0, 1.0).unwrap(), 0.5, 2);
        assert_eq!(a.fuse(&b).category_id, 1);
    }

    #[test]
    fn rows_fuse_into_enclosing_box_with_best_category() {
        let a = Detection::new(BBox::new(0.0, 0.0, 10.0, 10.0).unwrap(), 0.4, 3);
        let b = Detection::new(BBox::new(5.0, 5.0, 15.0, 12.0).unwrap(), 0.7, 4);
        let fused = a.fuse(&b);
        assert_eq!(fused.bbox, BBox::new(0.0, 0.0, 15.0, 12.0).unwrap());
        assert_eq!(fused.score, 0.7);
        assert_eq!(fused.category_id, 4);
        assert_eq!(b.fuse(&a), fused);
        assert_eq!(a.detection(), a);
    }

    #[test]
    fn default_match_uses_box_overlap() {
        let a = ObjectPrediction::new(BBox::new(0.0, 0.0, 10.0, 10.0).unwrap(), 0.9, 0);
        let b = ObjectPrediction::new(BBox::new(2.0, 2.0, 7.0, 7.0).unwrap(), 0.4, 0);
        let ios = MatchParams::new(OverlapMetric::Ios, 0.5).unwrap();
        let iou = MatchParams::new(OverlapMetric::Iou, 0.5).unwrap();
        assert!(a.matches(&b, ios));
        assert!(!a.matches(&b, iou));
    }
}
