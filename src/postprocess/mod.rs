//! Postprocessors that turn raw predictions into a final prediction list.
//!
//! Each postprocessor converts predictions to rows, runs one algorithm
//! (directly, or batched per category when not class-agnostic) and maps the
//! resulting indices back to predictions. The merge variants re-check every
//! pair with [`Prediction::matches`] before fusing it into the keeper, since
//! the keeper grows as members are folded in.

mod prediction;

pub use prediction::{ObjectPrediction, Prediction};

use crate::batch::{batched_greedy_nmm, batched_nmm, batched_origin_nms};
use crate::geometry::{validate_threshold, Detection, MatchParams, OverlapMetric};
use crate::merge::{greedy_nmm, nmm, MergeGroup};
use crate::suppress::nms;
use crate::trace::{trace_event, trace_span};
use crate::util::{DetMergeError, DetMergeResult};
use std::fmt;
use std::str::FromStr;

/// Configuration shared by all postprocessors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostprocessConfig {
    /// Overlap metric.
    pub metric: OverlapMetric,
    /// Match threshold in `(0, 1]`.
    pub threshold: f32,
    /// Ignore categories when matching boxes.
    pub class_agnostic: bool,
    /// Run categories in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self {
            metric: OverlapMetric::Iou,
            threshold: 0.5,
            class_agnostic: true,
            parallel: false,
        }
    }
}

impl PostprocessConfig {
    /// Checks the threshold range.
    pub fn validate(&self) -> DetMergeResult<()> {
        validate_threshold(self.threshold)
    }

    /// Returns the metric and threshold as match parameters.
    pub fn match_params(&self) -> MatchParams {
        MatchParams {
            metric: self.metric,
            threshold: self.threshold,
        }
    }
}

fn to_rows<P: Prediction>(predictions: &[P]) -> Vec<Detection> {
    predictions.iter().map(|p| p.detection()).collect()
}

/// Folds every group into one prediction.
fn fuse_groups<P: Prediction>(predictions: &[P], groups: &[MergeGroup], params: MatchParams) -> Vec<P> {
    let mut fused_pairs = 0usize;
    let out = groups
        .iter()
        .map(|group| {
            let mut keeper = predictions[group.keep].clone();
            for &idx in &group.merge {
                let member = &predictions[idx];
                if keeper.matches(member, params) {
                    keeper = keeper.fuse(member);
                    fused_pairs += 1;
                }
            }
            keeper
        })
        .collect();
    trace_event!("fused", groups = groups.len(), pairs = fused_pairs);
    out
}

/// Suppression-only postprocessor.
#[derive(Clone, Debug)]
pub struct NmsPostprocess {
    config: PostprocessConfig,
}

impl NmsPostprocess {
    /// Creates the postprocessor after validating `config`.
    pub fn new(config: PostprocessConfig) -> DetMergeResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PostprocessConfig {
        &self.config
    }

    /// Keeps the best non-overlapping predictions, treating all as new.
    pub fn run<P: Prediction>(&self, predictions: &[P]) -> Vec<P> {
        self.run_with_originals(predictions, predictions.len())
    }

    /// Keeps the best non-overlapping predictions.
    ///
    /// The first `len_new` predictions are new; the rest are originals from an
    /// earlier pass. When not class-agnostic, originals always survive (see
    /// [`crate::origin_nms`]). The class-agnostic path runs plain NMS over all
    /// predictions and ignores `len_new`.
    pub fn run_with_originals<P: Prediction>(&self, predictions: &[P], len_new: usize) -> Vec<P> {
        let _span = trace_span!(
            "nms_postprocess",
            predictions = predictions.len(),
            class_agnostic = self.config.class_agnostic
        )
        .entered();

        let rows = to_rows(predictions);
        let params = self.config.match_params();
        let keep = if self.config.class_agnostic {
            nms(&rows, params)
        } else {
            batched_origin_nms(&rows, len_new, params, self.config.parallel)
        };
        keep.into_iter().map(|idx| predictions[idx].clone()).collect()
    }
}

/// Single-pass merging postprocessor.
#[derive(Clone, Debug)]
pub struct NmmPostprocess {
    config: PostprocessConfig,
}

impl NmmPostprocess {
    /// Creates the postprocessor after validating `config`.
    pub fn new(config: PostprocessConfig) -> DetMergeResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PostprocessConfig {
        &self.config
    }

    /// Returns one fused prediction per merge group.
    pub fn run<P: Prediction>(&self, predictions: &[P]) -> Vec<P> {
        let _span = trace_span!("nmm_postprocess", predictions = predictions.len()).entered();
        let rows = to_rows(predictions);
        let params = self.config.match_params();
        let groups = if self.config.class_agnostic {
            nmm(&rows, params)
        } else {
            batched_nmm(&rows, params, self.config.parallel)
        };
        fuse_groups(predictions, &groups, params)
    }
}

/// Greedy merging postprocessor.
#[derive(Clone, Debug)]
pub struct GreedyNmmPostprocess {
    config: PostprocessConfig,
}

impl GreedyNmmPostprocess {
    /// Creates the postprocessor after validating `config`.
    pub fn new(config: PostprocessConfig) -> DetMergeResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PostprocessConfig {
        &self.config
    }

    /// Returns one fused prediction per merge group.
    pub fn run<P: Prediction>(&self, predictions: &[P]) -> Vec<P> {
        let _span = trace_span!("greedy_nmm_postprocess", predictions = predictions.len()).entered();
        let rows = to_rows(predictions);
        let params = self.config.match_params();
        let groups = if self.config.class_agnostic {
            greedy_nmm(&rows, params)
        } else {
            batched_greedy_nmm(&rows, params, self.config.parallel)
        };
        fuse_groups(predictions, &groups, params)
    }
}

/// Postprocessing strategy selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PostprocessKind {
    /// Non-maximum suppression.
    Nms,
    /// Single-pass non-maximum merging.
    Nmm,
    /// Greedy non-maximum merging.
    #[default]
    GreedyNmm,
}

impl PostprocessKind {
    /// Returns the canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PostprocessKind::Nms => "NMS",
            PostprocessKind::Nmm => "NMM",
            PostprocessKind::GreedyNmm => "GREEDYNMM",
        }
    }
}

impl fmt::Display for PostprocessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostprocessKind {
    type Err = DetMergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "NMS" => Ok(PostprocessKind::Nms),
            "NMM" => Ok(PostprocessKind::Nmm),
            "GREEDYNMM" => Ok(PostprocessKind::GreedyNmm),
            _ => Err(DetMergeError::InvalidInput("unknown postprocess kind")),
        }
    }
}

/// Any of the three postprocessors, chosen at runtime.
#[derive(Clone, Debug)]
pub enum Postprocessor {
    /// Suppression only.
    Nms(NmsPostprocess),
    /// Single-pass merging.
    Nmm(NmmPostprocess),
    /// Greedy merging.
    GreedyNmm(GreedyNmmPostprocess),
}

impl Postprocessor {
    /// Builds the postprocessor for `kind`.
    pub fn new(kind: PostprocessKind, config: PostprocessConfig) -> DetMergeResult<Self> {
        Ok(match kind {
            PostprocessKind::Nms => Postprocessor::Nms(NmsPostprocess::new(config)?),
            PostprocessKind::Nmm => Postprocessor::Nmm(NmmPostprocess::new(config)?),
            PostprocessKind::GreedyNmm => {
                Postprocessor::GreedyNmm(GreedyNmmPostprocess::new(config)?)
            }
        })
    }

    /// Returns which strategy this is.
    pub fn kind(&self) -> PostprocessKind {
        match self {
            Postprocessor::Nms(_) => PostprocessKind::Nms,
            Postprocessor::Nmm(_) => PostprocessKind::Nmm,
            Postprocessor::GreedyNmm(_) => PostprocessKind::GreedyNmm,
        }
    }

    /// Runs the strategy. `len_new` only affects class-aware suppression.
    pub fn run<P: Prediction>(&self, predictions: &[P], len_new: Option<usize>) -> Vec<P> {
        match self {
            Postprocessor::Nms(inner) => {
                inner.run_with_originals(predictions, len_new.unwrap_or(predictions.len()))
            }
            Postprocessor::Nmm(inner) => inner.run(predictions),
            Postprocessor::GreedyNmm(inner) => inner.run(predictions),
        }
    }
}
