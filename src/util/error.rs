//! Error types for detmerge.

use thiserror::Error;

/// Result alias for detmerge operations.
pub type DetMergeResult<T> = std::result::Result<T, DetMergeError>;

/// Errors that can occur when configuring or running suppression and merging.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetMergeError {
    /// The overlap metric name is not one of the supported selectors.
    #[error("unknown overlap metric: {0:?} (expected \"IOU\" or \"IOS\")")]
    UnknownMetric(String),
    /// The match threshold is not finite or lies outside `(0, 1]`.
    #[error("match threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f32),
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}
