//! Shared utility helpers.

pub mod error;
pub(crate) mod order;

pub use error::{DetMergeError, DetMergeResult};
