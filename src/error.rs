//! Error types for the spatial join.

use thiserror::Error;

/// Failures reported by a [`GeometryOps`](crate::GeometryOps) implementation.
///
/// These are always recovered inside the join: the offending
/// submission/block pair is skipped, logged and counted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The overlay kernel could not construct an intersection.
    #[error("overlay construction failed: {0}")]
    Overlay(String),

    /// Any other malformed input.
    #[error("invalid geometry: {0}")]
    Invalid(String),
}

/// Errors surfaced to callers of the join.
#[derive(Error, Debug)]
pub enum JoinError {
    /// The join configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// A block's area is zero, negative or not a number.
    #[error("block {id} has unusable area {area}")]
    DegenerateBlock { id: String, area: f64 },

    /// The run was cancelled between submissions.
    #[error("join cancelled after {processed} submissions")]
    Cancelled { processed: usize },
}

/// Result type for join operations.
pub type Result<T> = std::result::Result<T, JoinError>;
