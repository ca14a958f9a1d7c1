//! Domain error types.
//!
//! These errors represent validation failures in planning input. They are
//! distinct from provider/IO errors.

use super::StopId;

/// Domain-level validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Fewer than two stops were left to sequence
    #[error("not enough stops to optimize: need at least 2, got {0}")]
    InsufficientStops(usize),

    /// A stop or the origin has a coordinate outside the valid range
    #[error("invalid coordinate for {0}")]
    InvalidCoordinate(String),

    /// The same stop id appears twice in one request
    #[error("duplicate stop id: {0}")]
    DuplicateStop(StopId),
}
