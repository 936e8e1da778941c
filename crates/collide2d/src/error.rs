//! Engine error types

use thiserror::Error;

use crate::foundation::math::Rect;

/// Errors surfaced by the collision engine
///
/// Per-pair problems (degenerate geometry, stale keys) are handled locally
/// and logged; only caller mistakes reach this type.
#[derive(Debug, Error)]
pub enum CollisionError {
    /// World bounds are non-finite or have non-positive extent
    #[error("invalid world bounds: {0:?}")]
    InvalidWorldBounds(Rect),

    /// Delta time is NaN, infinite, or negative
    #[error("invalid delta time: {0}")]
    InvalidDeltaTime(f32),

    /// Configuration failed to parse
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),
}
