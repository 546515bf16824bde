//! Spatial-subsystem error type.

use thiserror::Error;

/// Placement errors raised while populating the floor at setup.  Motion
/// never errors: a rejected move is reported as `false`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("{what} at ({x}, {y}) lies outside the floor")]
    OutOfBounds { what: &'static str, x: f32, y: f32 },

    #[error("{what} at ({x}, {y}) overlaps an existing body")]
    Overlap { what: &'static str, x: f32, y: f32 },

    #[error("{0} is already on the floor")]
    Duplicate(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
