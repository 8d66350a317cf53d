//! Geometry validation errors.
//!
//! `fmm-network` wraps this type as its `InvalidGeometry` variant, so every
//! polyline check lives in one place.

use thiserror::Error;

/// Rejections produced when validating a road polyline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("polyline needs at least 2 points, got {0}")]
    TooFewPoints(usize),

    #[error("point {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

/// Shorthand result type for geometry checks.
pub type GeometryResult<T> = Result<T, GeometryError>;
