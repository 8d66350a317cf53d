//! Network-subsystem error type.

use thiserror::Error;

use fmm_core::{GeometryError, RoadId};

/// Errors produced by `fmm-network`.
///
/// Every mutating operation validates before it touches state, so an `Err`
/// always means "nothing changed".
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("road {0} already exists")]
    DuplicateId(RoadId),

    #[error("road {0} not found in network")]
    UnknownRoad(RoadId),

    #[error("invalid road geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    #[error("spatial index not built (or stale since last mutation)")]
    NotBuilt,

    #[error("no link from road {source_road} to road {target_road}")]
    NotFound { source_road: RoadId, target_road: RoadId },

    #[error("malformed UBODT record: {0}")]
    MalformedRecord(String),

    #[error("corrupt file: {0}")]
    CorruptFile(String),

    #[error("UBODT build cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
