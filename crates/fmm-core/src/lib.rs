//! `fmm-core`: foundational types for the `fmm` map-matching engine.
//!
//! This crate is a dependency of `fmm-network`.  It intentionally has no
//! `fmm-*` dependencies and minimal external ones (only `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`ids`]     | `RoadId` (persistent), `RoadIx` (dense snapshot index)    |
//! | [`geo`]     | `Point3`, `Bbox`, segment projection, `MetricScale`       |
//! | [`error`]   | `GeometryError`, `GeometryResult`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required by `fmm-network` persistence.                     |

pub mod error;
pub mod geo;
pub mod ids;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{GeometryError, GeometryResult};
pub use geo::{Bbox, MetricScale, Point3, SegmentProjection};
pub use ids::{RoadId, RoadIx};
