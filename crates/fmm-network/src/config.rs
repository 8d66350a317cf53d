//! Coordinate-mode flag and build parameters carried by a [`Network`].
//!
//! [`Network`]: crate::Network

use serde::{Deserialize, Serialize};

/// Network-wide configuration.  Persisted alongside roads and links when a
/// network is dumped with `with_config = true`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// `true` if coordinates are WGS-84 `(lon, lat, elevation_m)`; `false`
    /// for a projected, already-metric frame.
    #[serde(default)]
    pub is_wgs84: bool,

    /// Cost threshold of the last full UBODT build, `None` if no full build
    /// has run or it was unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ubodt_thresh: Option<f64>,
}

impl NetworkConfig {
    pub fn new(is_wgs84: bool) -> Self {
        Self { is_wgs84, ubodt_thresh: None }
    }
}
