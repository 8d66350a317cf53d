//! Upper-bounded origin–destination table (UBODT).
//!
//! For every ordered road pair `(s, t)` whose cheapest connecting path costs
//! at most a threshold, the table stores that cost plus the first hop out of
//! `s` and the last road before `t`.  A map matcher uses it to price
//! candidate transitions in O(1) instead of running Dijkstra per query.
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`graph`]   | `RoadGraph`: CSR snapshot of the topology                |
//! | [`builder`] | `UbodtBuilder`: bounded per-source Dijkstra              |
//! | [`store`]   | `UbodtStore`: keyed table, merge policies                |
//! | [`file`]    | CSV and binary table codecs                               |

pub mod builder;
pub mod file;
pub mod graph;
pub mod store;

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use fmm_core::RoadId;

pub use builder::UbodtBuilder;
pub use file::UbodtFormat;
pub use graph::RoadGraph;
pub use store::UbodtStore;

/// Cheapest known path from `source_road` to `target_road`.
///
/// `cost` is the summed length of every road after `source_road` up to and
/// including `target_road`.  The remainder of the path is itself a row of the
/// same table, addressed by [`next_key`](Self::next_key) rather than by
/// reference, so rows stay valid across rebuilds and partial reloads.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UbodtRecord {
    pub source_road: RoadId,
    pub target_road: RoadId,
    pub source_next: RoadId,
    pub target_prev: RoadId,
    pub cost: f64,
}

impl UbodtRecord {
    pub fn new(
        source_road: RoadId,
        target_road: RoadId,
        source_next: RoadId,
        target_prev: RoadId,
        cost: f64,
    ) -> Self {
        Self { source_road, target_road, source_next, target_prev, cost }
    }

    /// Table key: `(source_road, target_road)`.
    #[inline]
    pub fn key(&self) -> (RoadId, RoadId) {
        (self.source_road, self.target_road)
    }

    /// Key of the row describing the rest of the path, or `None` when the
    /// first hop already is the target.
    #[inline]
    pub fn next_key(&self) -> Option<(RoadId, RoadId)> {
        (self.source_next != self.target_road).then_some((self.source_next, self.target_road))
    }

    /// Table ordering: ascending `(source_road, target_road)`.
    #[inline]
    pub fn key_cmp(a: &UbodtRecord, b: &UbodtRecord) -> Ordering {
        a.key().cmp(&b.key())
    }

    /// Table membership: two rows describe the same pair.
    #[inline]
    pub fn same_key(a: &UbodtRecord, b: &UbodtRecord) -> bool {
        a.key() == b.key()
    }
}

impl fmt::Display for UbodtRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UbodtRecord(s->t=[{}->{}], cost:{}, sn:{},tp:{})",
            self.source_road, self.target_road, self.cost, self.source_next, self.target_prev
        )
    }
}
