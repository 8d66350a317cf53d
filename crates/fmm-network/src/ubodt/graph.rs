//! CSR snapshot of the road topology for graph search.
//!
//! # Data layout
//!
//! Roads become graph nodes with dense [`RoadIx`] indices assigned in
//! ascending [`RoadId`] order, so comparing two indices gives the same
//! answer as comparing their ids.  Outgoing links of node `n` occupy:
//!
//! ```text
//! edge_to[ out_start[n] .. out_start[n+1] ]
//! ```
//!
//! sorted by target.  Iterating a node's successors is a contiguous slice
//! scan, which is what Dijkstra's inner loop wants.

use rustc_hash::FxHashMap;

use fmm_core::{RoadId, RoadIx};

use crate::road::RoadStore;
use crate::topology::Topology;

pub struct RoadGraph {
    /// `RoadIx → RoadId`, ascending.
    pub ids: Vec<RoadId>,

    /// Length of each road in metres.  Used as the cost of entering it.
    pub length: Vec<f64>,

    /// CSR row pointer.  Length = `road_count + 1`.
    pub out_start: Vec<u32>,

    /// Target of each link, grouped by source.
    pub edge_to: Vec<RoadIx>,

    ix_of: FxHashMap<RoadId, RoadIx>,
}

impl RoadGraph {
    /// Snapshot `roads` and `topology` into CSR form.
    ///
    /// Time complexity: O(R + L).  `Topology::links` already yields links in
    /// `(source, target)` order, so no sort is needed.
    pub fn from_parts(roads: &RoadStore, topology: &Topology) -> Self {
        let road_count = roads.len();
        let mut ids = Vec::with_capacity(road_count);
        let mut length = Vec::with_capacity(road_count);
        let mut ix_of = FxHashMap::with_capacity_and_hasher(road_count, Default::default());
        for (i, road) in roads.iter().enumerate() {
            ix_of.insert(road.id(), RoadIx(i as u32));
            ids.push(road.id());
            length.push(road.length());
        }

        let mut out_start = vec![0u32; road_count + 1];
        let mut edge_to = Vec::with_capacity(topology.len());
        for (s, t) in topology.links() {
            // Dangling links cannot come through `Network`; skip them.
            let (Some(&si), Some(&ti)) = (ix_of.get(&s), ix_of.get(&t)) else {
                continue;
            };
            out_start[si.index() + 1] += 1;
            edge_to.push(ti);
        }
        for i in 1..=road_count {
            out_start[i] += out_start[i - 1];
        }
        debug_assert_eq!(out_start[road_count] as usize, edge_to.len());

        RoadGraph { ids, length, out_start, edge_to, ix_of }
    }

    pub fn road_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    /// Dense index of `id`, if the road was present at snapshot time.
    #[inline]
    pub fn ix(&self, id: RoadId) -> Option<RoadIx> {
        self.ix_of.get(&id).copied()
    }

    #[inline]
    pub fn id(&self, ix: RoadIx) -> RoadId {
        self.ids[ix.index()]
    }

    /// Successors of `ix`, ascending.
    #[inline]
    pub fn out_edges(&self, ix: RoadIx) -> &[RoadIx] {
        let start = self.out_start[ix.index()] as usize;
        let end = self.out_start[ix.index() + 1] as usize;
        &self.edge_to[start..end]
    }
}
