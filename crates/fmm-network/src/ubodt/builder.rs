//! Bounded multi-source shortest paths.
//!
//! One label-setting (Dijkstra) search per source road over a
//! [`RoadGraph`].  The cost of moving `u → v` is the length of `v`, so the
//! cost of a row is the distance driven from the end of the source road to
//! the end of the target road.
//!
//! # Pruning
//!
//! Relaxations whose cost exceeds the threshold are never pushed, so a
//! search touches only the roads reachable within the threshold and total
//! work is proportional to the number of rows produced.
//!
//! # Determinism
//!
//! The heap key is `(cost, RoadIx)` and `RoadIx` order equals `RoadId`
//! order, so among equal-cost frontier entries the lower road id settles
//! first.  When two predecessors reach a road at equal cost, the lower id
//! predecessor is kept.  Output is sorted by `(source_road, target_road)`
//! after the per-source results are merged, so the row set does not depend
//! on worker count or scheduling.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};
use ordered_float::OrderedFloat;

use fmm_core::RoadIx;

use crate::ubodt::{RoadGraph, UbodtRecord};
use crate::{NetworkError, NetworkResult};

// ── Per-search scratch buffers ────────────────────────────────────────────────

/// Dense per-road search state, reused across sources.  Only entries listed
/// in `touched` are reset between searches.
struct SearchScratch {
    dist: Vec<f64>,
    prev: Vec<RoadIx>,
    first: Vec<RoadIx>,
    settled: Vec<bool>,
    touched: Vec<RoadIx>,
    heap: BinaryHeap<Reverse<(OrderedFloat<f64>, RoadIx)>>,
}

impl SearchScratch {
    fn new(road_count: usize) -> Self {
        Self {
            dist: vec![f64::INFINITY; road_count],
            prev: vec![RoadIx::INVALID; road_count],
            first: vec![RoadIx::INVALID; road_count],
            settled: vec![false; road_count],
            touched: Vec::new(),
            heap: BinaryHeap::new(),
        }
    }

    fn reset(&mut self) {
        for ix in self.touched.drain(..) {
            let i = ix.index();
            self.dist[i] = f64::INFINITY;
            self.prev[i] = RoadIx::INVALID;
            self.first[i] = RoadIx::INVALID;
            self.settled[i] = false;
        }
        self.heap.clear();
    }
}

// ── UbodtBuilder ──────────────────────────────────────────────────────────────

/// Runs bounded searches over a graph snapshot.
///
/// ```
/// use fmm_core::{Point3, RoadId};
/// use fmm_network::Network;
/// use fmm_network::ubodt::{RoadGraph, UbodtBuilder};
///
/// let mut net = Network::new(false);
/// net.add_road(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)], RoadId(1)).unwrap();
/// net.add_road(vec![Point3::new(10.0, 0.0, 0.0), Point3::new(20.0, 0.0, 0.0)], RoadId(2)).unwrap();
/// net.add_link(RoadId(1), RoadId(2)).unwrap();
///
/// let graph = RoadGraph::from_parts(net.road_store(), net.topology());
/// let rows = UbodtBuilder::new(&graph, Some(100.0)).build_all().unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].cost, 10.0);
/// ```
pub struct UbodtBuilder<'a> {
    graph: &'a RoadGraph,
    thresh: Option<f64>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> UbodtBuilder<'a> {
    /// `thresh = None` means unbounded.
    pub fn new(graph: &'a RoadGraph, thresh: Option<f64>) -> Self {
        Self { graph, thresh, cancel: None }
    }

    /// Consult `flag` between source searches; once it reads `true` the
    /// build stops with [`NetworkError::Cancelled`].  A search that has
    /// started always runs to completion.
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Rows for every source road, sorted by `(source_road, target_road)`.
    pub fn build_all(&self) -> NetworkResult<Vec<UbodtRecord>> {
        let sources: Vec<RoadIx> = (0..self.graph.road_count() as u32).map(RoadIx).collect();
        self.build_from(&sources)
    }

    /// Rows for the given sources only, sorted by `(source_road, target_road)`.
    pub fn build_from(&self, sources: &[RoadIx]) -> NetworkResult<Vec<UbodtRecord>> {
        let mut rows = self.run(sources)?;
        rows.sort_unstable_by(UbodtRecord::key_cmp);
        info!(
            "UBODT: {} sources over {} roads / {} links -> {} rows (thresh {:?})",
            sources.len(),
            self.graph.road_count(),
            self.graph.edge_count(),
            rows.len(),
            self.thresh,
        );
        Ok(rows)
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    #[cfg(not(feature = "parallel"))]
    fn run(&self, sources: &[RoadIx]) -> NetworkResult<Vec<UbodtRecord>> {
        let mut scratch = SearchScratch::new(self.graph.road_count());
        let mut rows = Vec::new();
        for &source in sources {
            if self.cancelled() {
                warn!("UBODT build cancelled after {} rows", rows.len());
                return Err(NetworkError::Cancelled);
            }
            self.search(source, &mut scratch, &mut rows);
        }
        Ok(rows)
    }

    #[cfg(feature = "parallel")]
    fn run(&self, sources: &[RoadIx]) -> NetworkResult<Vec<UbodtRecord>> {
        use rayon::prelude::*;

        let road_count = self.graph.road_count();
        let per_source: Option<Vec<Vec<UbodtRecord>>> = sources
            .par_iter()
            .map_init(
                || SearchScratch::new(road_count),
                |scratch, &source| {
                    if self.cancelled() {
                        return None;
                    }
                    let mut rows = Vec::new();
                    self.search(source, scratch, &mut rows);
                    Some(rows)
                },
            )
            .collect();

        match per_source {
            Some(chunks) => Ok(chunks.into_iter().flatten().collect()),
            None => {
                warn!("UBODT build cancelled");
                Err(NetworkError::Cancelled)
            }
        }
    }

    /// Single-source bounded Dijkstra; appends one row per settled road
    /// other than `source`.
    fn search(&self, source: RoadIx, scratch: &mut SearchScratch, out: &mut Vec<UbodtRecord>) {
        let graph = self.graph;
        scratch.reset();

        scratch.dist[source.index()] = 0.0;
        scratch.touched.push(source);
        scratch.heap.push(Reverse((OrderedFloat(0.0), source)));

        while let Some(Reverse((OrderedFloat(cost), u))) = scratch.heap.pop() {
            // Skip stale heap entries.
            if scratch.settled[u.index()] {
                continue;
            }
            scratch.settled[u.index()] = true;

            if u != source {
                out.push(UbodtRecord::new(
                    graph.id(source),
                    graph.id(u),
                    graph.id(scratch.first[u.index()]),
                    graph.id(scratch.prev[u.index()]),
                    cost,
                ));
            }

            for &v in graph.out_edges(u) {
                let vi = v.index();
                if scratch.settled[vi] {
                    continue;
                }
                let new_cost = cost + graph.length[vi];
                if self.thresh.is_some_and(|t| !(new_cost <= t)) {
                    continue;
                }

                let old = scratch.dist[vi];
                let better = new_cost < old;
                let tie = new_cost == old && u < scratch.prev[vi];
                if !(better || tie) {
                    continue;
                }
                if old == f64::INFINITY {
                    scratch.touched.push(v);
                }
                scratch.dist[vi] = new_cost;
                scratch.prev[vi] = u;
                scratch.first[vi] = if u == source { v } else { scratch.first[u.index()] };
                if better {
                    scratch.heap.push(Reverse((OrderedFloat(new_cost), v)));
                }
            }
        }
    }
}
