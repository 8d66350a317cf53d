//! Segment R-tree for projecting positions onto nearby roads.
//!
//! Every polyline segment of every road is one entry in an `rstar` R-tree
//! keyed on its 2-D (`x`, `y`) bounding box.  Queries use the tree only as a
//! prefilter; the exact answer comes from projecting onto each candidate
//! segment in a local metric frame.  Since a 3-D distance is never shorter
//! than its horizontal component, the 2-D prefilter cannot drop a true hit.
//!
//! The index is a snapshot: it copies the geometry it needs and holds no
//! reference back to the [`RoadStore`], so it stays valid (though stale) if
//! the store changes.  Staleness tracking lives in [`Network`].
//!
//! [`Network`]: crate::Network

use rstar::{RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use fmm_core::{Bbox, MetricScale, Point3, RoadId, SegmentProjection};

use crate::road::RoadStore;

// ── ProjectedPoint ────────────────────────────────────────────────────────────

/// A query position resolved onto one road.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProjectedPoint {
    /// Closest point on the road, in network coordinates.
    pub position: Point3,
    /// Unit tangent of the road at `position` (local metric frame).
    pub direction: Point3,
    /// Metric 3-D distance from the query position.
    pub distance: f64,
    pub road_id: RoadId,
    /// Arc length from the road's start to `position`.
    pub offset: f64,
}

impl Default for ProjectedPoint {
    fn default() -> Self {
        Self {
            position: Point3::default(),
            direction: Point3::new(0.0, 0.0, 1.0),
            distance: 0.0,
            road_id: RoadId(0),
            offset: 0.0,
        }
    }
}

// ── R-tree segment entry ──────────────────────────────────────────────────────

/// Entry stored in the R-tree: one segment plus what is needed to turn a
/// segment projection into a [`ProjectedPoint`] without touching the store.
#[derive(Clone, Debug)]
struct SegmentEntry {
    road: RoadId,
    a: Point3,
    b: Point3,
    /// Arc length of the road at `a` and at `b`.
    start_offset: f64,
    end_offset: f64,
    direction: Point3,
}

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.a.x, self.a.y], [self.b.x, self.b.y])
    }
}

// ── SpatialIndex ──────────────────────────────────────────────────────────────

pub struct SpatialIndex {
    tree: RTree<SegmentEntry>,
    is_wgs84: bool,
    road_count: usize,
}

impl SpatialIndex {
    /// Bulk-load an index over every segment in `roads`.
    ///
    /// Time complexity: O(S log S) for S segments.
    pub fn build(roads: &RoadStore) -> Self {
        let mut entries = Vec::new();
        for road in roads.iter() {
            let cum = road.cumulative_lengths();
            for (i, pair) in road.points().windows(2).enumerate() {
                entries.push(SegmentEntry {
                    road: road.id(),
                    a: pair[0],
                    b: pair[1],
                    start_offset: cum[i],
                    end_offset: cum[i + 1],
                    direction: road.segment_direction(i),
                });
            }
        }
        SpatialIndex {
            tree: RTree::bulk_load(entries),
            is_wgs84: roads.is_wgs84(),
            road_count: roads.len(),
        }
    }

    /// Number of roads covered by this snapshot.
    pub fn road_count(&self) -> usize {
        self.road_count
    }

    pub fn segment_count(&self) -> usize {
        self.tree.size()
    }

    /// Project `position` onto every road within metric `radius`.
    ///
    /// One result per road (its closest admissible segment).  With
    /// `z_max_offset`, projections whose elevation differs from the query
    /// by more than that are skipped before the per-road minimum is taken.
    /// Results are sorted by `(distance, road_id)` and cut to `k` if given.
    pub fn query(
        &self,
        position: Point3,
        radius: f64,
        k: Option<usize>,
        z_max_offset: Option<f64>,
    ) -> Vec<ProjectedPoint> {
        if !(radius >= 0.0) || k == Some(0) {
            return Vec::new();
        }
        let scale = MetricScale::for_mode(self.is_wgs84, position.y);
        let rx = radius / scale.kx;
        let ry = radius / scale.ky;
        let envelope = AABB::from_corners(
            [position.x - rx, position.y - ry],
            [position.x + rx, position.y + ry],
        );

        let mut best: FxHashMap<RoadId, ProjectedPoint> = FxHashMap::default();
        for seg in self.tree.locate_in_envelope_intersecting(&envelope) {
            let proj = SegmentProjection::onto(seg.a, seg.b, position, scale);
            if proj.distance > radius {
                continue;
            }
            if z_max_offset.is_some_and(|dz| (proj.point.z - position.z).abs() > dz) {
                continue;
            }
            let offset = (seg.start_offset + proj.t * (seg.end_offset - seg.start_offset))
                .min(seg.end_offset);
            let candidate = ProjectedPoint {
                position: proj.point,
                direction: seg.direction,
                distance: proj.distance,
                road_id: seg.road,
                offset,
            };
            best.entry(seg.road)
                .and_modify(|cur| {
                    // Lowest distance wins; equal distances keep the earliest offset.
                    if (candidate.distance, candidate.offset) < (cur.distance, cur.offset) {
                        *cur = candidate;
                    }
                })
                .or_insert(candidate);
        }

        let mut hits: Vec<ProjectedPoint> = best.into_values().collect();
        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.road_id.cmp(&b.road_id))
        });
        if let Some(k) = k {
            hits.truncate(k);
        }
        hits
    }

    /// Ids of every road with at least one segment intersecting `bbox`, in
    /// ascending order.
    pub fn query_bbox(&self, bbox: &Bbox) -> Vec<RoadId> {
        let envelope = AABB::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y]);
        let mut hits: Vec<RoadId> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|seg| bbox.intersects_segment(seg.a, seg.b))
            .map(|seg| seg.road)
            .collect();
        hits.sort_unstable();
        hits.dedup();
        hits
    }
}
