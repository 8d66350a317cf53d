//! Road entities and the [`RoadStore`] that owns them.
//!
//! A road is a directed polyline.  Its cumulative arc-length table is
//! computed once on insertion so offset ↔ position conversions are a binary
//! search plus one interpolation.

use std::collections::BTreeMap;

use fmm_core::geo::{cumulative_lengths, validate_polyline};
use fmm_core::{GeometryResult, MetricScale, Point3, RoadId};

use crate::{NetworkError, NetworkResult};

/// Direction reported for roads whose geometry has zero extent.
const DEGENERATE_DIRECTION: Point3 = Point3::new(0.0, 0.0, 1.0);

// ── Road ──────────────────────────────────────────────────────────────────────

/// One road: id, polyline, and cumulative metric length at every vertex.
#[derive(Clone, Debug)]
pub struct Road {
    id: RoadId,
    points: Vec<Point3>,
    cumlen: Vec<f64>,
    is_wgs84: bool,
}

impl Road {
    /// Validate `points` and precompute arc lengths.
    pub fn new(id: RoadId, points: Vec<Point3>, is_wgs84: bool) -> GeometryResult<Self> {
        validate_polyline(&points)?;
        let cumlen = cumulative_lengths(&points, is_wgs84);
        Ok(Self { id, points, cumlen, is_wgs84 })
    }

    #[inline]
    pub fn id(&self) -> RoadId {
        self.id
    }

    #[inline]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Arc length at each vertex; first entry is `0.0`.
    #[inline]
    pub fn cumulative_lengths(&self) -> &[f64] {
        &self.cumlen
    }

    /// Total length in metres.
    #[inline]
    pub fn length(&self) -> f64 {
        self.cumlen[self.cumlen.len() - 1]
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    /// Unit tangent of segment `i` in the local metric frame.
    ///
    /// Zero-length segments borrow the end-to-end direction of the whole
    /// road; a road with zero extent reports straight up.
    pub fn segment_direction(&self, i: usize) -> Point3 {
        let (a, b) = (self.points[i], self.points[i + 1]);
        let scale = MetricScale::for_mode(self.is_wgs84, 0.5 * (a.y + b.y));
        scale
            .apply(b - a)
            .normalized()
            .or_else(|| {
                let first = self.points[0];
                let last = self.points[self.points.len() - 1];
                MetricScale::for_mode(self.is_wgs84, 0.5 * (first.y + last.y))
                    .apply(last - first)
                    .normalized()
            })
            .unwrap_or(DEGENERATE_DIRECTION)
    }

    /// Position and unit tangent at arc-length `offset` (clamped to
    /// `[0, length]`).
    pub fn along(&self, offset: f64) -> (Point3, Point3) {
        let offset = offset.clamp(0.0, self.length());
        let seg = self
            .cumlen
            .partition_point(|&c| c <= offset)
            .saturating_sub(1)
            .min(self.segment_count() - 1);
        let seg_len = self.cumlen[seg + 1] - self.cumlen[seg];
        let t = if seg_len > 0.0 { (offset - self.cumlen[seg]) / seg_len } else { 0.0 };
        let pos = self.points[seg].lerp(self.points[seg + 1], t);
        (pos, self.segment_direction(seg))
    }

    /// Copy of this road with every elevation set to zero.
    pub(crate) fn flattened(&self) -> Road {
        let points: Vec<Point3> = self.points.iter().map(|p| p.flatten()).collect();
        let cumlen = cumulative_lengths(&points, self.is_wgs84);
        Road { id: self.id, points, cumlen, is_wgs84: self.is_wgs84 }
    }
}

// ── RoadStore ─────────────────────────────────────────────────────────────────

/// Owns every road, keyed and iterated in ascending [`RoadId`] order.
#[derive(Clone, Debug, Default)]
pub struct RoadStore {
    roads: BTreeMap<RoadId, Road>,
    is_wgs84: bool,
}

impl RoadStore {
    pub fn new(is_wgs84: bool) -> Self {
        Self { roads: BTreeMap::new(), is_wgs84 }
    }

    #[inline]
    pub fn is_wgs84(&self) -> bool {
        self.is_wgs84
    }

    /// Add a road.  Duplicate ids are rejected before the geometry is even
    /// looked at.
    pub fn insert(&mut self, id: RoadId, points: Vec<Point3>) -> NetworkResult<&Road> {
        if self.roads.contains_key(&id) {
            return Err(NetworkError::DuplicateId(id));
        }
        let road = Road::new(id, points, self.is_wgs84)?;
        Ok(self.roads.entry(id).or_insert(road))
    }

    /// Insert an already-built road (used when deriving one network from
    /// another, where validation has already happened).
    pub(crate) fn insert_road(&mut self, road: Road) {
        self.roads.insert(road.id(), road);
    }

    pub fn remove(&mut self, id: RoadId) -> NetworkResult<Road> {
        self.roads.remove(&id).ok_or(NetworkError::UnknownRoad(id))
    }

    pub fn get(&self, id: RoadId) -> NetworkResult<&Road> {
        self.roads.get(&id).ok_or(NetworkError::UnknownRoad(id))
    }

    #[inline]
    pub fn contains(&self, id: RoadId) -> bool {
        self.roads.contains_key(&id)
    }

    /// Fail with `UnknownRoad` for the first id that is absent.
    pub fn ensure_all<'a, I>(&self, ids: I) -> NetworkResult<()>
    where
        I: IntoIterator<Item = &'a RoadId>,
    {
        match ids.into_iter().find(|id| !self.contains(**id)) {
            Some(&missing) => Err(NetworkError::UnknownRoad(missing)),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.roads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }

    /// Roads in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Road> + '_ {
        self.roads.values()
    }

    /// Road ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = RoadId> + '_ {
        self.roads.keys().copied()
    }
}
