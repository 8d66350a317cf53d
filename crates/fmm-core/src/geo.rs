//! 3-D coordinates, bounding boxes, and polyline geometry.
//!
//! Coordinates are stored as `f64` in whatever frame the network uses:
//!
//! - **projected** networks: `x`, `y`, `z` are already metric.
//! - **geographic** (WGS-84) networks: `x` = longitude, `y` = latitude in
//!   degrees, `z` = metres.  Distances and lengths are computed by scaling
//!   coordinate deltas with a [`MetricScale`] evaluated at the local
//!   latitude (the "cheap ruler" approximation).  Error is well under 0.1 %
//!   for spans of a few kilometres, which is the regime map matching works in.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use crate::{GeometryError, GeometryResult};

// ── Point3 ────────────────────────────────────────────────────────────────────

/// A 3-D position or vector.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[f64; 3]", into = "[f64; 3]"))]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[inline]
    pub fn dot(self, other: Point3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a zero vector.
    pub fn normalized(self) -> Option<Point3> {
        let n = self.norm();
        (n > 0.0 && n.is_finite()).then(|| Point3::new(self.x / n, self.y / n, self.z / n))
    }

    /// Linear interpolation: `t = 0` gives `self`, `t = 1` gives `other`.
    #[inline]
    pub fn lerp(self, other: Point3, t: f64) -> Point3 {
        self + (other - self) * t
    }

    /// Same point with the elevation component dropped.
    #[inline]
    pub fn flatten(self) -> Point3 {
        Point3::new(self.x, self.y, 0.0)
    }
}

impl Add for Point3 {
    type Output = Point3;
    #[inline]
    fn add(self, rhs: Point3) -> Point3 {
        Point3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Point3;
    #[inline]
    fn sub(self, rhs: Point3) -> Point3 {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point3 {
    type Output = Point3;
    #[inline]
    fn mul(self, rhs: f64) -> Point3 {
        Point3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl From<[f64; 3]> for Point3 {
    #[inline]
    fn from([x, y, z]: [f64; 3]) -> Self {
        Point3::new(x, y, z)
    }
}

impl From<Point3> for [f64; 3] {
    #[inline]
    fn from(p: Point3) -> Self {
        [p.x, p.y, p.z]
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ── MetricScale ───────────────────────────────────────────────────────────────

/// Metres per coordinate unit along each axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MetricScale {
    pub kx: f64,
    pub ky: f64,
    pub kz: f64,
}

impl MetricScale {
    /// Scale for projected networks: coordinates are already metres.
    pub const IDENTITY: MetricScale = MetricScale { kx: 1.0, ky: 1.0, kz: 1.0 };

    /// Metres per degree of longitude/latitude at `lat_deg` (WGS-84
    /// ellipsoid, Chebyshev-series approximation).  `z` stays in metres.
    pub fn at_latitude(lat_deg: f64) -> Self {
        let cos1 = lat_deg.to_radians().cos();
        let cos2 = 2.0 * cos1 * cos1 - 1.0;
        let cos3 = 2.0 * cos1 * cos2 - cos1;
        let cos4 = 2.0 * cos1 * cos3 - cos2;
        let cos5 = 2.0 * cos1 * cos4 - cos3;
        MetricScale {
            kx: 1000.0 * (111.41513 * cos1 - 0.09455 * cos3 + 0.00012 * cos5),
            ky: 1000.0 * (111.13209 - 0.56605 * cos2 + 0.0012 * cos4),
            kz: 1.0,
        }
    }

    /// Pick the scale for the network's coordinate mode.
    #[inline]
    pub fn for_mode(is_wgs84: bool, lat_deg: f64) -> Self {
        if is_wgs84 { Self::at_latitude(lat_deg) } else { Self::IDENTITY }
    }

    /// Scale a coordinate delta into metres.
    #[inline]
    pub fn apply(self, v: Point3) -> Point3 {
        Point3::new(v.x * self.kx, v.y * self.ky, v.z * self.kz)
    }

    /// Metric distance between two positions.
    #[inline]
    pub fn distance(self, a: Point3, b: Point3) -> f64 {
        self.apply(b - a).norm()
    }

    /// Smallest horizontal factor; dividing a metric radius by this gives a
    /// coordinate-space radius that never under-covers.
    #[inline]
    pub fn min_horizontal(self) -> f64 {
        self.kx.min(self.ky)
    }
}

// ── Polylines ─────────────────────────────────────────────────────────────────

/// Check that `points` is a usable road polyline: at least two points, all
/// coordinates finite.
pub fn validate_polyline(points: &[Point3]) -> GeometryResult<()> {
    if points.len() < 2 {
        return Err(GeometryError::TooFewPoints(points.len()));
    }
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(GeometryError::NonFinite { index });
    }
    Ok(())
}

/// Cumulative arc length at each vertex (`result[0] == 0.0`, last entry is
/// the total length).  Geographic segments are scaled at their mid-latitude.
pub fn cumulative_lengths(points: &[Point3], is_wgs84: bool) -> Vec<f64> {
    let mut out = Vec::with_capacity(points.len());
    let mut acc = 0.0;
    out.push(acc);
    for pair in points.windows(2) {
        let scale = MetricScale::for_mode(is_wgs84, 0.5 * (pair[0].y + pair[1].y));
        acc += scale.distance(pair[0], pair[1]);
        out.push(acc);
    }
    out
}

/// Closest point on a segment to a query position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentProjection {
    /// Segment parameter in `[0, 1]`.
    pub t: f64,
    /// Projected position, in the network's coordinate frame.
    pub point: Point3,
    /// Metric 3-D distance from the query position.
    pub distance: f64,
}

impl SegmentProjection {
    /// Project `p` onto segment `a → b`.  The computation happens in a local
    /// metric frame centred on `p` so geographic coordinates are handled by
    /// passing the scale at `p`'s latitude.
    pub fn onto(a: Point3, b: Point3, p: Point3, scale: MetricScale) -> Self {
        let ma = scale.apply(a - p);
        let mb = scale.apply(b - p);
        let d = mb - ma;
        let len2 = d.dot(d);
        let t = if len2 > 0.0 { (-ma.dot(d) / len2).clamp(0.0, 1.0) } else { 0.0 };
        SegmentProjection {
            t,
            point: a.lerp(b, t),
            distance: (ma + d * t).norm(),
        }
    }
}

// ── Bbox ──────────────────────────────────────────────────────────────────────

/// Axis-aligned 2-D box in the network's horizontal coordinate frame.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bbox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bbox {
    /// Build a box from two opposite corners in any order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Bbox {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Tight box around a set of points; `None` if the iterator is empty.
    pub fn from_points<I: IntoIterator<Item = Point3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bb = Bbox::new(first.x, first.y, first.x, first.y);
        for p in iter {
            bb.min_x = bb.min_x.min(p.x);
            bb.min_y = bb.min_y.min(p.y);
            bb.max_x = bb.max_x.max(p.x);
            bb.max_y = bb.max_y.max(p.y);
        }
        Some(bb)
    }

    #[inline]
    pub fn contains(&self, p: Point3) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Exact 2-D segment/box intersection test (Liang–Barsky clipping).
    /// Touching the boundary counts as intersecting.
    pub fn intersects_segment(&self, a: Point3, b: Point3) -> bool {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let mut t0: f64 = 0.0;
        let mut t1: f64 = 1.0;
        let clips = [
            (-dx, a.x - self.min_x),
            (dx, self.max_x - a.x),
            (-dy, a.y - self.min_y),
            (dy, self.max_y - a.y),
        ];
        for (p, q) in clips {
            if p == 0.0 {
                // Parallel to this boundary: reject if entirely outside it.
                if q < 0.0 {
                    return false;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return false;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return false;
                }
                t1 = t1.min(r);
            }
        }
        t0 <= t1
    }
}

impl fmt::Display for Bbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}
