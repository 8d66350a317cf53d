//! Unit tests for fmm-core primitives.

#[cfg(test)]
mod ids {
    use crate::{RoadId, RoadIx};

    #[test]
    fn index_roundtrip() {
        let ix = RoadIx(42);
        assert_eq!(ix.index(), 42);
        assert_eq!(RoadIx::try_from(42usize).unwrap(), ix);
    }

    #[test]
    fn ordering() {
        assert!(RoadId(-5) < RoadId(1));
        assert!(RoadIx(100) > RoadIx(99));
    }

    #[test]
    fn invalid_index_is_max() {
        assert_eq!(RoadIx::INVALID.0, u32::MAX);
        assert_eq!(RoadIx::default(), RoadIx::INVALID);
    }

    #[test]
    fn display_is_raw_integer() {
        assert_eq!(RoadId(7).to_string(), "7");
        assert_eq!(i64::from(RoadId(-3)), -3);
    }
}

#[cfg(test)]
mod geo {
    use crate::geo::{cumulative_lengths, validate_polyline};
    use crate::{Bbox, GeometryError, MetricScale, Point3, SegmentProjection};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn polyline_needs_two_points() {
        assert_eq!(validate_polyline(&[p(0.0, 0.0, 0.0)]), Err(GeometryError::TooFewPoints(1)));
        assert_eq!(validate_polyline(&[]), Err(GeometryError::TooFewPoints(0)));
        assert!(validate_polyline(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]).is_ok());
    }

    #[test]
    fn polyline_rejects_nan() {
        let pts = [p(0.0, 0.0, 0.0), p(f64::NAN, 0.0, 0.0)];
        assert_eq!(validate_polyline(&pts), Err(GeometryError::NonFinite { index: 1 }));
    }

    #[test]
    fn projected_lengths_are_euclidean() {
        let pts = [p(0.0, 0.0, 0.0), p(3.0, 4.0, 0.0), p(3.0, 4.0, 12.0)];
        assert_eq!(cumulative_lengths(&pts, false), vec![0.0, 5.0, 17.0]);
    }

    #[test]
    fn one_degree_latitude_is_about_111_km() {
        let pts = [p(-88.0, 30.0, 0.0), p(-88.0, 31.0, 0.0)];
        let len = cumulative_lengths(&pts, true)[1];
        assert!((len - 110_860.0).abs() < 500.0, "got {len}");
    }

    #[test]
    fn longitude_shrinks_with_latitude() {
        let equator = MetricScale::at_latitude(0.0);
        let north = MetricScale::at_latitude(60.0);
        assert!(north.kx < equator.kx * 0.51);
        assert!((north.ky - equator.ky).abs() < 2_000.0);
    }

    #[test]
    fn projection_clamps_to_endpoints() {
        let a = p(0.0, 0.0, 0.0);
        let b = p(10.0, 0.0, 0.0);
        let before = SegmentProjection::onto(a, b, p(-3.0, 4.0, 0.0), MetricScale::IDENTITY);
        assert_eq!(before.t, 0.0);
        assert_eq!(before.distance, 5.0);

        let mid = SegmentProjection::onto(a, b, p(4.0, 2.0, 0.0), MetricScale::IDENTITY);
        assert_eq!(mid.t, 0.4);
        assert_eq!(mid.point, p(4.0, 0.0, 0.0));
        assert_eq!(mid.distance, 2.0);
    }

    #[test]
    fn degenerate_segment_projects_to_start() {
        let a = p(1.0, 1.0, 0.0);
        let proj = SegmentProjection::onto(a, a, p(1.0, 2.0, 0.0), MetricScale::IDENTITY);
        assert_eq!(proj.t, 0.0);
        assert_eq!(proj.distance, 1.0);
    }

    #[test]
    fn bbox_segment_clipping() {
        let bb = Bbox::new(0.0, 0.0, 10.0, 10.0);
        // Crosses the box without any vertex inside it.
        assert!(bb.intersects_segment(p(-5.0, 5.0, 0.0), p(15.0, 5.0, 0.0)));
        // Fully inside.
        assert!(bb.intersects_segment(p(1.0, 1.0, 0.0), p(2.0, 2.0, 0.0)));
        // Touches a corner.
        assert!(bb.intersects_segment(p(-1.0, 11.0, 0.0), p(1.0, 9.0, 0.0)));
        // Passes by diagonally outside the corner.
        assert!(!bb.intersects_segment(p(-1.0, 10.5, 0.0), p(0.5, 12.0, 0.0)));
        // Vertical segment left of the box.
        assert!(!bb.intersects_segment(p(-1.0, 0.0, 0.0), p(-1.0, 10.0, 0.0)));
    }

    #[test]
    fn bbox_normalises_corners() {
        let bb = Bbox::new(5.0, 7.0, -1.0, 2.0);
        assert_eq!(bb, Bbox { min_x: -1.0, min_y: 2.0, max_x: 5.0, max_y: 7.0 });
        assert!(bb.contains(p(0.0, 3.0, 100.0)));
    }

    #[test]
    fn normalized_zero_vector_is_none() {
        assert!(Point3::default().normalized().is_none());
        assert_eq!(p(0.0, 3.0, 4.0).normalized(), Some(p(0.0, 0.6, 0.8)));
    }
}
