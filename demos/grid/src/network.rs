//! Synthetic street grid used by the demo.
//!
//! `SIDE × SIDE` intersections on a regular lon/lat lattice, every block
//! edge carried by two one-way roads.  At each intersection a road links to
//! every outgoing road except its own reverse (no U-turns).

use fmm_core::{Point3, RoadId};
use fmm_network::{Network, NetworkResult};

/// Intersections per side.
pub const SIDE: usize = 20;

/// Lattice spacing in degrees (~100 m of latitude).
const STEP_DEG: f64 = 0.0009;

const ORIGIN_LON: f64 = -88.070;
const ORIGIN_LAT: f64 = 30.680;

fn intersection(i: usize, j: usize) -> Point3 {
    Point3::new(ORIGIN_LON + i as f64 * STEP_DEG, ORIGIN_LAT + j as f64 * STEP_DEG, 0.0)
}

/// Build the grid network.  Road ids count up from 1 in creation order.
pub fn build_grid() -> NetworkResult<Network> {
    let mut net = Network::new(true);
    let node = |i: usize, j: usize| j * SIDE + i;

    // (from, to, id) for every directed block edge.
    let mut edges: Vec<(usize, usize, RoadId)> = Vec::new();
    let mut next_id = 1i64;
    for j in 0..SIDE {
        for i in 0..SIDE {
            let mut neighbours = Vec::with_capacity(2);
            if i + 1 < SIDE {
                neighbours.push((i + 1, j));
            }
            if j + 1 < SIDE {
                neighbours.push((i, j + 1));
            }
            for (ni, nj) in neighbours {
                let (a, b) = (intersection(i, j), intersection(ni, nj));
                // A slight bend in the middle gives every road two segments.
                let mid = a.lerp(b, 0.5) + Point3::new(STEP_DEG * 0.05, STEP_DEG * 0.05, 0.0);
                for (from, to, geometry) in [
                    (node(i, j), node(ni, nj), vec![a, mid, b]),
                    (node(ni, nj), node(i, j), vec![b, mid, a]),
                ] {
                    let id = RoadId(next_id);
                    next_id += 1;
                    net.add_road(geometry, id)?;
                    edges.push((from, to, id));
                }
            }
        }
    }

    let mut outgoing: Vec<Vec<(usize, RoadId)>> = vec![Vec::new(); SIDE * SIDE];
    for &(from, to, id) in &edges {
        outgoing[from].push((to, id));
    }
    for &(from, to, id) in &edges {
        for &(after, next) in &outgoing[to] {
            if after != from {
                net.add_link(id, next)?;
            }
        }
    }
    Ok(net)
}
