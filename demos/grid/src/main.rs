//! grid: end-to-end walk through fmm-network on a synthetic street grid.
//!
//! Builds a geographic grid network, indexes it, precomputes the UBODT in
//! parallel, runs a few candidate queries, then round-trips the network and
//! table through files in a scratch directory.
//!
//! Set `RUST_LOG=info` (or `debug`) to see library progress messages.

mod network;

use std::time::Instant;

use anyhow::{Context, Result, bail};
use log::info;

use fmm_core::{Bbox, Point3, RoadId};
use fmm_network::Network;

use network::{SIDE, build_grid};

// ── Constants ─────────────────────────────────────────────────────────────────

/// UBODT search bound in metres (about eight blocks).
const UBODT_THRESH_M: f64 = 800.0;
/// Candidate search radius and count for the sample queries.
const SEARCH_RADIUS_M: f64 = 60.0;
const CANDIDATES: usize = 4;

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== grid | fmm-network demo ===");
    println!("Grid: {SIDE} × {SIDE} intersections  |  UBODT bound: {UBODT_THRESH_M} m");
    println!();

    // 1. Build the network.
    let t0 = Instant::now();
    let mut net = build_grid().context("building grid network")?;
    println!(
        "Network: {} roads, {} links ({:.1?})",
        net.road_count(),
        net.link_count(),
        t0.elapsed()
    );

    // 2. Spatial index.
    let t0 = Instant::now();
    net.build();
    println!("Spatial index built ({:.1?})", t0.elapsed());

    // 3. UBODT.
    let t0 = Instant::now();
    let rows = net.build_ubodt(Some(UBODT_THRESH_M))?;
    println!("UBODT: {rows} rows ({:.1?})", t0.elapsed());

    // 4. Sample queries.
    println!();
    let probes = [
        Point3::new(-88.0695, 30.6803, 0.0),
        Point3::new(-88.0610, 30.6870, 0.0),
        Point3::new(-88.0560, 30.6920, 0.0),
    ];
    for probe in probes {
        let hits = net.query(probe, SEARCH_RADIUS_M, Some(CANDIDATES), None)?;
        println!("Query {probe}: {} candidates", hits.len());
        for hit in &hits {
            println!(
                "  road {:>5}  dist {:>6.1} m  offset {:>6.1} m",
                hit.road_id, hit.distance, hit.offset
            );
        }
    }

    let bbox = Bbox::new(-88.0700, 30.6800, -88.0675, 30.6825);
    println!("Roads in {bbox}: {}", net.query_bbox(&bbox)?.len());

    // 5. Shortest path between two nearby roads, expanded through the table.
    let (source, target) = (RoadId(1), RoadId(9));
    match net.ubodt().path(source, target) {
        Some(path) => {
            let cost = net.lookup(source, target).map_or(0.0, |r| r.cost);
            let ids: Vec<String> = path.iter().map(|id| id.to_string()).collect();
            println!("Path {source} → {target}: [{}], {cost:.1} m", ids.join(", "));
        }
        None => println!("Path {source} → {target}: beyond {UBODT_THRESH_M} m"),
    }

    // 6. Persistence round trip.
    println!();
    let dir = tempfile::tempdir()?;
    let net_path = dir.path().join("grid.json");
    let csv_path = dir.path().join("ubodt.csv");
    let bin_path = dir.path().join("ubodt.bin");

    net.dump(&net_path, true)?;
    let csv_rows = net.dump_ubodt(&csv_path, None)?;
    let bin_rows = net.dump_ubodt(&bin_path, None)?;
    info!("wrote {csv_rows} CSV rows and {bin_rows} binary rows");

    let mut reloaded = Network::load(&net_path)?;
    let t0 = Instant::now();
    let loaded = reloaded.load_ubodt_file(&bin_path)?;
    println!(
        "Reloaded: {} roads, {} links, {loaded} UBODT rows from binary ({:.1?})",
        reloaded.road_count(),
        reloaded.link_count(),
        t0.elapsed()
    );
    if reloaded.ubodt().sorted(None) != net.ubodt().sorted(None) {
        bail!("reloaded UBODT differs from the original");
    }

    let t0 = Instant::now();
    reloaded.load_ubodt_file(&csv_path)?;
    println!("Reloaded {csv_rows} UBODT rows from CSV ({:.1?})", t0.elapsed());

    let flat = net.to_2d();
    println!("2-D copy: {} roads, index built: {}", flat.road_count(), flat.is_built());

    Ok(())
}
