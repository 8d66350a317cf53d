//! The [`Network`] aggregate: roads, links, spatial index, and UBODT.
//!
//! # Lifecycle
//!
//! ```text
//! add_road / add_link / remove_*  ──►  build()  ──►  query / query_bbox
//!                 │                                        ▲
//!                 └──── invalidates the index ─────────────┘ (NotBuilt)
//!
//! build_ubodt() / load_ubodt*()  ──►  lookup / ubodt().path
//! ```
//!
//! Every mutation validates first and changes nothing on error.  The
//! spatial index is a derived snapshot: any road or link change drops it
//! until the next `build()`.  The UBODT is not rebuilt implicitly; removing
//! a road purges the rows whose paths use it, other topology edits leave the
//! table as it was until the next `build_ubodt*` call.
//!
//! Mutators take `&mut self` and readers `&self`, so the borrow checker
//! enforces exclusive writes within a thread.  Use
//! [`SharedNetwork`](crate::SharedNetwork) to share one network across
//! threads.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use log::{debug, info};

use fmm_core::{Bbox, Point3, RoadId, RoadIx};

use crate::config::NetworkConfig;
use crate::index::{ProjectedPoint, SpatialIndex};
use crate::persist;
use crate::road::{Road, RoadStore};
use crate::topology::Topology;
use crate::ubodt::{file, store, RoadGraph, UbodtBuilder, UbodtFormat, UbodtRecord, UbodtStore};
use crate::{NetworkError, NetworkResult};

pub struct Network {
    config: NetworkConfig,
    roads: RoadStore,
    topology: Topology,
    index: Option<SpatialIndex>,
    ubodt: UbodtStore,
}

impl Network {
    /// Empty network.  `is_wgs84` selects geographic `(lon, lat, z)`
    /// coordinates; otherwise coordinates are projected metres.
    pub fn new(is_wgs84: bool) -> Self {
        Self::with_config(NetworkConfig::new(is_wgs84))
    }

    pub fn with_config(config: NetworkConfig) -> Self {
        Self {
            roads: RoadStore::new(config.is_wgs84),
            topology: Topology::new(),
            index: None,
            ubodt: UbodtStore::new(),
            config,
        }
    }

    #[inline]
    pub fn is_wgs84(&self) -> bool {
        self.config.is_wgs84
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    // ── Roads & links ─────────────────────────────────────────────────────

    /// Add a road with the given polyline.
    ///
    /// # Errors
    ///
    /// [`NetworkError::DuplicateId`] if `id` exists,
    /// [`NetworkError::InvalidGeometry`] for fewer than two points or a
    /// non-finite coordinate.
    pub fn add_road(&mut self, geometry: Vec<Point3>, id: RoadId) -> NetworkResult<&Road> {
        self.roads.insert(id, geometry)?;
        Self::invalidate(&mut self.index);
        self.roads.get(id)
    }

    /// Add the directed link `source → target`.  Adding an existing link is
    /// a no-op.
    pub fn add_link(&mut self, source: RoadId, target: RoadId) -> NetworkResult<()> {
        self.roads.ensure_all(&[source, target])?;
        if self.topology.insert(source, target) {
            Self::invalidate(&mut self.index);
        }
        Ok(())
    }

    /// Remove a road together with every link touching it and every UBODT
    /// row whose path uses it.
    pub fn remove_road(&mut self, id: RoadId) -> NetworkResult<()> {
        self.roads.remove(id)?;
        let links = self.topology.detach(id);
        let rows = self.ubodt.purge_road(id);
        debug!("removed road {id}: {links} links, {rows} UBODT rows");
        Self::invalidate(&mut self.index);
        Ok(())
    }

    pub fn remove_link(&mut self, source: RoadId, target: RoadId) -> NetworkResult<()> {
        if !self.topology.remove(source, target) {
            return Err(NetworkError::NotFound { source_road: source, target_road: target });
        }
        Self::invalidate(&mut self.index);
        Ok(())
    }

    /// Roads with a link into `id`, ascending.
    pub fn prev_roads(&self, id: RoadId) -> NetworkResult<Vec<RoadId>> {
        self.roads.get(id)?;
        Ok(self.topology.prev(id).collect())
    }

    /// Roads reachable from `id` through one link, ascending.
    pub fn next_roads(&self, id: RoadId) -> NetworkResult<Vec<RoadId>> {
        self.roads.get(id)?;
        Ok(self.topology.next(id).collect())
    }

    pub fn road(&self, id: RoadId) -> NetworkResult<&Road> {
        self.roads.get(id)
    }

    /// All roads, ascending id.
    pub fn roads(&self) -> impl Iterator<Item = &Road> + '_ {
        self.roads.iter()
    }

    /// All links, ascending `(source, target)`.
    pub fn links(&self) -> impl Iterator<Item = (RoadId, RoadId)> + '_ {
        self.topology.links()
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn link_count(&self) -> usize {
        self.topology.len()
    }

    pub fn road_store(&self) -> &RoadStore {
        &self.roads
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    // ── Spatial index ─────────────────────────────────────────────────────

    /// (Re)build the spatial index over the current roads.
    pub fn build(&mut self) {
        let index = SpatialIndex::build(&self.roads);
        info!(
            "spatial index: {} roads, {} segments",
            index.road_count(),
            index.segment_count()
        );
        self.index = Some(index);
    }

    /// `true` if the index reflects the current road set.
    pub fn is_built(&self) -> bool {
        self.index.is_some()
    }

    /// Project `position` onto roads within `radius` metres.  See
    /// [`SpatialIndex::query`] for ordering and filtering rules.
    pub fn query(
        &self,
        position: Point3,
        radius: f64,
        k: Option<usize>,
        z_max_offset: Option<f64>,
    ) -> NetworkResult<Vec<ProjectedPoint>> {
        Ok(self.spatial_index()?.query(position, radius, k, z_max_offset))
    }

    /// Roads whose geometry intersects `bbox`, ascending id.
    pub fn query_bbox(&self, bbox: &Bbox) -> NetworkResult<Vec<RoadId>> {
        Ok(self.spatial_index()?.query_bbox(bbox))
    }

    fn spatial_index(&self) -> NetworkResult<&SpatialIndex> {
        self.index.as_ref().ok_or(NetworkError::NotBuilt)
    }

    fn invalidate(index: &mut Option<SpatialIndex>) {
        if index.take().is_some() {
            debug!("spatial index invalidated");
        }
    }

    // ── UBODT ─────────────────────────────────────────────────────────────

    /// Compute rows without touching the stored table.  `roads = None`
    /// means every road.
    pub fn compute_ubodt(
        &self,
        roads: Option<&[RoadId]>,
        thresh: Option<f64>,
        cancel: Option<&AtomicBool>,
    ) -> NetworkResult<Vec<UbodtRecord>> {
        let graph = RoadGraph::from_parts(&self.roads, &self.topology);
        let mut builder = UbodtBuilder::new(&graph, thresh);
        if let Some(flag) = cancel {
            builder = builder.with_cancel(flag);
        }
        match roads {
            None => builder.build_all(),
            Some(ids) => {
                let mut sources = ids
                    .iter()
                    .map(|&id| graph.ix(id).ok_or(NetworkError::UnknownRoad(id)))
                    .collect::<NetworkResult<Vec<RoadIx>>>()?;
                // Each source is searched once, however often it is listed.
                sources.sort_unstable();
                sources.dedup();
                builder.build_from(&sources)
            }
        }
    }

    /// Precompute from every road and replace the table.  Returns the row
    /// count.
    pub fn build_ubodt(&mut self, thresh: Option<f64>) -> NetworkResult<usize> {
        self.build_ubodt_cancellable(None, thresh, None)
    }

    /// Precompute from `roads` only; rows of other sources are kept.
    pub fn build_ubodt_for(&mut self, roads: &[RoadId], thresh: Option<f64>) -> NetworkResult<usize> {
        self.build_ubodt_cancellable(Some(roads), thresh, None)
    }

    /// Like [`build_ubodt`](Self::build_ubodt) /
    /// [`build_ubodt_for`](Self::build_ubodt_for) with a cooperative
    /// cancellation flag.  On cancellation the table is left untouched.
    pub fn build_ubodt_cancellable(
        &mut self,
        roads: Option<&[RoadId]>,
        thresh: Option<f64>,
        cancel: Option<&AtomicBool>,
    ) -> NetworkResult<usize> {
        let rows = self.compute_ubodt(roads, thresh, cancel)?;
        let count = rows.len();
        match roads {
            None => {
                self.ubodt.replace(rows);
                self.config.ubodt_thresh = thresh;
            }
            Some(ids) => self.ubodt.replace_sources(ids, rows),
        }
        Ok(count)
    }

    pub fn clear_ubodt(&mut self) {
        self.ubodt.clear();
    }

    /// Validate `records` and replace the table with them.
    pub fn load_ubodt(&mut self, records: Vec<UbodtRecord>) -> NetworkResult<()> {
        store::validate(&records, &self.roads)?;
        self.ubodt.replace(records);
        Ok(())
    }

    /// Validate `records` and upsert them into the existing table.
    pub fn merge_ubodt(&mut self, records: Vec<UbodtRecord>) -> NetworkResult<()> {
        store::validate(&records, &self.roads)?;
        self.ubodt.merge(records);
        Ok(())
    }

    /// Load a table file (CSV or binary, detected from its header) and
    /// replace the current table.  On any error the table is unchanged.
    pub fn load_ubodt_file(&mut self, path: &Path) -> NetworkResult<usize> {
        let records = file::read_records(BufReader::new(File::open(path)?))?;
        let count = records.len();
        self.load_ubodt(records)?;
        info!("loaded {count} UBODT rows from {}", path.display());
        Ok(count)
    }

    /// Write the table to `path`, keeping only rows with `cost <= thresh`
    /// if given.  Format follows the extension (`.csv` or binary).
    pub fn dump_ubodt(&self, path: &Path, thresh: Option<f64>) -> NetworkResult<usize> {
        let rows = self.ubodt.sorted(thresh);
        let format = UbodtFormat::from_path(path);
        persist::write_atomic(path, |w| file::write_records(w, &rows, format))?;
        info!("dumped {} UBODT rows to {} ({format:?})", rows.len(), path.display());
        Ok(rows.len())
    }

    /// Matcher entry point: cheapest row for `(source, target)`.
    #[inline]
    pub fn lookup(&self, source: RoadId, target: RoadId) -> Option<&UbodtRecord> {
        self.ubodt.lookup(source, target)
    }

    pub fn ubodt(&self) -> &UbodtStore {
        &self.ubodt
    }

    // ── Persistence ───────────────────────────────────────────────────────

    /// Restore roads, links, and (if present) config from a network dump.
    /// The index is unbuilt and the table empty in the result.
    pub fn load(path: &Path) -> NetworkResult<Network> {
        let network = persist::load_network(path)?;
        info!(
            "loaded network from {}: {} roads, {} links",
            path.display(),
            network.road_count(),
            network.link_count()
        );
        Ok(network)
    }

    pub fn dump(&self, path: &Path, with_config: bool) -> NetworkResult<()> {
        persist::dump_network(self, path, with_config)
    }

    /// Copy of this network with every elevation set to zero.  Road lengths
    /// are recomputed; the copy has no index and an empty table.
    pub fn to_2d(&self) -> Network {
        let mut flat = Network::with_config(self.config.clone());
        for road in self.roads.iter() {
            flat.roads.insert_road(road.flattened());
        }
        for (s, t) in self.topology.links() {
            flat.topology.insert(s, t);
        }
        flat
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new(false)
    }
}
