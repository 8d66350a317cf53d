//! Cross-thread handle with reader/writer discipline.
//!
//! Queries, lookups, and neighbour reads share the lock; mutations, index
//! builds, and UBODT builds take it exclusively and wait for readers to
//! drain.  A reader therefore always sees a network whose index and table
//! are consistent with its roads and links.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use fmm_core::{Point3, RoadId};

use crate::index::ProjectedPoint;
use crate::network::Network;
use crate::ubodt::UbodtRecord;
use crate::NetworkResult;

#[derive(Clone)]
pub struct SharedNetwork {
    inner: Arc<RwLock<Network>>,
}

impl SharedNetwork {
    pub fn new(network: Network) -> Self {
        Self { inner: Arc::new(RwLock::new(network)) }
    }

    /// Shared access.  Blocks while a writer holds the lock.
    ///
    /// A panic in another holder does not leave the network half-mutated
    /// (every mutation validates before it writes), so poisoning is ignored.
    pub fn read(&self) -> RwLockReadGuard<'_, Network> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access.  Blocks until all readers are gone.
    pub fn write(&self) -> RwLockWriteGuard<'_, Network> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn query(
        &self,
        position: Point3,
        radius: f64,
        k: Option<usize>,
        z_max_offset: Option<f64>,
    ) -> NetworkResult<Vec<ProjectedPoint>> {
        self.read().query(position, radius, k, z_max_offset)
    }

    /// Owned copy of the row, since the read guard cannot outlive the call.
    pub fn lookup(&self, source: RoadId, target: RoadId) -> Option<UbodtRecord> {
        self.read().lookup(source, target).copied()
    }

    pub fn build(&self) {
        self.write().build();
    }

    pub fn build_ubodt(&self, thresh: Option<f64>) -> NetworkResult<usize> {
        self.write().build_ubodt(thresh)
    }
}

impl From<Network> for SharedNetwork {
    fn from(network: Network) -> Self {
        Self::new(network)
    }
}
