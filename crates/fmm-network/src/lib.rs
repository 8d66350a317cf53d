//! `fmm-network`: road graph, spatial index, and UBODT precomputation.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`network`]  | `Network` aggregate (roads, links, index, table)          |
//! | [`road`]     | `Road`, `RoadStore`                                       |
//! | [`topology`] | `Topology`: directed links between roads                 |
//! | [`index`]    | `SpatialIndex` (segment R-tree), `ProjectedPoint`         |
//! | [`ubodt`]    | `UbodtRecord`, `RoadGraph`, `UbodtBuilder`, `UbodtStore`  |
//! | [`persist`]  | JSON network documents, atomic file writes                |
//! | [`shared`]   | `SharedNetwork`: `Arc<RwLock<Network>>` handle           |
//! | [`config`]   | `NetworkConfig`                                           |
//! | [`error`]    | `NetworkError`, `NetworkResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Runs per-source UBODT searches on the Rayon pool.         |
//!
//! # Example
//!
//! ```
//! use fmm_core::{Point3, RoadId};
//! use fmm_network::Network;
//!
//! let mut net = Network::new(false);
//! net.add_road(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)], RoadId(1)).unwrap();
//! net.add_road(vec![Point3::new(10.0, 0.0, 0.0), Point3::new(20.0, 0.0, 0.0)], RoadId(2)).unwrap();
//! net.add_link(RoadId(1), RoadId(2)).unwrap();
//!
//! net.build();
//! net.build_ubodt(Some(100.0)).unwrap();
//!
//! let row = net.lookup(RoadId(1), RoadId(2)).unwrap();
//! assert_eq!((row.source_next, row.cost), (RoadId(2), 10.0));
//!
//! let hits = net.query(Point3::new(5.0, 0.0, 0.0), 1.0, None, None).unwrap();
//! assert_eq!(hits[0].road_id, RoadId(1));
//! assert_eq!(hits[0].offset, 5.0);
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod network;
pub mod persist;
pub mod road;
pub mod shared;
pub mod topology;
pub mod ubodt;


pub use config::NetworkConfig;
pub use error::{NetworkError, NetworkResult};
pub use index::{ProjectedPoint, SpatialIndex};
pub use network::Network;
pub use road::{Road, RoadStore};
pub use shared::SharedNetwork;
pub use topology::Topology;
pub use ubodt::{UbodtRecord, UbodtStore};
