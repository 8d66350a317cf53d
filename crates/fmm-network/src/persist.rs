//! Network persistence.
//!
//! # Document layout (JSON)
//!
//! ```json
//! {
//!   "roads":  [ { "id": 1, "points": [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]] } ],
//!   "links":  [ { "source": 1, "target": 2 } ],
//!   "config": { "is_wgs84": false, "ubodt_thresh": 3000.0 }
//! }
//! ```
//!
//! Roads are written in ascending id order and links in ascending
//! `(source, target)` order, so dumping the same network twice produces
//! byte-identical files.  `config` is omitted when dumping without it and a
//! missing `config` loads as a projected network with default parameters.
//!
//! All writers go through [`write_atomic`]: output lands in a temporary file
//! beside the destination and is renamed over it only after a successful
//! flush, so a failed dump leaves any existing file untouched.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use fmm_core::{Point3, RoadId};

use crate::config::NetworkConfig;
use crate::network::Network;
use crate::{NetworkError, NetworkResult};

// ── Document records ──────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct RoadRecord {
    id: RoadId,
    points: Vec<Point3>,
}

#[derive(Serialize, Deserialize)]
struct LinkRecord {
    source: RoadId,
    target: RoadId,
}

#[derive(Serialize, Deserialize)]
struct NetworkDocument {
    roads: Vec<RoadRecord>,
    #[serde(default)]
    links: Vec<LinkRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config: Option<NetworkConfig>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Serialize the roads and links of `network` (plus its config if
/// `with_config`) as JSON.
pub fn write_network<W: Write>(network: &Network, writer: W, with_config: bool) -> NetworkResult<()> {
    let doc = NetworkDocument {
        roads: network
            .roads()
            .map(|r| RoadRecord { id: r.id(), points: r.points().to_vec() })
            .collect(),
        links: network
            .links()
            .map(|(source, target)| LinkRecord { source, target })
            .collect(),
        config: with_config.then(|| network.config().clone()),
    };
    serde_json::to_writer(writer, &doc).map_err(json_error)
}

/// Rebuild a network from a JSON document.
///
/// Any violation of the network invariants (duplicate id, bad polyline,
/// link to a missing road) is reported as [`NetworkError::CorruptFile`].
pub fn read_network<R: Read>(reader: R) -> NetworkResult<Network> {
    let doc: NetworkDocument = serde_json::from_reader(reader).map_err(json_error)?;

    let mut network = Network::with_config(doc.config.unwrap_or_default());
    for road in doc.roads {
        let id = road.id;
        network
            .add_road(road.points, id)
            .map_err(|e| NetworkError::CorruptFile(format!("road {id}: {e}")))?;
    }
    for link in doc.links {
        network
            .add_link(link.source, link.target)
            .map_err(|e| NetworkError::CorruptFile(format!("link {}->{}: {e}", link.source, link.target)))?;
    }
    Ok(network)
}

/// Load a network document from `path`.
pub fn load_network(path: &Path) -> NetworkResult<Network> {
    read_network(BufReader::new(File::open(path)?))
}

/// Dump `network` to `path` atomically.
pub fn dump_network(network: &Network, path: &Path, with_config: bool) -> NetworkResult<()> {
    write_atomic(path, |w| write_network(network, w, with_config))
}

/// Write through a temporary file in the destination directory, then rename
/// it over `path`.  On any error the temporary file is removed and `path`
/// is left as it was.
pub(crate) fn write_atomic<F>(path: &Path, write: F) -> NetworkResult<()>
where
    F: FnOnce(&mut dyn Write) -> NetworkResult<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut buf = BufWriter::new(tmp.as_file_mut());
        write(&mut buf)?;
        buf.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| NetworkError::Io(e.error))?;
    Ok(())
}

fn json_error(e: serde_json::Error) -> NetworkError {
    if e.is_io() {
        NetworkError::Io(e.into())
    } else {
        NetworkError::CorruptFile(format!("network document: {e}"))
    }
}
