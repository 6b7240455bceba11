//! Acquisition of raw topologies: single files, snapshot caches and
//! query services.

mod backend;
mod snapshot;

pub use backend::{
    FileBackend, QueryBackend, QueryClient, SnapshotBackend, TopologySource, area_from_file_name,
};
pub use snapshot::SnapshotCache;
