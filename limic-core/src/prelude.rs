// Re-export key components
pub use crate::extraction::{ExtractConfig, Extraction, ExtractionReport, extract_graph};
pub use crate::loading::{
    FileBackend, QueryBackend, QueryClient, SnapshotBackend, SnapshotCache, TopologySource,
    area_from_file_name,
};
pub use crate::model::{RawLine, RawTopology};
pub use crate::output::{ExtractedGraph, GraphEdge, GraphNode};

pub use crate::Error;

// Core types
pub use crate::AIR_EDGE_TYPE;
pub use crate::EdgeType;
pub use crate::NodeId;
