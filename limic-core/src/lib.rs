//! Extraction of pruned navigation graphs over linear infrastructure.
//!
//! Power lines (or any other linear infrastructure) are turned into a
//! weighted graph that a flight planner can follow: towers connected along
//! their lines, penalized free-flight detours between nearby towers,
//! synthetic nodes at line crossings, and no node inside a restricted area.
//! Redundant edges are pruned without changing any shortest path.

pub mod error;
pub mod extraction;
pub mod geometry;
pub mod loading;
pub mod model;
pub mod output;
pub mod prelude;
pub mod pruning;
pub mod spatial;

pub use error::Error;
pub use extraction::{ExtractConfig, Extraction, ExtractionReport, extract_graph};
pub use model::{RawTopology, Topology, Tower, TowerGraph};
pub use output::ExtractedGraph;

/// Identifier of a graph node. Real towers are non-negative, synthetic
/// crossing nodes are negative.
pub type NodeId = i64;

/// Infrastructure category attached to edges after finalization.
pub type EdgeType = i64;

/// Edge type of free-flight (air) edges.
pub const AIR_EDGE_TYPE: EdgeType = -1;

/// Edge type used when no node type table is available.
pub const DEFAULT_EDGE_TYPE: EdgeType = 0;
