//! Data model for infrastructure graphs
//!
//! Contains the raw input tables, their indexed form and the mutable graph
//! the extraction works on.

pub mod graph;
pub mod topology;
pub mod tower;

pub use graph::{Link, TowerGraph};
pub use topology::{LineId, PolygonId, RawLine, RawTopology, Topology};
pub use tower::{CoordKey, IdAllocator, Segment, Tower};
