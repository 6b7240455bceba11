//! Finalized graph and its serialized forms

mod graph;
mod to_geojson;

pub use graph::{ExtractedGraph, GraphEdge, GraphNode, finalize};
