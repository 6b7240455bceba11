//! Building the candidate graph: safe towers, neighbours and crossings.

mod builder;
mod config;
mod crossings;
mod neighbours;
mod pipeline;
mod safety;

pub use builder::{BuildStats, GraphBuilder};
pub use config::ExtractConfig;
pub use crossings::CrossingRegistry;
pub use neighbours::{Candidate, NeighbourFinder};
pub use pipeline::{Extraction, ExtractionReport, extract_graph};
pub use safety::SafetyEvaluator;
