//! End-to-end extraction of a navigation graph

use std::time::Instant;

use log::{info, warn};
use serde::Serialize;

use super::{builder::GraphBuilder, config::ExtractConfig};
use crate::{
    Error,
    model::{RawTopology, Topology},
    output::{ExtractedGraph, finalize},
    pruning::prune,
    spatial::Geocentric,
};

/// Counters and data-quality findings of one extraction run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionReport {
    pub towers: usize,
    pub boundary_nodes: usize,
    pub safe_towers: usize,
    pub synthetic_nodes: usize,
    pub built_edges: usize,
    /// Edges left after the triangle pass
    pub edges_after_incomplete: usize,
    /// Edges left after the shortest-path pass
    pub edges_after_complete: usize,
    pub degenerate_polygons: Vec<usize>,
    pub warnings: Vec<String>,
}

/// Result of [`extract_graph`]
#[derive(Debug, Clone)]
pub struct Extraction {
    pub graph: ExtractedGraph,
    pub report: ExtractionReport,
}

/// Extracts the pruned navigation graph of a topology
///
/// # Errors
///
/// Returns an error if the configuration or the topology is invalid, or if
/// synthetic nodes cannot be attributed to any infrastructure.
pub fn extract_graph(raw: RawTopology, config: &ExtractConfig) -> Result<Extraction, Error> {
    config.validate()?;
    let started = Instant::now();

    let topology = Topology::from_raw(raw)?;
    let mut report = ExtractionReport {
        towers: topology.towers().len(),
        boundary_nodes: topology.boundary_nodes().len(),
        degenerate_polygons: topology.degenerate_polygons(),
        ..Default::default()
    };
    for &polygon_id in &report.degenerate_polygons {
        report.warnings.push(format!(
            "Restricted polygon {polygon_id} has fewer than 3 nodes and was ignored"
        ));
    }
    info!(
        "Indexed {} towers and {} boundary nodes",
        report.towers, report.boundary_nodes
    );

    let mut builder = GraphBuilder::new(&topology, Geocentric, config);
    let mut graph = builder.safe_towers();
    builder.build_edges(&mut graph);
    let stats = builder.stats();
    report.safe_towers = stats.safe_towers;
    report.synthetic_nodes = stats.crossings;
    report.built_edges = graph.edge_count();
    info!(
        "Candidate graph has {} nodes and {} edges ({:.2?})",
        graph.node_count(),
        graph.edge_count(),
        started.elapsed()
    );

    let pruned = prune(&mut graph);
    report.edges_after_incomplete = report.built_edges - pruned.incomplete;
    report.edges_after_complete = graph.edge_count();

    let isolated = graph
        .towers()
        .filter(|tower| graph.neighbours(tower.id).is_empty())
        .count();
    if isolated > 0 {
        warn!("{isolated} safe towers have no edges");
        report
            .warnings
            .push(format!("{isolated} safe towers have no edges"));
    }

    let extracted = finalize(&graph, topology.types())?;
    info!(
        "Extracted graph with {} nodes and {} edges in {:.2?}",
        extracted.nodes.len(),
        extracted.edges.len(),
        started.elapsed()
    );

    Ok(Extraction {
        graph: extracted,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_is_rejected_first() {
        // the topology is broken too, the config error must win
        let raw = RawTopology::new().with_line(vec![1, 2]);
        let config = ExtractConfig {
            safe_distance: -1.0,
            ..Default::default()
        };

        assert!(matches!(
            extract_graph(raw, &config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_topology() {
        let extraction = extract_graph(RawTopology::new(), &ExtractConfig::default()).unwrap();

        assert!(extraction.graph.nodes.is_empty());
        assert!(extraction.graph.edges.is_empty());
        assert_eq!(extraction.report, ExtractionReport::default());
    }

    #[test]
    fn test_report_counts() {
        let raw = RawTopology::new()
            .with_node(1, 0.0, 0.0)
            .with_node(2, 0.001, 0.0)
            .with_node(3, 0.002, 0.0)
            .with_node(10, 1.0, 1.0)
            .with_node(11, 1.0, 1.001)
            .with_line(vec![1, 2, 3])
            .with_polygon(vec![10, 11]);

        let extraction = extract_graph(raw, &ExtractConfig::default()).unwrap();
        let report = &extraction.report;
        assert_eq!(report.towers, 3);
        assert_eq!(report.boundary_nodes, 2);
        assert_eq!(report.safe_towers, 3);
        assert_eq!(report.built_edges, 3);
        assert_eq!(report.edges_after_incomplete, 2);
        assert_eq!(report.edges_after_complete, 2);
        assert_eq!(report.degenerate_polygons, vec![0]);
        assert_eq!(report.warnings.len(), 1);
    }
}
