use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use petgraph::{
    stable_graph::NodeIndex,
    visit::{EdgeRef, NodeIndexable},
};
use serde::{Deserialize, Serialize};

use crate::{
    AIR_EDGE_TYPE, DEFAULT_EDGE_TYPE, EdgeType, Error, NodeId,
    model::{Link, TowerGraph},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: NodeId,
    pub target: NodeId,
    /// Meters, penalized for air edges
    pub weight: f64,
    /// Infrastructure category, `-1` for air edges
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

/// Final navigation graph handed to path planners
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl ExtractedGraph {
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter()
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Edge between `a` and `b` in either direction
    pub fn edge(&self, a: NodeId, b: NodeId) -> Option<&GraphEdge> {
        self.edges.iter().find(|edge| {
            (edge.source == a && edge.target == b) || (edge.source == b && edge.target == a)
        })
    }

    pub fn synthetic_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(|node| node.id < 0)
    }
}

/// Relabels the pruned graph and attaches an infrastructure type to every
/// edge.
///
/// # Errors
///
/// Returns [`Error::MalformedTopology`] when an edge between two synthetic
/// nodes has no real node reachable over physical edges.
pub fn finalize(
    graph: &TowerGraph,
    types: Option<&HashMap<NodeId, EdgeType>>,
) -> Result<ExtractedGraph, Error> {
    let nodes = graph
        .towers()
        .map(|tower| GraphNode {
            id: tower.id,
            lat: tower.lat(),
            lon: tower.lon(),
        })
        .collect();

    let g = &graph.graph;
    let mut edges = Vec::with_capacity(graph.edge_count());
    for edge in g.edge_indices() {
        let Some((source, target)) = g.edge_endpoints(edge) else {
            continue;
        };
        let link = &g[edge];
        edges.push(GraphEdge {
            source: g[source].id,
            target: g[target].id,
            weight: link.weight,
            edge_type: edge_type(graph, source, target, link, types)?,
        });
    }

    Ok(ExtractedGraph { nodes, edges })
}

fn edge_type(
    graph: &TowerGraph,
    source: NodeIndex,
    target: NodeIndex,
    link: &Link,
    types: Option<&HashMap<NodeId, EdgeType>>,
) -> Result<EdgeType, Error> {
    if link.is_air {
        return Ok(AIR_EDGE_TYPE);
    }
    let g = &graph.graph;
    let type_of = |id: NodeId| {
        types
            .and_then(|types| types.get(&id).copied())
            .unwrap_or(DEFAULT_EDGE_TYPE)
    };

    if let Some(real) = [source, target].into_iter().find(|&n| !g[n].is_synthetic()) {
        return Ok(type_of(g[real].id));
    }

    let real = nearest_real_node(graph, source).ok_or_else(|| {
        Error::MalformedTopology(format!(
            "No real node reachable from synthetic edge ({}, {})",
            g[source].id, g[target].id
        ))
    })?;
    Ok(type_of(real))
}

/// First real node found by a depth-first walk over physical edges
fn nearest_real_node(graph: &TowerGraph, start: NodeIndex) -> Option<NodeId> {
    let g = &graph.graph;
    let mut visited = FixedBitSet::with_capacity(g.node_bound());
    let mut stack = vec![start];

    while let Some(node) = stack.pop() {
        if visited.put(node.index()) {
            continue;
        }
        if !g[node].is_synthetic() {
            return Some(g[node].id);
        }
        for edge in g.edges(node) {
            if edge.weight().is_air {
                continue;
            }
            let next = if edge.source() == node {
                edge.target()
            } else {
                edge.source()
            };
            if !visited.contains(next.index()) {
                stack.push(next);
            }
        }
    }
    None
}
