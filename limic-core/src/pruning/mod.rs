//! Removal of redundant edges.
//!
//! An edge is redundant when another path between its endpoints is
//! strictly shorter. Removing such edges never changes a shortest-path
//! distance. The cheap local pass only looks at triangles and shrinks the
//! graph before the exact pass runs a bounded Dijkstra search per edge.

pub mod dijkstra;

use fixedbitset::FixedBitSet;
use log::info;
use petgraph::{
    stable_graph::{EdgeIndex, NodeIndex},
    visit::{EdgeIndexable, EdgeRef},
};
use rayon::prelude::*;

pub use dijkstra::shortest_path_length;

use crate::model::TowerGraph;

/// Number of edges removed by each pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    pub incomplete: usize,
    pub complete: usize,
}

/// Runs the local pass followed by the exact pass
pub fn prune(graph: &mut TowerGraph) -> PruneStats {
    let incomplete = prune_incomplete(graph);
    info!(
        "Pruned {incomplete} edges dominated by a triangle, {} left",
        graph.edge_count()
    );
    let complete = prune_complete(graph);
    info!(
        "Pruned {complete} edges with a shorter detour, {} left",
        graph.edge_count()
    );
    PruneStats {
        incomplete,
        complete,
    }
}

/// Removes every edge `(k, l)` that is longer than a two-hop detour over a
/// common neighbour `m`.
///
/// Decisions are made on the graph as it was before the pass.
pub fn prune_incomplete(graph: &mut TowerGraph) -> usize {
    let g = &graph.graph;
    let mut marked = FixedBitSet::with_capacity(g.edge_bound());

    for k in g.node_indices() {
        for kl in g.edges(k) {
            let l = opposite(kl.source(), kl.target(), k);
            if g[k].id >= g[l].id {
                continue;
            }
            let weight = kl.weight().weight;

            let dominated = g.edges(l).any(|lm| {
                let m = opposite(lm.source(), lm.target(), l);
                m != k
                    && g.find_edge(k, m)
                        .is_some_and(|km| weight > g[km].weight + lm.weight().weight)
            });
            if dominated {
                marked.insert(kl.id().index());
            }
        }
    }

    remove_edges(graph, marked.ones().map(EdgeIndex::new).collect())
}

/// Removes every edge `(k, l)` whose weight is strictly larger than the
/// shortest path between `k` and `l`. Exact ties are kept.
///
/// Searches run in parallel on the unmodified graph, edges are removed once
/// all of them completed.
pub fn prune_complete(graph: &mut TowerGraph) -> usize {
    let edges: Vec<EdgeIndex> = graph.graph.edge_indices().collect();

    let redundant: Vec<EdgeIndex> = {
        let shared: &TowerGraph = graph;
        edges
            .into_par_iter()
            .filter(|&edge| has_shorter_detour(shared, edge))
            .collect()
    };

    remove_edges(graph, redundant)
}

fn has_shorter_detour(graph: &TowerGraph, edge: EdgeIndex) -> bool {
    let g = &graph.graph;
    let Some((a, b)) = g.edge_endpoints(edge) else {
        return false;
    };
    let (k, l) = if g[a].id < g[b].id { (a, b) } else { (b, a) };
    let weight = g[edge].weight;

    shortest_path_length(graph, k, l, Some(weight)).is_some_and(|shortest| weight > shortest)
}

fn remove_edges(graph: &mut TowerGraph, edges: Vec<EdgeIndex>) -> usize {
    let mut removed = 0;
    for edge in edges {
        if graph.graph.remove_edge(edge).is_some() {
            removed += 1;
        }
    }
    removed
}

fn opposite(source: NodeIndex, target: NodeIndex, node: NodeIndex) -> NodeIndex {
    if source == node { target } else { source }
}
