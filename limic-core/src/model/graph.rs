//! Mutable navigation graph used during extraction and pruning

use hashbrown::HashMap;
use petgraph::{
    Undirected,
    stable_graph::{EdgeIndex, NodeIndex, StableGraph},
};

use super::tower::Tower;
use crate::NodeId;

/// Graph edge between two towers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    /// Distance in meters, penalized for air edges
    pub weight: f64,
    /// Free-flight detour rather than physical infrastructure
    pub is_air: bool,
}

impl Link {
    pub fn physical(weight: f64) -> Self {
        Self {
            weight,
            is_air: false,
        }
    }

    pub fn air(weight: f64) -> Self {
        Self {
            weight,
            is_air: true,
        }
    }
}

/// Undirected tower graph keyed by node id.
///
/// Indices stay valid while edges are removed, which the pruning passes
/// rely on.
#[derive(Debug, Clone, Default)]
pub struct TowerGraph {
    pub(crate) graph: StableGraph<Tower, Link, Undirected>,
    index: HashMap<NodeId, NodeIndex>,
}

impl TowerGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tower unless a node with the same id exists
    pub fn add_tower(&mut self, tower: Tower) -> NodeIndex {
        if let Some(&idx) = self.index.get(&tower.id) {
            return idx;
        }
        let idx = self.graph.add_node(tower);
        self.index.insert(tower.id, idx);
        idx
    }

    /// Inserts an undirected edge between two existing towers.
    ///
    /// The first edge written for a pair wins. Self loops and edges with
    /// unknown endpoints are ignored. Returns whether an edge was inserted.
    pub fn add_link(&mut self, a: NodeId, b: NodeId, link: Link) -> bool {
        if a == b {
            return false;
        }
        let (Some(&ia), Some(&ib)) = (self.index.get(&a), self.index.get(&b)) else {
            return false;
        };
        if self.graph.find_edge(ia, ib).is_some() {
            return false;
        }
        debug_assert!(link.weight >= 0.0, "negative edge weight {}", link.weight);
        self.graph.add_edge(ia, ib, link);
        true
    }

    pub fn remove_link(&mut self, a: NodeId, b: NodeId) -> Option<Link> {
        let edge = self.find_link(a, b)?;
        self.graph.remove_edge(edge)
    }

    pub fn link(&self, a: NodeId, b: NodeId) -> Option<&Link> {
        self.find_link(a, b)
            .and_then(|edge| self.graph.edge_weight(edge))
    }

    fn find_link(&self, a: NodeId, b: NodeId) -> Option<EdgeIndex> {
        let ia = self.index.get(&a)?;
        let ib = self.index.get(&b)?;
        self.graph.find_edge(*ia, *ib)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn node_index(&self, id: NodeId) -> Option<NodeIndex> {
        self.index.get(&id).copied()
    }

    pub fn tower(&self, id: NodeId) -> Option<&Tower> {
        self.node_index(id)
            .and_then(|idx| self.graph.node_weight(idx))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Towers in insertion order
    pub fn towers(&self) -> impl Iterator<Item = &Tower> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx))
    }

    /// Every edge once, as `(tower, tower, link)`
    pub fn links(&self) -> impl Iterator<Item = (&Tower, &Tower, &Link)> {
        self.graph.edge_indices().filter_map(|edge| {
            let (a, b) = self.graph.edge_endpoints(edge)?;
            Some((&self.graph[a], &self.graph[b], &self.graph[edge]))
        })
    }

    /// Ids of the towers adjacent to `id`
    pub fn neighbours(&self, id: NodeId) -> Vec<NodeId> {
        self.node_index(id)
            .map(|idx| {
                self.graph
                    .neighbors(idx)
                    .map(|n| self.graph[n].id)
                    .collect()
            })
            .unwrap_or_default()
    }
}
