//! Construction of the candidate graph

use hashbrown::HashMap;
use log::{debug, info};
use rayon::prelude::*;

use super::{config::ExtractConfig, neighbours::NeighbourFinder};
use crate::{
    geometry::distance,
    model::{Link, Segment, Topology, Tower, TowerGraph},
    spatial::Geocentric,
};

/// Counters of the building stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub towers: usize,
    pub safe_towers: usize,
    pub candidates: usize,
    pub links: usize,
    pub fork_links: usize,
    pub crossings: usize,
}

/// Builds the candidate graph from the safe towers of a topology
pub struct GraphBuilder<'a> {
    topology: &'a Topology,
    finder: NeighbourFinder<'a>,
    /// Crossings discovered per infrastructure segment
    segment_crossings: HashMap<Segment, Vec<Tower>>,
    stats: BuildStats,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(topology: &'a Topology, projection: Geocentric, config: &ExtractConfig) -> Self {
        Self {
            topology,
            finder: NeighbourFinder::new(topology, projection, config),
            segment_crossings: HashMap::new(),
            stats: BuildStats::default(),
        }
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    pub fn finder(&self) -> &NeighbourFinder<'a> {
        &self.finder
    }

    /// Graph holding every safe tower of the topology and no edges
    pub fn safe_towers(&mut self) -> TowerGraph {
        let towers = self.topology.towers();
        let safety = self.finder.safety();
        let verdicts: Vec<bool> = towers
            .par_iter()
            .map(|tower| safety.evaluate(tower.geometry))
            .collect();

        let mut graph = TowerGraph::new();
        for (tower, safe) in towers.iter().zip(verdicts) {
            self.finder.safety_mut().record(tower.geometry, safe);
            if safe {
                graph.add_tower(*tower);
            } else {
                debug!("Tower {} is not safe", tower.id);
            }
        }

        self.stats.towers = towers.len();
        self.stats.safe_towers = graph.node_count();
        info!(
            "{} of {} towers are safe",
            self.stats.safe_towers, self.stats.towers
        );
        graph
    }

    /// Connects every tower currently in `graph` to its candidate neighbours.
    ///
    /// Real neighbours must already be in the graph, synthetic crossings are
    /// added on the fly. The first edge written for a pair wins.
    pub fn build_edges(&mut self, graph: &mut TowerGraph) {
        let working: Vec<Tower> = graph.towers().filter(|t| !t.is_synthetic()).copied().collect();

        for tower in &working {
            for candidate in self.finder.find_all_neighbours(tower) {
                let other = candidate.tower;
                if !other.is_synthetic() && !graph.contains(other.id) {
                    continue;
                }
                self.stats.candidates += 1;

                graph.add_tower(other);
                let link = Link {
                    weight: candidate.weight,
                    is_air: candidate.is_air,
                };
                if graph.add_link(tower.id, other.id, link) {
                    self.stats.links += 1;
                }

                if let Some(segment) = candidate.segment {
                    self.link_forks(graph, other, segment);
                }
            }
        }

        self.stats.crossings = self.finder.crossings().len();
        info!(
            "Built {} edges ({} between crossings) with {} crossings",
            graph.edge_count(),
            self.stats.fork_links,
            self.stats.crossings
        );
    }

    /// Links a crossing to the other crossings found on the same segment.
    ///
    /// The same crossing approximated from two directions ends up as two
    /// nodes on one segment, the physical link keeps them connected.
    fn link_forks(&mut self, graph: &mut TowerGraph, crossing: Tower, segment: Segment) {
        let key = (segment.0.min(segment.1), segment.0.max(segment.1));
        let known = self.segment_crossings.entry(key).or_default();

        for other in known.iter().filter(|other| other.id != crossing.id) {
            let link = Link::physical(distance(other.geometry, crossing.geometry));
            if graph.add_link(other.id, crossing.id, link) {
                debug!(
                    "Linked crossings {} and {} on segment {key:?}",
                    other.id, crossing.id
                );
                self.stats.fork_links += 1;
                self.stats.links += 1;
            }
        }

        if !known.contains(&crossing) {
            known.push(crossing);
        }
    }
}
