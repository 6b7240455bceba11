//! Candidate edges of a single node

use itertools::Itertools;
use log::trace;

use super::{config::ExtractConfig, crossings::CrossingRegistry, safety::SafetyEvaluator};
use crate::{
    NodeId,
    geometry::{distance, segment_intersection},
    model::{Segment, Topology, Tower},
    spatial::{Geocentric, SpatialIndex},
};

/// Candidate edge from the node being expanded to `tower`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub tower: Tower,
    pub weight: f64,
    pub is_air: bool,
    /// Infrastructure segment a crossing was discovered on
    pub segment: Option<Segment>,
}

impl Candidate {
    fn physical(tower: Tower, weight: f64) -> Self {
        Self {
            tower,
            weight,
            is_air: false,
            segment: None,
        }
    }

    fn air(tower: Tower, weight: f64) -> Self {
        Self {
            tower,
            weight,
            is_air: true,
            segment: None,
        }
    }

    fn crossing(tower: Tower, weight: f64, segment: Segment) -> Self {
        Self {
            tower,
            weight,
            is_air: false,
            segment: Some(segment),
        }
    }
}

/// Finds direct, free-flight and crossing neighbours of nodes.
///
/// Owns the per-run mutable state: the crossing registry and the safety
/// cache.
pub struct NeighbourFinder<'a> {
    topology: &'a Topology,
    towers: SpatialIndex<NodeId>,
    safety: SafetyEvaluator<'a>,
    crossings: CrossingRegistry,
    around: f64,
    eps: f64,
    penalty: f64,
}

impl<'a> NeighbourFinder<'a> {
    pub fn new(topology: &'a Topology, projection: Geocentric, config: &ExtractConfig) -> Self {
        let towers = SpatialIndex::new(
            topology.towers().iter().map(|t| (t.id, t.geometry)),
            projection,
        );

        Self {
            topology,
            towers,
            safety: SafetyEvaluator::new(topology, projection, config.safe_distance),
            crossings: CrossingRegistry::new(projection, config.merge_distance),
            around: config.around,
            eps: config.eps,
            penalty: config.penalty,
        }
    }

    pub fn safety(&self) -> &SafetyEvaluator<'a> {
        &self.safety
    }

    pub fn safety_mut(&mut self) -> &mut SafetyEvaluator<'a> {
        &mut self.safety
    }

    pub fn crossings(&self) -> &CrossingRegistry {
        &self.crossings
    }

    /// Topological neighbours of a node.
    ///
    /// A synthetic node is connected to the ends of its origin segment, a
    /// real node to its predecessor and successor in every line.
    pub fn direct_neighbours(&self, tower: &Tower) -> Vec<Tower> {
        if let Some((a, b)) = tower.origin_segment {
            return [a, b]
                .iter()
                .filter_map(|id| self.topology.node(*id))
                .copied()
                .collect();
        }

        let mut ids = Vec::new();
        for &line_id in self.topology.lines_of(tower.id) {
            let line = self.topology.line(line_id);
            for (idx, _) in line.iter().enumerate().filter(|(_, id)| **id == tower.id) {
                if idx > 0 {
                    ids.push(line[idx - 1]);
                }
                if let Some(&next) = line.get(idx + 1) {
                    ids.push(next);
                }
            }
        }

        ids.into_iter()
            .filter(|id| *id != tower.id)
            .unique()
            .filter_map(|id| self.topology.node(id))
            .copied()
            .collect()
    }

    /// All safe candidate edges of `tower`
    pub fn find_all_neighbours(&mut self, tower: &Tower) -> Vec<Candidate> {
        let direct = self.direct_neighbours(tower);
        let mut candidates: Vec<Candidate> = direct
            .iter()
            .map(|n| Candidate::physical(*n, distance(tower.geometry, n.geometry)))
            .collect();

        let neighbourhood = self.towers.query_radius(tower.geometry, self.around);
        for &id in &neighbourhood {
            if id == tower.id || direct.iter().any(|n| n.id == id) {
                continue;
            }
            if let Some(other) = self.topology.node(id) {
                let weight = distance(tower.geometry, other.geometry) * self.penalty;
                candidates.push(Candidate::air(*other, weight));
            }
        }

        candidates.extend(self.find_crossings(tower, &direct, &neighbourhood));

        candidates.retain(|candidate| {
            let safe = self.safety.is_safe(&candidate.tower);
            if !safe {
                trace!(
                    "Skipping unsafe neighbour {} of {}",
                    candidate.tower.id, tower.id
                );
            }
            safe
        });
        candidates
    }

    /// Crossings of the segments incident to `tower` with every segment of
    /// the lines passing through the neighbourhood
    fn find_crossings(
        &mut self,
        tower: &Tower,
        direct: &[Tower],
        neighbourhood: &[NodeId],
    ) -> Vec<Candidate> {
        let topology = self.topology;
        let lines = neighbourhood
            .iter()
            .flat_map(|id| topology.lines_of(*id))
            .copied()
            .unique()
            .sorted_unstable();

        let mut found = Vec::new();
        for line_id in lines {
            let segments = topology.line(line_id).iter().copied().tuple_windows();
            for (a, b) in segments {
                let (Some(start), Some(end)) = (topology.node(a), topology.node(b))
                else {
                    continue;
                };
                for neighbour in direct {
                    let Some(point) = segment_intersection(
                        neighbour.geometry,
                        tower.geometry,
                        start.geometry,
                        end.geometry,
                        self.eps,
                    ) else {
                        continue;
                    };
                    let crossing = self.crossings.resolve(point, (a, b));
                    trace!(
                        "Crossing {} of ({}, {}) with ({a}, {b})",
                        crossing.id, neighbour.id, tower.id
                    );
                    let weight = distance(tower.geometry, crossing.geometry);
                    found.push(Candidate::crossing(crossing, weight, (a, b)));
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawTopology;
    use approx::assert_relative_eq;
    use geo::Point;

    fn finder<'a>(topology: &'a Topology, config: &ExtractConfig) -> NeighbourFinder<'a> {
        NeighbourFinder::new(topology, Geocentric, config)
    }

    // Two lines crossing in an X, arms of about 1.3 km
    fn x_shape() -> Topology {
        let raw = RawTopology::new()
            .with_node(1, 52.0, 5.0)
            .with_node(2, 52.02, 5.02)
            .with_node(3, 52.0, 5.02)
            .with_node(4, 52.02, 5.0)
            .with_line(vec![1, 2])
            .with_line(vec![3, 4]);
        Topology::from_raw(raw).unwrap()
    }

    #[test]
    fn test_direct_neighbours() {
        let raw = RawTopology::new()
            .with_node(1, 52.0, 5.0)
            .with_node(2, 52.0, 5.001)
            .with_node(3, 52.0, 5.002)
            .with_node(4, 52.001, 5.001)
            .with_line(vec![1, 2, 3])
            .with_line(vec![4, 2]);
        let topology = Topology::from_raw(raw).unwrap();
        let finder = finder(&topology, &ExtractConfig::default());

        let mut ids: Vec<_> = finder
            .direct_neighbours(topology.node(2).unwrap())
            .iter()
            .map(|t| t.id)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 3, 4]);

        let ends: Vec<_> = finder
            .direct_neighbours(topology.node(1).unwrap())
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ends, vec![2]);
    }

    #[test]
    fn test_closed_ring_neighbours() {
        let raw = RawTopology::new()
            .with_node(1, 52.0, 5.0)
            .with_node(2, 52.0, 5.001)
            .with_node(3, 52.001, 5.0)
            .with_line(vec![1, 2, 3, 1]);
        let topology = Topology::from_raw(raw).unwrap();
        let finder = finder(&topology, &ExtractConfig::default());

        let mut ids: Vec<_> = finder
            .direct_neighbours(topology.node(1).unwrap())
            .iter()
            .map(|t| t.id)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_synthetic_direct_neighbours() {
        let topology = x_shape();
        let finder = finder(&topology, &ExtractConfig::default());
        let crossing = Tower::synthetic(-1, Point::new(5.01, 52.01), (3, 4));

        let ids: Vec<_> = finder
            .direct_neighbours(&crossing)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn test_direct_and_air_candidates() {
        let raw = RawTopology::new()
            .with_node(1, 52.0, 5.0)
            .with_node(2, 52.0, 5.001)
            .with_node(3, 52.0, 5.002)
            .with_line(vec![1, 2, 3]);
        let topology = Topology::from_raw(raw).unwrap();
        let config = ExtractConfig::default();
        let mut finder = finder(&topology, &config);
        let a = *topology.node(1).unwrap();
        let c = *topology.node(3).unwrap();

        let candidates = finder.find_all_neighbours(&a);
        assert_eq!(candidates.len(), 2);

        let direct = candidates.iter().find(|c| c.tower.id == 2).unwrap();
        assert!(!direct.is_air);
        let air = candidates.iter().find(|c| c.tower.id == 3).unwrap();
        assert!(air.is_air);
        assert_relative_eq!(air.weight, distance(a.geometry, c.geometry) * 20.0);
    }

    #[test]
    fn test_around_limits_air_candidates() {
        let raw = RawTopology::new()
            .with_node(1, 52.0, 5.0)
            .with_node(2, 52.0, 5.001)
            .with_node(3, 52.0, 5.1)
            .with_line(vec![1, 2])
            .with_line(vec![3]);
        let topology = Topology::from_raw(raw).unwrap();
        let mut finder = finder(&topology, &ExtractConfig::default());

        let candidates = finder.find_all_neighbours(topology.node(1).unwrap());
        let ids: Vec<_> = candidates.iter().map(|c| c.tower.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_x_crossing_is_synthesized_once() {
        let topology = x_shape();
        let config = ExtractConfig {
            around: 5000.0,
            ..Default::default()
        };
        let mut finder = finder(&topology, &config);

        let mut crossing_ids = Vec::new();
        for tower in topology.towers() {
            let candidates = finder.find_all_neighbours(tower);
            let crossings: Vec<_> = candidates.iter().filter(|c| c.tower.is_synthetic()).collect();
            assert_eq!(crossings.len(), 1, "tower {}", tower.id);
            assert!(!crossings[0].is_air);
            crossing_ids.push(crossings[0].tower.id);
        }

        assert!(crossing_ids.iter().all(|id| *id == -1));
        assert_eq!(finder.crossings().len(), 1);

        let crossing = finder.crossings().get(-1).unwrap();
        assert_relative_eq!(crossing.lat(), 52.01, epsilon = 1e-9);
        assert_relative_eq!(crossing.lon(), 5.01, epsilon = 1e-9);
        assert!(matches!(crossing.origin_segment, Some((3, 4)) | Some((1, 2))));
    }

    #[test]
    fn test_unsafe_candidates_are_dropped() {
        let raw = RawTopology::new()
            .with_node(1, 52.0, 5.0)
            .with_node(2, 52.0, 5.001)
            .with_node(10, 51.9995, 5.0002)
            .with_node(11, 51.9995, 5.0018)
            .with_node(12, 52.0006, 5.001)
            .with_line(vec![1, 2])
            .with_polygon(vec![10, 11, 12]);
        let topology = Topology::from_raw(raw).unwrap();
        let mut finder = finder(&topology, &ExtractConfig::default());

        assert!(finder.find_all_neighbours(topology.node(1).unwrap()).is_empty());
        assert!(finder.safety().cached() > 0);
    }
}
