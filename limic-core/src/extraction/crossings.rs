//! Synthetic nodes at crossings of infrastructure segments

use geo::Point;
use hashbrown::HashMap;
use rstar::{RTree, primitives::GeomWithData};

use crate::{
    NodeId,
    model::{CoordKey, IdAllocator, Segment, Tower, tower::coord_key},
    spatial::{Geocentric, Projection},
};

/// Registry of synthetic crossing nodes for one extraction run.
///
/// A crossing found again at the same coordinate, or within
/// `merge_distance` meters of a known crossing, resolves to the known node.
/// The first discovery determines the node's origin segment.
pub struct CrossingRegistry {
    ids: IdAllocator,
    by_coord: HashMap<CoordKey, NodeId>,
    towers: HashMap<NodeId, Tower>,
    nearby: RTree<GeomWithData<[f64; 3], NodeId>>,
    projection: Geocentric,
    merge_distance: f64,
}

impl CrossingRegistry {
    pub fn new(projection: Geocentric, merge_distance: f64) -> Self {
        Self {
            ids: IdAllocator::new(),
            by_coord: HashMap::new(),
            towers: HashMap::new(),
            nearby: RTree::new(),
            projection,
            merge_distance,
        }
    }

    /// Node for a crossing at `point` on `segment`, allocated on first sight
    pub fn resolve(&mut self, point: Point<f64>, segment: Segment) -> Tower {
        let key = coord_key(point);
        if let Some(id) = self.by_coord.get(&key) {
            return self.towers[id];
        }

        let projected = self.projection.project(point);
        let chord = self.projection.chord(self.merge_distance);
        if self.merge_distance > 0.0
            && let Some(entry) = self
                .nearby
                .nearest_neighbor_iter_with_distance_2(&projected)
                .next()
                .filter(|(_, d2)| *d2 <= chord * chord)
                .map(|(entry, _)| entry)
        {
            let tower = self.towers[&entry.data];
            self.by_coord.insert(key, tower.id);
            return tower;
        }

        let tower = Tower::synthetic(self.ids.next_id(), point, segment);
        self.by_coord.insert(key, tower.id);
        self.towers.insert(tower.id, tower);
        self.nearby.insert(GeomWithData::new(projected, tower.id));
        tower
    }

    pub fn get(&self, id: NodeId) -> Option<&Tower> {
        self.towers.get(&id)
    }

    pub fn len(&self) -> usize {
        self.towers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.towers.is_empty()
    }
}
