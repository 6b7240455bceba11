//! Safety of nodes with respect to restricted structures

use geo::{Contains, Point, Polygon};
use hashbrown::HashMap;
use itertools::Itertools;
use log::trace;

use crate::{
    NodeId,
    geometry::polygon_from_vertices,
    model::{CoordKey, Topology, Tower, tower::coord_key},
    spatial::{Geocentric, SpatialIndex},
};

/// Decides whether nodes lie outside every restricted polygon.
///
/// Only polygons with a boundary node within the safe distance are
/// considered. Results are memoised per exact coordinate for the lifetime
/// of the evaluator, which is one extraction run.
pub struct SafetyEvaluator<'a> {
    topology: &'a Topology,
    boundary_index: SpatialIndex<NodeId>,
    /// `None` for degenerate polygons
    polygons: Vec<Option<Polygon<f64>>>,
    safe_distance: f64,
    cache: HashMap<CoordKey, bool>,
}

impl<'a> SafetyEvaluator<'a> {
    pub fn new(topology: &'a Topology, projection: Geocentric, safe_distance: f64) -> Self {
        let boundary_index = SpatialIndex::new(
            topology
                .boundary_nodes()
                .iter()
                .map(|node| (node.id, node.geometry)),
            projection,
        );

        let polygons = topology
            .polygons()
            .iter()
            .map(|polygon| {
                let vertices: Vec<Point<f64>> = polygon
                    .iter()
                    .filter_map(|id| topology.node(*id))
                    .map(|node| node.geometry)
                    .collect();
                polygon_from_vertices(&vertices)
            })
            .collect();

        Self {
            topology,
            boundary_index,
            polygons,
            safe_distance,
            cache: HashMap::new(),
        }
    }

    /// Uncached safety test of a coordinate
    pub fn evaluate(&self, point: Point<f64>) -> bool {
        let nearby = self.boundary_index.query_radius(point, self.safe_distance);
        if nearby.is_empty() {
            return true;
        }

        let candidates = nearby
            .iter()
            .flat_map(|id| self.topology.polygons_of(*id))
            .unique();

        for &polygon_id in candidates {
            match &self.polygons[polygon_id] {
                Some(polygon) if polygon.contains(&point) => {
                    trace!("{point:?} lies inside restricted polygon {polygon_id}");
                    return false;
                }
                Some(_) => {}
                None => trace!("Skipping degenerate polygon {polygon_id}"),
            }
        }
        true
    }

    /// Memoised safety test of a tower
    pub fn is_safe(&mut self, tower: &Tower) -> bool {
        let key = tower.coord_key();
        if let Some(&safe) = self.cache.get(&key) {
            return safe;
        }
        let safe = self.evaluate(tower.geometry);
        self.cache.insert(key, safe);
        safe
    }

    /// Stores a result computed elsewhere, e.g. by a parallel pre-pass
    pub fn record(&mut self, point: Point<f64>, safe: bool) {
        self.cache.insert(coord_key(point), safe);
    }

    pub fn safe_distance(&self) -> f64 {
        self.safe_distance
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
