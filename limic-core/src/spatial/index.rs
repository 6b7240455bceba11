//! Radius queries over geographic points

use geo::Point;
use rstar::{RTree, primitives::GeomWithData};

use super::projection::{Geocentric, Projection};

type IndexedPoint<T> = GeomWithData<[f64; 3], T>;

/// R-tree over projected points answering radius queries in meters.
///
/// Read-only after construction.
pub struct SpatialIndex<T, P = Geocentric> {
    tree: RTree<IndexedPoint<T>>,
    projection: P,
}

impl<T: Copy, P: Projection> SpatialIndex<T, P> {
    pub fn new(items: impl IntoIterator<Item = (T, Point<f64>)>, projection: P) -> Self {
        let indexed: Vec<IndexedPoint<T>> = items
            .into_iter()
            .map(|(item, point)| GeomWithData::new(projection.project(point), item))
            .collect();

        Self {
            tree: RTree::bulk_load(indexed),
            projection,
        }
    }

    /// Every item within `radius` meters of `point`
    pub fn query_radius(&self, point: Point<f64>, radius: f64) -> Vec<T> {
        if radius < 0.0 {
            return Vec::new();
        }
        let query = self.projection.project(point);
        let chord = self.projection.chord(radius);
        self.tree
            .locate_within_distance(query, chord * chord)
            .map(|entry| entry.data)
            .collect()
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
