//! Graph nodes - real towers and synthetic crossings

use std::hash::{Hash, Hasher};

use geo::Point;

use crate::NodeId;

/// Infrastructure segment between two consecutive real nodes of a line
pub type Segment = (NodeId, NodeId);

/// Exact bit pattern of a coordinate, used for coordinate-keyed caches
pub type CoordKey = (u64, u64);

/// Node of the navigation graph.
///
/// Two towers are the same entity iff their ids are equal.
#[derive(Debug, Clone, Copy)]
pub struct Tower {
    /// Non-negative for real towers, negative for synthetic crossings
    pub id: NodeId,
    /// Node coordinates, `x` is longitude and `y` latitude
    pub geometry: Point<f64>,
    /// Segment a synthetic crossing lies on
    pub origin_segment: Option<Segment>,
}

impl Tower {
    pub fn new(id: NodeId, lat: f64, lon: f64) -> Self {
        Self {
            id,
            geometry: Point::new(lon, lat),
            origin_segment: None,
        }
    }

    pub fn synthetic(id: NodeId, geometry: Point<f64>, origin_segment: Segment) -> Self {
        debug_assert!(id < 0, "synthetic towers carry negative ids");
        Self {
            id,
            geometry,
            origin_segment: Some(origin_segment),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.id < 0
    }

    pub fn lat(&self) -> f64 {
        self.geometry.y()
    }

    pub fn lon(&self) -> f64 {
        self.geometry.x()
    }

    pub fn coord_key(&self) -> CoordKey {
        coord_key(self.geometry)
    }
}

impl PartialEq for Tower {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tower {}

impl Hash for Tower {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

pub fn coord_key(point: Point<f64>) -> CoordKey {
    (point.x().to_bits(), point.y().to_bits())
}

/// Sequential allocator of synthetic node ids (-1, -2, ...).
///
/// Ids handed out by one allocator are never reused.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    last: NodeId,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> NodeId {
        self.last -= 1;
        self.last
    }

    /// Number of ids allocated so far
    pub fn allocated(&self) -> usize {
        self.last.unsigned_abs() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_id() {
        let a = Tower::new(7, 52.0, 5.0);
        let b = Tower::new(7, 53.0, 6.0);
        let c = Tower::new(8, 52.0, 5.0);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_synthetic_tower() {
        let tower = Tower::synthetic(-3, Point::new(5.0, 52.0), (1, 2));

        assert!(tower.is_synthetic());
        assert_eq!(tower.origin_segment, Some((1, 2)));
        assert_eq!(tower.lat(), 52.0);
        assert_eq!(tower.lon(), 5.0);
        assert!(!Tower::new(0, 0.0, 0.0).is_synthetic());
    }

    #[test]
    fn test_id_allocator_is_sequential() {
        let mut ids = IdAllocator::new();

        assert_eq!(ids.next_id(), -1);
        assert_eq!(ids.next_id(), -2);
        assert_eq!(ids.next_id(), -3);
        assert_eq!(ids.allocated(), 3);
    }
}
