//! Mapping of geographic coordinates into a metric space for indexing

use geo::Point;

/// Mean earth radius in meters, same as the haversine distance uses
pub const EARTH_RADIUS: f64 = 6_371_008.8;

/// Mapping from geographic coordinates into a Cartesian space in meters.
///
/// `chord` converts a surface distance into the straight-line distance
/// between projected points, which is what the R-tree compares.
pub trait Projection: Send + Sync {
    /// `[x, y, z]` in meters for a point with `x = lon`, `y = lat`
    fn project(&self, point: Point<f64>) -> [f64; 3];

    /// Projected distance of two points `meters` apart along the surface
    fn chord(&self, meters: f64) -> f64;
}

/// Earth-centered coordinates on the haversine sphere.
///
/// Chord length is monotonic in great-circle distance, so radius queries
/// are exact at any latitude and any extent of the working area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geocentric;

impl Projection for Geocentric {
    fn project(&self, point: Point<f64>) -> [f64; 3] {
        let (lat, lon) = (point.y().to_radians(), point.x().to_radians());
        [
            EARTH_RADIUS * lat.cos() * lon.cos(),
            EARTH_RADIUS * lat.cos() * lon.sin(),
            EARTH_RADIUS * lat.sin(),
        ]
    }

    fn chord(&self, meters: f64) -> f64 {
        let angle = (meters / EARTH_RADIUS).min(std::f64::consts::PI);
        2.0 * EARTH_RADIUS * (angle / 2.0).sin()
    }
}
