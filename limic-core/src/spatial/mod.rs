//! Metric spatial indexing of geographic points

mod index;
mod projection;

pub use index::SpatialIndex;
pub use projection::{EARTH_RADIUS, Geocentric, Projection};
