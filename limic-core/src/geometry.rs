//! Geometric primitives - distances, segment crossings and containment

use geo::{Contains, Coord, Distance, Haversine, LineString, Point, Polygon};

/// Great-circle distance in meters.
///
/// Arguments are ordered before evaluation, so the result is bit-identical
/// in both directions.
pub fn distance(a: Point<f64>, b: Point<f64>) -> f64 {
    if coord_order(a.0, b.0).is_le() {
        Haversine.distance(a, b)
    } else {
        Haversine.distance(b, a)
    }
}

/// Crossing point of segments `(p1, p2)` and `(q1, q2)`.
///
/// The crossing must lie inside both segments and farther than `eps`
/// (a fraction of the segment length) from every endpoint. Crossings in
/// those end zones are shared endpoints of adjacent segments in practice.
/// Parallel segments never cross.
///
/// Operands are put into a canonical order first, so the same pair of
/// segments always yields the same coordinate.
pub fn segment_intersection(
    p1: Point<f64>,
    p2: Point<f64>,
    q1: Point<f64>,
    q2: Point<f64>,
    eps: f64,
) -> Option<Point<f64>> {
    let (a1, a2) = ordered(p1.0, p2.0);
    let (b1, b2) = ordered(q1.0, q2.0);
    let ((a1, a2), (b1, b2)) = if coord_order(a1, b1)
        .then_with(|| coord_order(a2, b2))
        .is_le()
    {
        ((a1, a2), (b1, b2))
    } else {
        ((b1, b2), (a1, a2))
    };

    let r = a2 - a1;
    let s = b2 - b1;
    let denom = cross(r, s);
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }

    let qp = b1 - a1;
    let t = cross(qp, s) / denom;
    let u = cross(qp, r) / denom;

    let inside = |v: f64| v > eps && v < 1.0 - eps;
    if inside(t) && inside(u) {
        Some(Point(a1 + r * t))
    } else {
        None
    }
}

/// Planar containment test, boundary points are outside.
///
/// Fewer than 3 vertices describe no area and contain nothing.
pub fn point_in_polygon(point: Point<f64>, vertices: &[Point<f64>]) -> bool {
    match polygon_from_vertices(vertices) {
        Some(polygon) => polygon.contains(&point),
        None => false,
    }
}

/// Closed polygon from its boundary vertices, `None` if degenerate
pub fn polygon_from_vertices(vertices: &[Point<f64>]) -> Option<Polygon<f64>> {
    if vertices.len() < 3 {
        return None;
    }
    let exterior: LineString<f64> = vertices.iter().map(|p| p.0).collect();
    Some(Polygon::new(exterior, vec![]))
}

fn cross(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

fn coord_order(a: Coord<f64>, b: Coord<f64>) -> std::cmp::Ordering {
    a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
}

fn ordered(a: Coord<f64>, b: Coord<f64>) -> (Coord<f64>, Coord<f64>) {
    if coord_order(a, b).is_le() { (a, b) } else { (b, a) }
}
