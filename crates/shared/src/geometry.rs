//! Polygon helpers for free-hand selection, on top of `geo`.

use geo::{BoundingRect, Coord, Intersects, LineString, Point, Polygon};

use crate::models::LngLat;

/// Closed polygon from a ring of geographic coordinates. The ring is closed
/// automatically if the last vertex differs from the first.
pub fn polygon_from_ring(ring: &[LngLat]) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = ring.iter().map(|ll| Coord { x: ll.lng, y: ll.lat }).collect();
    Polygon::new(LineString::from(coords), vec![])
}

/// South-west and north-east corners of the polygon's bounding box.
pub fn bounding_corners(polygon: &Polygon<f64>) -> Option<(LngLat, LngLat)> {
    let rect = polygon.bounding_rect()?;
    Some((
        LngLat::new(rect.min().x, rect.min().y),
        LngLat::new(rect.max().x, rect.max().y),
    ))
}

/// Exact point-in-polygon test. Points on an edge or vertex count as inside.
pub fn contains(polygon: &Polygon<f64>, ll: LngLat) -> bool {
    polygon.intersects(&Point::new(ll.lng, ll.lat))
}
