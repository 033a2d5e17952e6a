//! Geometry value types.

use serde::{Serialize, Serializer};

/// A geographic point in provider coordinate order (longitude, latitude).
///
/// Values are not range-checked locally. Out-of-range coordinates are sent
/// as-is and rejected (or ignored) by the provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Longitude in degrees (x).
    pub lon: f64,
    /// Latitude in degrees (y).
    pub lat: f64,
}

impl Point {
    /// Creates a point from longitude and latitude.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Planar distance to another point, in coordinate units.
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.lon - other.lon).hypot(self.lat - other.lat)
    }
}

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.lon, self.lat].serialize(serializer)
    }
}

/// A closed polygon ring used as a search area.
///
/// The first and last vertices are always identical. Serializes as a GeoJSON
/// polygon `coordinates` array (a single outer ring of `[x, y]` pairs).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPolygon {
    ring: Vec<Point>,
}

impl SearchPolygon {
    /// Builds a polygon from an open ring, appending the closing vertex.
    ///
    /// Returns `None` if fewer than 3 vertices are supplied.
    pub fn from_open_ring(vertices: Vec<Point>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        Some(Self::close(vertices))
    }

    /// Closes a ring that already holds at least three vertices.
    pub(super) fn close(mut vertices: Vec<Point>) -> Self {
        debug_assert!(vertices.len() >= 3);
        if let Some(&first) = vertices.first() {
            vertices.push(first);
        }
        Self { ring: vertices }
    }

    /// All vertices of the ring, including the closing vertex.
    pub fn vertices(&self) -> &[Point] {
        &self.ring
    }

    /// Number of vertices including the closing vertex.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Always false; a polygon has at least four ring entries.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Whether the first and last vertices coincide.
    pub fn is_closed(&self) -> bool {
        matches!((self.ring.first(), self.ring.last()), (Some(a), Some(b)) if a == b)
    }
}

impl Serialize for SearchPolygon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [&self.ring].serialize(serializer)
    }
}
