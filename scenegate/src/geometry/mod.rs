//! Point buffering for spatial search filters.
//!
//! Inflates a point into a polygon approximating a disc, measured in the
//! point's own coordinate units (degrees). No geodesic correction is applied,
//! so the ground footprint of a buffer narrows in longitude towards the poles.

mod types;

pub use types::{Point, SearchPolygon};

use std::f64::consts::PI;

/// Radius, in degrees, used when buffering a search point.
pub const SEARCH_BUFFER_DEGREES: f64 = 1.0;

/// Number of straight segments used to approximate the disc.
///
/// 32 segments (8 per quadrant) give a ring of 33 vertices once closed.
pub const BUFFER_SEGMENTS: usize = 32;

/// Buffers a point into a closed polygon approximating a disc of `radius`.
///
/// The ring starts due east of the center and proceeds clockwise. Every vertex
/// lies on the circle of `radius` around `center` (up to floating-point
/// error), and the closing vertex is an exact copy of the first.
///
/// # Arguments
///
/// * `center` - Center of the disc
/// * `radius` - Radius in coordinate units
pub fn buffer_point(center: Point, radius: f64) -> SearchPolygon {
    let step = 2.0 * PI / BUFFER_SEGMENTS as f64;

    let vertices = (0..BUFFER_SEGMENTS)
        .map(|i| {
            let angle = -(i as f64) * step;
            Point::new(
                center.lon + radius * angle.cos(),
                center.lat + radius * angle.sin(),
            )
        })
        .collect();

    SearchPolygon::close(vertices)
}
