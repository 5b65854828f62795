//! Polygon simplification and coordinate normalization

use crate::types::{NormalizedPoint, Polygon};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;

/// Default simplification tolerance as a fraction of boundary perimeter
pub const DEFAULT_SIMPLIFY_RATIO: f64 = 0.005;

/// Simplify a closed pixel boundary with a Douglas-Peucker tolerance
/// proportional to its perimeter. A tolerance tied to the perimeter keeps the
/// approximation consistent across image resolutions.
pub fn simplify_boundary(boundary: &[Point<i32>], simplify_ratio: f64) -> Vec<Point<i32>> {
    if boundary.len() < Polygon::MIN_POINTS {
        return boundary.to_vec();
    }

    let epsilon = simplify_ratio * arc_length(boundary, true);
    if epsilon <= 0.0 {
        return boundary.to_vec();
    }

    let mut simplified = approximate_polygon_dp(boundary, epsilon, true);
    if simplified.len() > 1 && simplified.first() == simplified.last() {
        simplified.pop();
    }
    simplified
}

/// Map a pixel boundary into normalized space, clamped to [0, 1].
///
/// Returns `None` for boundaries that cannot form a valid polygon.
pub fn normalize_boundary(boundary: &[Point<i32>], width: u32, height: u32) -> Option<Polygon> {
    let points = boundary
        .iter()
        .map(|p| NormalizedPoint::from_pixel(p.x as f64, p.y as f64, width, height))
        .collect();
    Polygon::from_points(points)
}
