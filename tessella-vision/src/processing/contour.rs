//! Boundary extraction from binary masks

use crate::model::RawMask;
use crate::processing::geometry;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;
use tracing::debug;

/// Trace the external boundaries of a mask, one simplified polygon per
/// connected component. Holes are not represented; boundaries that collapse
/// below three distinct points are dropped, so a mask may legitimately
/// contribute zero polygons.
pub fn extract_boundaries(mask: &RawMask, simplify_ratio: f64) -> Vec<Vec<Point<i32>>> {
    let raster = mask.to_gray();
    let contours = find_contours::<i32>(&raster);

    let mut boundaries = Vec::new();
    for contour in contours {
        if contour.border_type != BorderType::Outer {
            continue;
        }

        let simplified = geometry::simplify_boundary(&contour.points, simplify_ratio);
        if simplified.len() < 3 {
            debug!(
                "Dropping degenerate boundary ({} points after simplification)",
                simplified.len()
            );
            continue;
        }
        boundaries.push(simplified);
    }
    boundaries
}
