//! Inset cell polygons
//!
//! Every vertex of a cell outline is pulled toward the cell's site:
//!
//! ```text
//! t = 1 - gap / max(distance(site, v), gap)
//! v' = lerp(site, v, t)
//! ```
//!
//! A vertex farther than `gap` from the site ends up exactly `gap` closer to
//! it; a vertex within `gap` collapses onto the site. Adjacent cells are thus
//! separated by a channel about `2 * gap` wide, and small cells shrink into
//! rounded blobs.

use crate::geometry::{distance, lerp, Point};
use crate::mask::MaskPolygon;
use crate::voronoi::Diagram;

/// Interpolation factor for one vertex
#[inline]
pub fn inset_factor(site: Point, vertex: Point, gap: f64) -> f64 {
    1.0 - gap / distance(site, vertex).max(gap)
}

/// Pull every vertex toward `site`
pub fn inset_polygon(site: Point, vertices: &[Point], gap: f64) -> Vec<Point> {
    vertices
        .iter()
        .map(|&v| lerp(site, v, inset_factor(site, v, gap)))
        .collect()
}

/// Inset outline of every non-degenerate cell, in cell order
///
/// The outline is the start of the first half-edge followed by the end of
/// every half-edge, so the first vertex appears twice.
pub fn inset_polygons(diagram: &Diagram, gap: f64) -> Vec<MaskPolygon> {
    diagram
        .cells()
        .iter()
        .filter(|cell| !cell.is_degenerate())
        .map(|cell| {
            let outline = diagram.cell_outline(cell.site);
            MaskPolygon::new(cell.position, inset_polygon(cell.position, &outline, gap))
        })
        .collect()
}
