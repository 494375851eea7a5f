//! Scanline polygon fill with vertical supersampling
//!
//! Each pixel row is sampled at `subsamples` evenly spaced scanlines. Along a
//! scanline the covered span is accumulated exactly (fractional end pixels),
//! so edges get anti-aliased in both directions.

use rayon::prelude::*;

use super::filters::{apply_goo, gaussian_kernel};
use super::CoverageMap;
use crate::config::GooFilter;
use crate::geometry::Point;
use crate::mask::MaskPolygon;

/// Add the even-odd coverage of one polygon to `map`
///
/// Coverage is added, not composited; callers clamp once all (disjoint)
/// polygons are in.
pub fn fill_polygon(map: &mut CoverageMap, vertices: &[Point], subsamples: u32) {
    if vertices.len() < 3 || subsamples == 0 {
        return;
    }
    let (width, height) = (map.width(), map.height());

    let (min_y, max_y) = vertices
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v.y), hi.max(v.y)));
    let first_row = min_y.floor().max(0.0) as usize;
    let last_row = (max_y.ceil().min(height as f64)).max(0.0) as usize;

    let weight = 1.0 / subsamples as f32;
    let mut crossings: Vec<f64> = Vec::with_capacity(8);

    for row in first_row..last_row {
        let row_data = map.row_mut(row);
        for s in 0..subsamples {
            let y = row as f64 + (s as f64 + 0.5) / subsamples as f64;

            crossings.clear();
            for (i, a) in vertices.iter().enumerate() {
                let b = vertices[(i + 1) % vertices.len()];
                // Half-open rule: an edge owns its upper end point only
                if (a.y <= y && y < b.y) || (b.y <= y && y < a.y) {
                    crossings.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
            crossings.sort_by(f64::total_cmp);

            for pair in crossings.chunks_exact(2) {
                add_span(row_data, pair[0], pair[1], weight, width);
            }
        }
    }
}

/// Fill each polygon into its own canvas, goo it, and composite over `map`
///
/// Every canvas is padded by the blur radius, so the wrap-around blur sees
/// only empty margin across its edges. Composition is source-over and is
/// clipped to `map`; cells straddling an edge are expected to come with their
/// translated copies.
pub fn fill_cells(map: &mut CoverageMap, polygons: &[&MaskPolygon], goo: &GooFilter, subsamples: u32) {
    let margin = (gaussian_kernel(goo.std_deviation).len() / 2) as i64 + 1;

    let canvases: Vec<((i64, i64), CoverageMap)> = polygons
        .par_iter()
        .filter_map(|polygon| {
            let (lo, hi) = polygon.bounds()?;
            let origin = (lo.x.floor() as i64 - margin, lo.y.floor() as i64 - margin);
            let width = (hi.x.ceil() as i64 + margin - origin.0).max(1) as usize;
            let height = (hi.y.ceil() as i64 + margin - origin.1).max(1) as usize;

            let shift = Point::new(origin.0 as f64, origin.1 as f64);
            let local: Vec<Point> = polygon.vertices.iter().map(|v| *v - shift).collect();

            let mut canvas = CoverageMap::new(width, height);
            fill_polygon(&mut canvas, &local, subsamples);
            canvas.data_mut().iter_mut().for_each(|c| *c = c.min(1.0));
            apply_goo(&mut canvas, goo);
            Some((origin, canvas))
        })
        .collect();

    let (width, height) = (map.width() as i64, map.height() as i64);
    for ((ox, oy), canvas) in &canvases {
        for ly in 0..canvas.height() {
            let y = oy + ly as i64;
            if y < 0 || y >= height {
                continue;
            }
            for lx in 0..canvas.width() {
                let x = ox + lx as i64;
                if x < 0 || x >= width {
                    continue;
                }
                let alpha = canvas.get(lx, ly);
                if alpha > 0.0 {
                    let (x, y) = (x as usize, y as usize);
                    let below = map.get(x, y);
                    map.set(x, y, alpha + below * (1.0 - alpha));
                }
            }
        }
    }
}

/// Add `weight` times the horizontal overlap of `[x0, x1]` with each pixel
fn add_span(row: &mut [f32], x0: f64, x1: f64, weight: f32, width: usize) {
    let x0 = x0.max(0.0);
    let x1 = x1.min(width as f64);
    if x1 <= x0 {
        return;
    }

    let i0 = x0.floor() as usize;
    let i1 = x1.floor() as usize;
    if i0 == i1 {
        row[i0] += (x1 - x0) as f32 * weight;
        return;
    }

    row[i0] += ((i0 + 1) as f64 - x0) as f32 * weight;
    for value in &mut row[i0 + 1..i1] {
        *value += weight;
    }
    if i1 < width {
        row[i1] += (x1 - i1 as f64) as f32 * weight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    #[test]
    fn test_pixel_aligned_rect() {
        let mut map = CoverageMap::new(8, 8);
        fill_polygon(&mut map, &rect(2.0, 1.0, 5.0, 4.0), 4);

        for y in 0..8 {
            for x in 0..8 {
                let inside = (2..5).contains(&x) && (1..4).contains(&y);
                let expected = if inside { 1.0 } else { 0.0 };
                assert!((map.get(x, y) - expected).abs() < 1e-6, "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_partial_coverage() {
        let mut map = CoverageMap::new(4, 4);
        fill_polygon(&mut map, &rect(0.5, 0.0, 1.25, 1.0), 4);
        assert!((map.get(0, 0) - 0.5).abs() < 1e-6);
        assert!((map.get(1, 0) - 0.25).abs() < 1e-6);
        assert_eq!(map.get(2, 0), 0.0);
    }

    #[test]
    fn test_area_is_preserved() {
        let triangle = vec![Point::new(3.0, 2.0), Point::new(28.0, 9.0), Point::new(11.0, 27.0)];
        let area = crate::geometry::polygon_area(&triangle).abs();
        let mut map = CoverageMap::new(32, 32);
        fill_polygon(&mut map, &triangle, 16);
        let covered: f32 = map.data().iter().sum();
        assert!((covered as f64 - area).abs() < 0.5, "{} vs {}", covered, area);
    }

    #[test]
    fn test_clipped_to_map() {
        let mut map = CoverageMap::new(4, 4);
        fill_polygon(&mut map, &rect(-10.0, -10.0, 2.0, 20.0), 2);
        for y in 0..4 {
            assert!((map.get(0, y) - 1.0).abs() < 1e-6);
            assert!((map.get(1, y) - 1.0).abs() < 1e-6);
            assert_eq!(map.get(2, y), 0.0);
        }
    }

    #[test]
    fn test_fill_cells_keeps_gaps_open() {
        // Two blocks 12 px apart stay apart when gooed one by one
        let a = MaskPolygon::new(Point::new(18.0, 30.0), rect(2.0, 10.0, 34.0, 50.0));
        let b = MaskPolygon::new(Point::new(62.0, 30.0), rect(46.0, 10.0, 78.0, 50.0));
        let mut map = CoverageMap::new(80, 60);
        fill_cells(&mut map, &[&a, &b], &GooFilter::MERGE, 4);

        assert!(map.get(18, 30) > 0.99);
        assert!(map.get(62, 30) > 0.99);
        assert!(map.get(40, 30) < 0.01);
        // corners get rounded off
        assert!(map.get(2, 10) < 0.01);
        assert!(map.data().iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn test_fill_cells_clips_to_map() {
        let cell = MaskPolygon::new(Point::new(0.0, 16.0), rect(-20.0, -8.0, 20.0, 40.0));
        let mut map = CoverageMap::new(32, 32);
        let identity = GooFilter::new(0.0, 1.0, 0.0).unwrap();
        fill_cells(&mut map, &[&cell], &identity, 2);
        assert!((map.get(0, 16) - 1.0).abs() < 1e-6);
        assert!((map.get(19, 0) - 1.0).abs() < 1e-6);
        assert_eq!(map.get(20, 16), 0.0);
    }

    #[test]
    fn test_degenerate_polygons_ignored() {
        let mut map = CoverageMap::new(4, 4);
        fill_polygon(&mut map, &[Point::new(1.0, 1.0), Point::new(3.0, 3.0)], 4);
        fill_polygon(&mut map, &rect(1.0, 1.0, 1.0, 3.0), 4);
        assert!(map.data().iter().all(|&c| c == 0.0));
    }
}
