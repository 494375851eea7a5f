//! Vector mask handed to a rasterizer
//!
//! A [`PolygonMask`] is what the caustic composer produces: filled cell
//! polygons over a plain background plus the filter stages to run on the
//! result. It carries no pixels; turning it into a bitmap is the job of a
//! [`MaskRasterizer`](crate::raster::MaskRasterizer).

use image::Rgba;

use crate::config::{FilterPipeline, GooFilter, REFERENCE_SIZE};
use crate::geometry::{polygon_area, Point};

/// Background tone behind the cells
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Fill tone of the cells
pub const FILL: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// One inset cell
#[derive(Debug, Clone, PartialEq)]
pub struct MaskPolygon {
    /// Site the polygon was inset toward
    pub site: Point,
    /// Ordered outline, closed implicitly
    pub vertices: Vec<Point>,
}

impl MaskPolygon {
    pub fn new(site: Point, vertices: Vec<Point>) -> Self {
        Self { site, vertices }
    }

    /// Unsigned polygon area
    pub fn area(&self) -> f64 {
        polygon_area(&self.vertices).abs()
    }

    /// Axis-aligned extent as `(min, max)`, `None` when there are no vertices
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(lo, hi), v| (lo.min(*v), hi.max(*v))),
        )
    }
}

/// A raster operation, applied in order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterStep {
    /// Fill every polygon on its own, run it through the goo filter, then
    /// composite it over the cells drawn so far
    FillCells(GooFilter),
    /// Blur and remap the coverage of everything drawn so far
    Goo(GooFilter),
    /// Shift coverage along a blurred, tileable turbulence field
    Displace {
        /// Amplitude in pixels
        scale: f32,
        base_frequency: f32,
        octaves: usize,
        std_deviation: f32,
        seed: u32,
    },
}

/// Filled polygons plus the filter stages that turn them into caustics
#[derive(Debug, Clone)]
pub struct PolygonMask {
    width: u32,
    height: u32,
    polygons: Vec<MaskPolygon>,
    steps: Vec<FilterStep>,
}

impl PolygonMask {
    /// Create a mask
    ///
    /// Filter parameters are taken as given for a `REFERENCE_SIZE` wide
    /// texture and scaled to `width`. `noise_seed` drives the turbulence of
    /// the displacement stage.
    pub fn new(
        width: u32,
        height: u32,
        polygons: Vec<MaskPolygon>,
        filters: &FilterPipeline,
        noise_seed: u32,
    ) -> Self {
        let factor = width as f32 / REFERENCE_SIZE as f32;
        let mut steps = vec![FilterStep::FillCells(filters.merge.scaled(factor))];
        if let Some(d) = filters.displacement.map(|d| d.scaled(factor)) {
            steps.push(FilterStep::Displace {
                scale: d.scale(width),
                base_frequency: d.base_frequency,
                octaves: d.octaves,
                std_deviation: d.std_deviation,
                seed: noise_seed,
            });
        }
        steps.push(FilterStep::Goo(filters.soften.scaled(factor)));

        Self {
            width,
            height,
            polygons,
            steps,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn background(&self) -> Rgba<u8> {
        BACKGROUND
    }

    #[inline]
    pub fn fill(&self) -> Rgba<u8> {
        FILL
    }

    #[inline]
    pub fn polygons(&self) -> &[MaskPolygon] {
        &self.polygons
    }

    #[inline]
    pub fn steps(&self) -> &[FilterStep] {
        &self.steps
    }

    #[inline]
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Polygons that overlap the texture
    pub fn visible_polygons(&self) -> impl Iterator<Item = &MaskPolygon> {
        self.polygons_near_domain(0.0)
    }

    /// Polygons that overlap the texture grown by `margin` on every side
    ///
    /// Filters that spread coverage need the cells just outside the texture
    /// as well.
    pub fn polygons_near_domain(&self, margin: f64) -> impl Iterator<Item = &MaskPolygon> {
        let (w, h) = (self.width as f64, self.height as f64);
        self.polygons.iter().filter(move |p| {
            p.bounds().map_or(false, |(lo, hi)| {
                hi.x >= -margin && lo.x <= w + margin && hi.y >= -margin && lo.y <= h + margin
            })
        })
    }

    /// Total filled area before filtering, all tiles included
    pub fn filled_area(&self) -> f64 {
        self.polygons.iter().map(MaskPolygon::area).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Displacement;

    fn square(x: f64, y: f64, size: f64) -> MaskPolygon {
        MaskPolygon::new(
            Point::new(x + size / 2.0, y + size / 2.0),
            vec![
                Point::new(x, y),
                Point::new(x + size, y),
                Point::new(x + size, y + size),
                Point::new(x, y + size),
            ],
        )
    }

    #[test]
    fn test_pipeline_order() {
        let mask = PolygonMask::new(512, 512, Vec::new(), &FilterPipeline::default(), 7);
        let steps = mask.steps();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0], FilterStep::FillCells(GooFilter::MERGE));
        match steps[1] {
            FilterStep::Displace { scale, seed, .. } => {
                assert!((scale - 512.0 / 13.0).abs() < 1e-4);
                assert_eq!(seed, 7);
            }
            other => panic!("expected displacement, got {:?}", other),
        }
        assert_eq!(steps[2], FilterStep::Goo(GooFilter::SOFTEN));
    }

    #[test]
    fn test_pipeline_without_displacement() {
        let filters = FilterPipeline {
            displacement: None,
            ..FilterPipeline::default()
        };
        let mask = PolygonMask::new(64, 64, Vec::new(), &filters, 0);
        assert_eq!(mask.steps().len(), 2);
        assert!(!mask
            .steps()
            .iter()
            .any(|s| matches!(s, FilterStep::Displace { .. })));
        assert_eq!(Displacement::WAVES.octaves, 1);
    }

    #[test]
    fn test_filters_follow_width() {
        let mask = PolygonMask::new(128, 128, Vec::new(), &FilterPipeline::default(), 0);
        assert_eq!(mask.steps()[0], FilterStep::FillCells(GooFilter::MERGE.scaled(0.25)));
        match mask.steps()[1] {
            FilterStep::Displace {
                scale,
                base_frequency,
                std_deviation,
                ..
            } => {
                assert!((scale - 128.0 / 13.0).abs() < 1e-4);
                assert!((base_frequency - 0.1).abs() < 1e-6);
                assert_eq!(std_deviation, 2.5);
            }
            other => panic!("expected displacement, got {:?}", other),
        }
    }

    #[test]
    fn test_visible_polygons() {
        let polygons = vec![square(10.0, 10.0, 5.0), square(-40.0, 10.0, 5.0), square(60.0, 60.0, 10.0)];
        let mask = PolygonMask::new(64, 64, polygons, &FilterPipeline::default(), 0);
        assert_eq!(mask.polygon_count(), 3);
        assert_eq!(mask.visible_polygons().count(), 2);
        // the left square sits 35 px outside
        assert_eq!(mask.polygons_near_domain(30.0).count(), 2);
        assert_eq!(mask.polygons_near_domain(40.0).count(), 3);
        assert!((mask.filled_area() - 150.0).abs() < 1e-9);
        assert_eq!(mask.background(), Rgba([255, 255, 255, 255]));
        assert_eq!(mask.fill(), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_bounds() {
        let p = square(1.0, 2.0, 3.0);
        assert_eq!(p.bounds(), Some((Point::new(1.0, 2.0), Point::new(4.0, 5.0))));
        assert_eq!(MaskPolygon::new(Point::ZERO, Vec::new()).bounds(), None);
    }
}
