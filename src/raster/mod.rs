//! Turning a [`PolygonMask`] into pixels
//!
//! [`MaskRasterizer`] is the seam between the composer and whatever turns
//! vectors into a bitmap. [`SoftwareRasterizer`] is the built-in CPU
//! implementation: it keeps a single-channel coverage buffer (1.0 = fill
//! tone) and runs the mask's filter steps on it before converting to RGBA.
//!
//! Each cell is gooed on its own before it joins the others, so the gaps
//! between cells survive the heavy merge; the lighter group pass afterwards
//! only softens the composed pattern.

mod fill;
mod filters;
mod turbulence;

pub use fill::{fill_cells, fill_polygon};
pub use filters::{apply_goo, blur_wrapped, displace, gaussian_kernel};
pub use turbulence::Turbulence;

use image::{Rgba, RgbaImage};

use crate::error::{CausticError, Result};
use crate::mask::{FilterStep, PolygonMask};

/// Something that can render a mask into a bitmap of the mask's size
///
/// Implementations run on a rayon worker thread, hence `Send + Sync`.
pub trait MaskRasterizer: Send + Sync {
    /// Render `mask` into a `mask.width() x mask.height()` bitmap
    ///
    /// # Errors
    ///
    /// `RasterizationFailed` when the mask cannot be rendered.
    fn rasterize(&self, mask: &PolygonMask) -> Result<RgbaImage>;
}

/// Row-major single-channel coverage buffer
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageMap {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl CoverageMap {
    /// Empty (all zero) map
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    pub(crate) fn from_data(width: usize, height: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self { width, height, data }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.width + x] = value;
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub(crate) fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub(crate) fn row_mut(&mut self, y: usize) -> &mut [f32] {
        &mut self.data[y * self.width..(y + 1) * self.width]
    }

    /// Bilinear lookup at a continuous position, wrapping on both axes
    ///
    /// Pixel `(x, y)` has its centre at `(x + 0.5, y + 0.5)`.
    pub fn sample_wrapped(&self, x: f32, y: f32) -> f32 {
        let fx = x - 0.5;
        let fy = y - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;

        let wrap_x = |i: f32| (i as i64).rem_euclid(self.width as i64) as usize;
        let wrap_y = |i: f32| (i as i64).rem_euclid(self.height as i64) as usize;
        let (xa, xb) = (wrap_x(x0), wrap_x(x0 + 1.0));
        let (ya, yb) = (wrap_y(y0), wrap_y(y0 + 1.0));

        let top = self.get(xa, ya) * (1.0 - tx) + self.get(xb, ya) * tx;
        let bottom = self.get(xa, yb) * (1.0 - tx) + self.get(xb, yb) * tx;
        top * (1.0 - ty) + bottom * ty
    }

    /// Average coverage
    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f32>() / self.data.len() as f32
    }

    fn clamp_unit(&mut self) {
        self.data.iter_mut().for_each(|c| *c = c.clamp(0.0, 1.0));
    }

    /// Blend `background` (coverage 0) toward `fill` (coverage 1)
    pub fn to_image(&self, background: Rgba<u8>, fill: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let c = self.get(x as usize, y as usize).clamp(0.0, 1.0);
            let mut px = [0u8; 4];
            for (i, out) in px.iter_mut().enumerate() {
                let bg = background.0[i] as f32;
                let fg = fill.0[i] as f32;
                *out = (bg + (fg - bg) * c).round() as u8;
            }
            Rgba(px)
        })
    }
}

/// CPU rasterizer with scanline fill and wrap-around filters
///
/// # Example
///
/// ```rust
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use toon_ocean::*;
///
/// let config = CausticConfigBuilder::new().seed(3).size(64, 64).unwrap().build().unwrap();
/// let mask = compose_mask(&config, 10, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
///
/// let bitmap = SoftwareRasterizer::new().rasterize(&mask).unwrap();
/// assert_eq!(bitmap.dimensions(), (64, 64));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftwareRasterizer {
    subsamples: u32,
}

impl SoftwareRasterizer {
    pub const DEFAULT_SUBSAMPLES: u32 = 4;
    pub const MAX_SUBSAMPLES: u32 = 16;

    pub fn new() -> Self {
        Self {
            subsamples: Self::DEFAULT_SUBSAMPLES,
        }
    }

    /// Scanlines per pixel row used for anti-aliasing
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless `1 <= subsamples <= MAX_SUBSAMPLES`
    pub fn with_subsamples(subsamples: u32) -> Result<Self> {
        if !(1..=Self::MAX_SUBSAMPLES).contains(&subsamples) {
            return Err(CausticError::InvalidConfig(format!(
                "subsamples must be in 1..={} (got {})",
                Self::MAX_SUBSAMPLES,
                subsamples
            )));
        }
        Ok(Self { subsamples })
    }

    #[inline]
    pub fn subsamples(&self) -> u32 {
        self.subsamples
    }

    /// Run every filter step and return the final coverage
    pub fn render_coverage(&self, mask: &PolygonMask) -> Result<CoverageMap> {
        let (width, height) = (mask.width(), mask.height());
        if width == 0 || height == 0 {
            return Err(CausticError::RasterizationFailed(format!(
                "mask has no pixels ({}x{})",
                width, height
            )));
        }
        if let Some(bad) = mask
            .polygons()
            .iter()
            .find(|p| p.vertices.iter().any(|v| !v.is_finite()))
        {
            return Err(CausticError::RasterizationFailed(format!(
                "polygon around ({}, {}) has a non-finite vertex",
                bad.site.x, bad.site.y
            )));
        }

        let mut coverage = CoverageMap::new(width as usize, height as usize);
        for step in mask.steps() {
            match *step {
                FilterStep::FillCells(goo) => {
                    let margin = (gaussian_kernel(goo.std_deviation).len() / 2 + 1) as f64;
                    let cells: Vec<_> = mask.polygons_near_domain(margin).collect();
                    fill_cells(&mut coverage, &cells, &goo, self.subsamples);
                }
                FilterStep::Goo(goo) => {
                    apply_goo(&mut coverage, &goo);
                    coverage.clamp_unit();
                }
                FilterStep::Displace {
                    scale,
                    base_frequency,
                    octaves,
                    std_deviation,
                    seed,
                } => {
                    let channels = [
                        Turbulence::stitched(base_frequency, octaves, seed, width, height),
                        Turbulence::stitched(base_frequency, octaves, seed.wrapping_add(0x9e37), width, height),
                    ];
                    displace(&mut coverage, scale, channels, std_deviation);
                }
            }
        }
        Ok(coverage)
    }
}

impl Default for SoftwareRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskRasterizer for SoftwareRasterizer {
    fn rasterize(&self, mask: &PolygonMask) -> Result<RgbaImage> {
        let coverage = self.render_coverage(mask)?;
        Ok(coverage.to_image(mask.background(), mask.fill()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CausticConfigBuilder, FilterPipeline};
    use crate::generation::compose_mask;
    use crate::geometry::Point;
    use crate::mask::MaskPolygon;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn square_mask(filters: &FilterPipeline) -> PolygonMask {
        let polygon = MaskPolygon::new(
            Point::new(16.0, 16.0),
            vec![
                Point::new(8.0, 8.0),
                Point::new(24.0, 8.0),
                Point::new(24.0, 24.0),
                Point::new(8.0, 24.0),
            ],
        );
        PolygonMask::new(32, 32, vec![polygon], filters, 0)
    }

    #[test]
    fn test_sample_wrapped() {
        let mut map = CoverageMap::new(4, 4);
        map.set(0, 0, 1.0);
        assert_eq!(map.sample_wrapped(0.5, 0.5), 1.0);
        // halfway to the right neighbour
        assert!((map.sample_wrapped(1.0, 0.5) - 0.5).abs() < 1e-6);
        // halfway across the left edge to pixel 3
        assert!((map.sample_wrapped(0.0, 0.5) - 0.5).abs() < 1e-6);
        assert_eq!(map.sample_wrapped(4.5, 4.5), 1.0);
    }

    #[test]
    fn test_to_image_blends() {
        let mut map = CoverageMap::new(2, 1);
        map.set(1, 0, 0.5);
        let img = map.to_image(Rgba([255, 255, 255, 255]), Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(img.get_pixel(1, 0), &Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn test_fill_only() {
        let filters = FilterPipeline {
            merge: crate::config::GooFilter::new(0.0, 1.0, 0.0).unwrap(),
            displacement: None,
            soften: crate::config::GooFilter::new(0.0, 1.0, 0.0).unwrap(),
        };
        let img = SoftwareRasterizer::new().rasterize(&square_mask(&filters)).unwrap();
        assert_eq!(img.get_pixel(16, 16), &Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(2, 2), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_rejects_non_finite_polygon() {
        let polygon = MaskPolygon::new(
            Point::new(1.0, 1.0),
            vec![Point::new(0.0, 0.0), Point::new(f64::NAN, 2.0), Point::new(2.0, 2.0)],
        );
        let mask = PolygonMask::new(8, 8, vec![polygon], &FilterPipeline::default(), 0);
        assert!(matches!(
            SoftwareRasterizer::new().rasterize(&mask),
            Err(CausticError::RasterizationFailed(_))
        ));
    }

    #[test]
    fn test_rejects_empty_mask() {
        let mask = PolygonMask::new(0, 8, Vec::new(), &FilterPipeline::default(), 0);
        assert!(SoftwareRasterizer::new().rasterize(&mask).is_err());
    }

    #[test]
    fn test_subsample_bounds() {
        assert!(SoftwareRasterizer::with_subsamples(0).is_err());
        assert!(SoftwareRasterizer::with_subsamples(17).is_err());
        assert_eq!(SoftwareRasterizer::with_subsamples(8).unwrap().subsamples(), 8);
    }

    #[test]
    fn test_caustic_bitmap_tiles_seamlessly() {
        let config = CausticConfigBuilder::new().seed(8).size(96, 96).unwrap().build().unwrap();
        let mask = compose_mask(&config, 10, &mut ChaCha8Rng::seed_from_u64(8)).unwrap();
        let coverage = SoftwareRasterizer::new().render_coverage(&mask).unwrap();

        let (w, h) = (coverage.width(), coverage.height());
        let step = |a: f32, b: f32| (a - b).abs();
        let mut seam = 0.0f32;
        let mut interior = 0.0f32;
        for y in 0..h {
            seam += step(coverage.get(w - 1, y), coverage.get(0, y));
            interior += step(coverage.get(w / 2 - 1, y), coverage.get(w / 2, y));
        }
        for x in 0..w {
            seam += step(coverage.get(x, h - 1), coverage.get(x, 0));
            interior += step(coverage.get(x, h / 2 - 1), coverage.get(x, h / 2));
        }
        // the wrap-around seam is no rougher than an interior line, with slack
        assert!(seam <= interior * 2.0 + 2.0, "seam {} vs interior {}", seam, interior);
    }

    #[test]
    fn test_caustic_bitmap_has_both_tones() {
        let config = CausticConfigBuilder::new().seed(2).size(96, 96).unwrap().build().unwrap();
        let mask = compose_mask(&config, 10, &mut ChaCha8Rng::seed_from_u64(2)).unwrap();
        let coverage = SoftwareRasterizer::new().render_coverage(&mask).unwrap();

        let mean = coverage.mean();
        assert!(mean > 0.05 && mean < 0.99, "mean coverage {}", mean);
        assert!(coverage.data().iter().all(|c| (0.0..=1.0).contains(c)));
    }
}
