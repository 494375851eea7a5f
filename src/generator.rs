//! CausticGenerator: the build entry point

use std::sync::Arc;
use std::time::Instant;

use image::RgbaImage;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::CausticConfig;
use crate::error::Result;
use crate::generation::{caustic_sites, inset_polygons, tiled_diagram};
use crate::mask::PolygonMask;
use crate::raster::{MaskRasterizer, SoftwareRasterizer};
use crate::texture::CausticTexture;

/// Builds caustic textures from a configuration
///
/// The generator owns one `ChaCha8Rng` seeded from `config.seed`, so a given
/// configuration always yields the same sequence of textures. It keeps the
/// most recent texture; starting a new build releases it.
///
/// # Type Parameters
///
/// * `R` - Rasterization backend, [`SoftwareRasterizer`] by default
///
/// # Example
///
/// ```
/// use toon_ocean::*;
///
/// let config = CausticConfigBuilder::new()
///     .seed(42)
///     .size(64, 64)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let mut generator = CausticGenerator::new(config);
/// let texture = generator.generate_caustic_texture(10).unwrap();
///
/// // bindable right away, pixels arrive in the background
/// assert_eq!(texture.width(), 64);
/// texture.wait_ready().unwrap();
/// assert!(texture.take_update());
/// ```
pub struct CausticGenerator<R = SoftwareRasterizer> {
    config: CausticConfig,
    rasterizer: Arc<R>,
    rng: ChaCha8Rng,
    current: Option<CausticTexture>,
}

impl CausticGenerator<SoftwareRasterizer> {
    /// Generator with the built-in software rasterizer
    pub fn new(config: CausticConfig) -> Self {
        Self::with_rasterizer(config, SoftwareRasterizer::new())
    }
}

impl<R: MaskRasterizer + 'static> CausticGenerator<R> {
    /// Generator with a custom rasterization backend
    pub fn with_rasterizer(config: CausticConfig, rasterizer: R) -> Self {
        Self {
            config,
            rasterizer: Arc::new(rasterizer),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            current: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &CausticConfig {
        &self.config
    }

    #[inline]
    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Texture of the latest build, if any
    pub fn current_texture(&self) -> Option<&CausticTexture> {
        self.current.as_ref()
    }

    /// Start a caustic build and return its texture immediately
    ///
    /// The geometry is built synchronously; rasterization runs on the rayon
    /// pool. The returned texture shows the background tone until the pixels
    /// are in, then raises its update flag once.
    ///
    /// # Arguments
    ///
    /// * `point_count` - Sites per tile, at least `MIN_POINT_COUNT`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a point count below the minimum, or the
    /// diagram error if the geometry cannot be built. Rasterization errors
    /// surface through [`CausticTexture::wait_ready`].
    pub fn generate_caustic_texture(&mut self, point_count: usize) -> Result<CausticTexture> {
        self.current = None;
        let start = Instant::now();

        let mask = self.compose(point_count)?;
        let texture = CausticTexture::blank(self.config.width, self.config.height);
        texture.spawn_render(mask, self.rasterizer.clone() as Arc<dyn MaskRasterizer>);

        info!(
            "[Caustics] Queued {}x{} texture from {} sites in {:.2}ms",
            self.config.width,
            self.config.height,
            point_count,
            start.elapsed().as_secs_f64() * 1000.0
        );

        self.current = Some(texture.clone());
        Ok(texture)
    }

    /// [`generate_caustic_texture`](Self::generate_caustic_texture) with the
    /// configured `point_count`
    pub fn generate(&mut self) -> Result<CausticTexture> {
        self.generate_caustic_texture(self.config.point_count)
    }

    /// Build and rasterize on the calling thread
    ///
    /// # Errors
    ///
    /// Same as [`generate_caustic_texture`](Self::generate_caustic_texture),
    /// plus any rasterization error.
    pub fn generate_caustic_bitmap(&mut self, point_count: usize) -> Result<RgbaImage> {
        let start = Instant::now();
        let mask = self.compose(point_count)?;
        let bitmap = self.rasterizer.rasterize(&mask)?;
        info!(
            "[Caustics] Rendered {}x{} bitmap from {} sites in {:.2}ms",
            bitmap.width(),
            bitmap.height(),
            point_count,
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(bitmap)
    }

    /// Geometry half of a build: sites, relax, tile, inset, mask
    pub fn compose(&mut self, point_count: usize) -> Result<PolygonMask> {
        let start = Instant::now();
        let config = &self.config;

        let sites = caustic_sites(config, point_count, &mut self.rng)?;
        let diagram = tiled_diagram(config, &sites)?;
        let polygons = inset_polygons(&diagram, config.target_gap());
        let mask = PolygonMask::new(config.width, config.height, polygons, &config.filters, self.rng.gen());

        info!(
            "[Caustics] {} sites -> {} cells -> {} polygons ({} visible) in {:.2}ms",
            sites.len(),
            diagram.cell_count(),
            mask.polygon_count(),
            mask.visible_polygons().count(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        debug!("[Caustics] Filter steps: {:?}", mask.steps());
        Ok(mask)
    }
}
