//! Caustic texture configuration and builder
//!
//! This module provides configuration types for deterministic caustic texture generation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CausticError, Result};
use crate::generation::LloydOptions;
use crate::geometry::BBox;

/// Smallest accepted point count
///
/// Three of the points are always fresh jitter sites, so anything below four
/// leaves the relax pass without a single seed.
pub const MIN_POINT_COUNT: usize = 4;

/// Upper bound for relaxation passes
pub const MAX_RELAX_ITERATIONS: usize = 20;

/// Largest accepted texture side in pixels
pub const MAX_TEXTURE_SIZE: u32 = 8192;

/// Texture width the filter parameters are expressed for
///
/// Masks of other widths scale blur radii and noise frequency by
/// `width / REFERENCE_SIZE` so the pattern keeps its look at any size.
pub const REFERENCE_SIZE: u32 = 512;

/// Soft-edge merge: Gaussian blur of coverage, then `clamp(scale * alpha + offset)`
///
/// A steep remap of a blurred mask rounds corners and fuses shapes that sit
/// closer than roughly one standard deviation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GooFilter {
    /// Blur radius in pixels; 0 skips the blur
    pub std_deviation: f32,
    pub alpha_scale: f32,
    pub alpha_offset: f32,
}

impl GooFilter {
    /// Heavy merge applied to every filled cell
    pub const MERGE: GooFilter = GooFilter {
        std_deviation: 10.0,
        alpha_scale: 18.0,
        alpha_offset: -7.0,
    };

    /// Light merge applied to the composed group
    pub const SOFTEN: GooFilter = GooFilter {
        std_deviation: 4.0,
        alpha_scale: 14.0,
        alpha_offset: -8.0,
    };

    /// Create a goo filter
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if any parameter is not finite or the blur
    /// radius is negative.
    pub fn new(std_deviation: f32, alpha_scale: f32, alpha_offset: f32) -> Result<Self> {
        if !(std_deviation.is_finite() && alpha_scale.is_finite() && alpha_offset.is_finite()) {
            return Err(CausticError::InvalidConfig(format!(
                "goo parameters must be finite (got {}, {}, {})",
                std_deviation, alpha_scale, alpha_offset
            )));
        }
        if std_deviation < 0.0 {
            return Err(CausticError::InvalidConfig(format!(
                "goo blur radius must be >= 0 (got {})",
                std_deviation
            )));
        }
        Ok(Self {
            std_deviation,
            alpha_scale,
            alpha_offset,
        })
    }

    /// Same filter with the blur radius multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            std_deviation: self.std_deviation * factor,
            ..*self
        }
    }

    /// Alpha remap of a blurred coverage value
    #[inline]
    pub fn remap(&self, alpha: f32) -> f32 {
        (self.alpha_scale * alpha + self.alpha_offset).clamp(0.0, 1.0)
    }
}

/// Turbulent wave displacement of the whole mask
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Displacement {
    /// Displacement amplitude as a fraction of the texture width
    pub scale_ratio: f32,
    /// Turbulence frequency in cycles per pixel (adjusted to tile)
    pub base_frequency: f32,
    /// Turbulence octaves
    pub octaves: usize,
    /// Blur applied to the turbulence before it displaces anything
    pub std_deviation: f32,
}

impl Displacement {
    pub const WAVES: Displacement = Displacement {
        scale_ratio: 1.0 / 13.0,
        base_frequency: 0.025,
        octaves: 1,
        std_deviation: 10.0,
    };

    /// Displacement amplitude in pixels for a texture of `width`
    #[inline]
    pub fn scale(&self, width: u32) -> f32 {
        width as f32 * self.scale_ratio
    }

    /// Same displacement for a texture `factor` times the reference width
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            base_frequency: self.base_frequency / factor,
            std_deviation: self.std_deviation * factor,
            ..*self
        }
    }

    fn validate(&self) -> Result<()> {
        let finite = self.scale_ratio.is_finite()
            && self.base_frequency.is_finite()
            && self.std_deviation.is_finite();
        if !finite || self.base_frequency <= 0.0 || self.std_deviation < 0.0 || self.octaves == 0 {
            return Err(CausticError::InvalidConfig(format!(
                "invalid displacement parameters: {:?}",
                self
            )));
        }
        Ok(())
    }
}

/// Ordered filter stages applied after the cells are filled
///
/// Order is fixed: `merge`, then `displacement` (if any), then `soften`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterPipeline {
    pub merge: GooFilter,
    pub displacement: Option<Displacement>,
    pub soften: GooFilter,
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self {
            merge: GooFilter::MERGE,
            displacement: Some(Displacement::WAVES),
            soften: GooFilter::SOFTEN,
        }
    }
}

/// Configuration for deterministic caustic texture generation
///
/// The same configuration always produces the identical texture.
///
/// # Example
///
/// ```rust
/// use toon_ocean::*;
///
/// let config = CausticConfigBuilder::new()
///     .seed(42)
///     .size(256, 256)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.target_gap(), 256.0 / 55.0);
///
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: CausticConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CausticConfig {
    /// Random seed for site placement and turbulence
    pub seed: u64,

    /// Default number of sites per build (before tiling)
    pub point_count: usize,

    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Inset gap as a fraction of the width
    pub gap_ratio: f64,

    /// Number of Lloyd passes before the jitter sites are added
    ///
    /// - 0: raw random sites
    /// - 1: single relax (default)
    /// - 3+: close to a honeycomb, which looks less like caustics
    pub relax_iterations: usize,

    /// Stop relaxing once no site moves farther than this (pixels)
    ///
    /// 0.0 disables early termination.
    pub relax_convergence: f64,

    pub filters: FilterPipeline,
}

impl CausticConfig {
    /// Inset distance in pixels
    #[inline]
    pub fn target_gap(&self) -> f64 {
        self.width as f64 * self.gap_ratio
    }

    /// Oversized clipping box used for both diagram passes
    pub fn bbox(&self) -> Result<BBox> {
        BBox::around_domain(self.width as f64, self.height as f64)
    }

    /// The texture domain `[0, width] x [0, height]`
    pub fn domain(&self) -> Result<BBox> {
        BBox::domain(self.width as f64, self.height as f64)
    }

    pub fn lloyd_options(&self) -> LloydOptions {
        LloydOptions {
            max_iterations: self.relax_iterations,
            convergence_threshold: self.relax_convergence,
        }
    }
}

impl Default for CausticConfig {
    fn default() -> Self {
        CausticConfigBuilder::new().finish()
    }
}

/// Builder for creating CausticConfig with validation
///
/// # Example
///
/// ```rust
/// use toon_ocean::*;
///
/// // Use defaults
/// let config = CausticConfigBuilder::new().build().unwrap();
/// assert_eq!(config.point_count, 10);
///
/// // Customize
/// let config = CausticConfigBuilder::new()
///     .seed(12345)
///     .point_count(24)
///     .unwrap()
///     .relax_iterations(2)
///     .unwrap()
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct CausticConfigBuilder {
    seed: Option<u64>,
    point_count: usize,
    width: u32,
    height: u32,
    gap_ratio: f64,
    relax_iterations: usize,
    relax_convergence: f64,
    filters: FilterPipeline,
}

impl CausticConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random (generated from thread_rng)
    /// - point_count: 10
    /// - size: 512 x 512
    /// - gap_ratio: 1/55
    /// - relax_iterations: 1
    /// - relax_convergence: 0.0 (always run every pass)
    /// - filters: heavy merge, wave displacement, light merge
    pub fn new() -> Self {
        Self {
            seed: None,
            point_count: 10,
            width: 512,
            height: 512,
            gap_ratio: 1.0 / 55.0,
            relax_iterations: 1,
            relax_convergence: 0.0,
            filters: FilterPipeline::default(),
        }
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of sites per build
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `count < MIN_POINT_COUNT`
    pub fn point_count(mut self, count: usize) -> Result<Self> {
        validate_point_count(count)?;
        self.point_count = count;
        Ok(self)
    }

    /// Set the texture size in pixels
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if either side is 0 or above `MAX_TEXTURE_SIZE`
    pub fn size(mut self, width: u32, height: u32) -> Result<Self> {
        for (name, side) in [("width", width), ("height", height)] {
            if side == 0 || side > MAX_TEXTURE_SIZE {
                return Err(CausticError::InvalidConfig(format!(
                    "texture {} must be in 1..={} (got {})",
                    name, MAX_TEXTURE_SIZE, side
                )));
            }
        }
        self.width = width;
        self.height = height;
        Ok(self)
    }

    /// Set the inset gap as a fraction of the texture width
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless `0 < ratio < 0.5`
    pub fn gap_ratio(mut self, ratio: f64) -> Result<Self> {
        if !(ratio > 0.0 && ratio < 0.5) {
            return Err(CausticError::InvalidConfig(format!(
                "gap ratio must be in (0, 0.5) (got {})",
                ratio
            )));
        }
        self.gap_ratio = ratio;
        Ok(self)
    }

    /// Set the number of Lloyd passes
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if iterations > 20
    pub fn relax_iterations(mut self, iterations: usize) -> Result<Self> {
        if iterations > MAX_RELAX_ITERATIONS {
            return Err(CausticError::InvalidConfig(format!(
                "relax iterations must be <= {} (got {})",
                MAX_RELAX_ITERATIONS, iterations
            )));
        }
        self.relax_iterations = iterations;
        Ok(self)
    }

    /// Set the early-exit displacement threshold in pixels
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if threshold is negative or not finite
    pub fn relax_convergence(mut self, threshold: f64) -> Result<Self> {
        if !(threshold >= 0.0 && threshold.is_finite()) {
            return Err(CausticError::InvalidConfig(format!(
                "relax convergence threshold must be >= 0 (got {})",
                threshold
            )));
        }
        self.relax_convergence = threshold;
        Ok(self)
    }

    /// Replace the filter pipeline
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if a stage carries invalid parameters
    pub fn filters(mut self, filters: FilterPipeline) -> Result<Self> {
        GooFilter::new(
            filters.merge.std_deviation,
            filters.merge.alpha_scale,
            filters.merge.alpha_offset,
        )?;
        GooFilter::new(
            filters.soften.std_deviation,
            filters.soften.alpha_scale,
            filters.soften.alpha_offset,
        )?;
        if let Some(displacement) = &filters.displacement {
            displacement.validate()?;
        }
        self.filters = filters;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random seed using thread_rng.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the inset gap (`gap_ratio * width`) reaches
    /// half the shorter texture side, which would leave no cell visible.
    pub fn build(self) -> Result<CausticConfig> {
        let gap = self.width as f64 * self.gap_ratio;
        let limit = self.width.min(self.height) as f64 / 2.0;
        if gap >= limit {
            return Err(CausticError::InvalidConfig(format!(
                "inset gap {:.2}px must be below half the shorter side ({:.2}px)",
                gap, limit
            )));
        }
        Ok(self.finish())
    }

    fn finish(self) -> CausticConfig {
        CausticConfig {
            seed: self.seed.unwrap_or_else(rand::random),
            point_count: self.point_count,
            width: self.width,
            height: self.height,
            gap_ratio: self.gap_ratio,
            relax_iterations: self.relax_iterations,
            relax_convergence: self.relax_convergence,
            filters: self.filters,
        }
    }
}

impl Default for CausticConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn validate_point_count(count: usize) -> Result<()> {
    if count < MIN_POINT_COUNT {
        return Err(CausticError::InvalidConfig(format!(
            "point count must be >= {} (got {})",
            MIN_POINT_COUNT, count
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = CausticConfigBuilder::new().build().unwrap();
        assert_eq!(config.point_count, 10);
        assert_eq!(config.width, 512);
        assert_eq!(config.height, 512);
        assert_eq!(config.relax_iterations, 1);
        assert_eq!(config.relax_convergence, 0.0);
        assert_eq!(config.filters, FilterPipeline::default());
        assert!((config.target_gap() - 512.0 / 55.0).abs() < 1e-12);
    }

    #[test]
    fn test_builder_custom() {
        let config = CausticConfigBuilder::new()
            .seed(42)
            .point_count(30)
            .unwrap()
            .size(128, 64)
            .unwrap()
            .gap_ratio(0.05)
            .unwrap()
            .relax_iterations(3)
            .unwrap()
            .relax_convergence(0.5)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.point_count, 30);
        assert_eq!((config.width, config.height), (128, 64));
        assert!((config.target_gap() - 6.4).abs() < 1e-12);
        let options = config.lloyd_options();
        assert_eq!(options.max_iterations, 3);
        assert_eq!(options.convergence_threshold, 0.5);
    }

    #[test]
    fn test_point_count_minimum() {
        assert!(CausticConfigBuilder::new().point_count(4).is_ok());
        for count in [0, 1, 3] {
            let result = CausticConfigBuilder::new().point_count(count);
            assert!(matches!(result, Err(CausticError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(CausticConfigBuilder::new().size(0, 512).is_err());
        assert!(CausticConfigBuilder::new().size(512, 0).is_err());
        assert!(CausticConfigBuilder::new().size(MAX_TEXTURE_SIZE + 1, 16).is_err());
    }

    #[test]
    fn test_invalid_gap_ratio() {
        for ratio in [0.0, -0.1, 0.5, f64::NAN] {
            assert!(CausticConfigBuilder::new().gap_ratio(ratio).is_err(), "{}", ratio);
        }
    }

    #[test]
    fn test_gap_must_fit_texture() {
        // 0.4 * 256 = 102.4px gap on a 32px tall strip
        let result = CausticConfigBuilder::new()
            .size(256, 32)
            .unwrap()
            .gap_ratio(0.4)
            .unwrap()
            .build();
        assert!(matches!(result, Err(CausticError::InvalidConfig(_))));

        // the same ratio fits a square texture
        let config = CausticConfigBuilder::new()
            .size(32, 32)
            .unwrap()
            .gap_ratio(0.4)
            .unwrap()
            .build()
            .unwrap();
        assert!((config.target_gap() - 12.8).abs() < 1e-12);
    }

    #[test]
    fn test_builder_too_many_iterations() {
        assert!(CausticConfigBuilder::new().relax_iterations(20).is_ok());
        assert!(CausticConfigBuilder::new().relax_iterations(21).is_err());
    }

    #[test]
    fn test_invalid_convergence() {
        assert!(CausticConfigBuilder::new().relax_convergence(-1.0).is_err());
        assert!(CausticConfigBuilder::new().relax_convergence(f64::INFINITY).is_err());
    }

    #[test]
    fn test_invalid_filters() {
        let mut filters = FilterPipeline::default();
        filters.merge.std_deviation = -1.0;
        assert!(CausticConfigBuilder::new().filters(filters).is_err());

        let mut filters = FilterPipeline::default();
        filters.displacement = Some(Displacement {
            base_frequency: 0.0,
            ..Displacement::WAVES
        });
        assert!(CausticConfigBuilder::new().filters(filters).is_err());

        let filters = FilterPipeline {
            displacement: None,
            ..FilterPipeline::default()
        };
        assert!(CausticConfigBuilder::new().filters(filters).is_ok());
    }

    #[test]
    fn test_goo_remap() {
        let goo = GooFilter::MERGE;
        assert_eq!(goo.remap(0.0), 0.0);
        assert_eq!(goo.remap(1.0), 1.0);
        // 18 * 0.4 - 7 = 0.2
        assert!((goo.remap(0.4) - 0.2).abs() < 1e-6);
        assert!(GooFilter::new(f32::NAN, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_displacement_scale() {
        assert!((Displacement::WAVES.scale(512) - 512.0 / 13.0).abs() < 1e-4);
    }

    #[test]
    fn test_scaled_filters() {
        let half = GooFilter::MERGE.scaled(0.5);
        assert_eq!(half.std_deviation, 5.0);
        assert_eq!(half.alpha_scale, GooFilter::MERGE.alpha_scale);

        let waves = Displacement::WAVES.scaled(0.25);
        assert!((waves.base_frequency - 0.1).abs() < 1e-6);
        assert_eq!(waves.std_deviation, 2.5);
        assert_eq!(waves.scale_ratio, Displacement::WAVES.scale_ratio);
    }

    #[test]
    fn test_bbox_is_oversized() {
        let config = CausticConfigBuilder::new().seed(1).build().unwrap();
        let bbox = config.bbox().unwrap();
        assert_eq!(bbox.left(), -512.0);
        assert_eq!(bbox.right(), 1024.0);
        assert_eq!(config.domain().unwrap().area(), 512.0 * 512.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = CausticConfigBuilder::new()
            .seed(12345)
            .point_count(16)
            .unwrap()
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let restored: CausticConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, restored);
    }
}
