//! Caustic pattern composition
//!
//! Turns a point count into a [`PolygonMask`]:
//!
//! 1. `point_count - 3` random sites in the texture domain
//! 2. Lloyd relaxation over an oversized box
//! 3. three fresh (unrelaxed) jitter sites
//! 4. 3×3 tiling of the site set
//! 5. final diagram over the tiled set
//! 6. inset polygon per cell
//! 7. mask with the configured filter pipeline

mod inset;
mod lloyd;
mod sites;

pub use inset::{inset_factor, inset_polygon, inset_polygons};
pub use lloyd::{lloyd_relaxation, lloyd_relaxation_with_options, relax_cells, LloydOptions};
pub use sites::{random_sites, tile_sites};

use rand::Rng;

use crate::config::{validate_point_count, CausticConfig};
use crate::error::Result;
use crate::geometry::Point;
use crate::mask::PolygonMask;
use crate::voronoi::{compute_diagram, Diagram};

/// Sites added after relaxation to break up the relaxed lattice
pub const JITTER_SITES: usize = 3;

/// Steps 1 to 3: relaxed seeds plus jitter, in domain coordinates
///
/// # Errors
///
/// Returns `InvalidConfig` if `point_count < MIN_POINT_COUNT`.
pub fn caustic_sites<R: Rng + ?Sized>(
    config: &CausticConfig,
    point_count: usize,
    rng: &mut R,
) -> Result<Vec<Point>> {
    validate_point_count(point_count)?;
    let (width, height) = (config.width as f64, config.height as f64);

    let seeds = random_sites(rng, point_count - JITTER_SITES, width, height);
    let mut sites = lloyd_relaxation_with_options(seeds, config.bbox()?, config.lloyd_options())?;
    sites.extend(random_sites(rng, JITTER_SITES, width, height));
    Ok(sites)
}

/// Steps 4 and 5: diagram of the 3×3 tiled site set
pub fn tiled_diagram(config: &CausticConfig, sites: &[Point]) -> Result<Diagram> {
    let tiled = tile_sites(sites, config.width as f64, config.height as f64);
    compute_diagram(&tiled, config.bbox()?)
}

/// Run the whole composition and return the mask
///
/// # Example
///
/// ```rust
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use toon_ocean::*;
///
/// let config = CausticConfigBuilder::new().seed(1).size(128, 128).unwrap().build().unwrap();
/// let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
/// let mask = compose_mask(&config, 10, &mut rng).unwrap();
///
/// // ten sites, nine tiles
/// assert!(mask.polygon_count() <= 90);
/// assert!(mask.visible_polygons().count() > 0);
/// ```
pub fn compose_mask<R: Rng + ?Sized>(
    config: &CausticConfig,
    point_count: usize,
    rng: &mut R,
) -> Result<PolygonMask> {
    let sites = caustic_sites(config, point_count, rng)?;
    let diagram = tiled_diagram(config, &sites)?;
    let polygons = inset_polygons(&diagram, config.target_gap());

    Ok(PolygonMask::new(
        config.width,
        config.height,
        polygons,
        &config.filters,
        rng.gen(),
    ))
}
