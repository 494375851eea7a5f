//! Site placement and 3×3 tiling
//!
//! Sites are drawn uniformly over the texture domain. For seamless output the
//! final site set is replicated once around the domain in every direction, so
//! the cells touching the left edge are the same cells that touch the right
//! edge, shifted by one width.

use rand::Rng;

use crate::geometry::Point;

/// Tile offsets in both axes, in domain units
const TILE_OFFSETS: [f64; 3] = [-1.0, 0.0, 1.0];

/// Draw `count` uniform random sites in `[0, width) x [0, height)`
pub fn random_sites<R: Rng + ?Sized>(rng: &mut R, count: usize, width: f64, height: f64) -> Vec<Point> {
    (0..count)
        .map(|_| Point::new(rng.gen::<f64>() * width, rng.gen::<f64>() * height))
        .collect()
}

/// Replicate sites over a 3×3 grid of the domain
///
/// The result holds `9 * sites.len()` points. Copy `k` of site `i` sits at
/// index `k * sites.len() + i`, with the untranslated copy at `k = 4`.
pub fn tile_sites(sites: &[Point], width: f64, height: f64) -> Vec<Point> {
    let mut tiled = Vec::with_capacity(sites.len() * 9);
    for dx in TILE_OFFSETS {
        for dy in TILE_OFFSETS {
            let offset = Point::new(dx * width, dy * height);
            tiled.extend(sites.iter().map(|&s| s + offset));
        }
    }
    tiled
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_sites_in_domain() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let sites = random_sites(&mut rng, 500, 512.0, 256.0);

        assert_eq!(sites.len(), 500);
        for s in &sites {
            assert!(s.x >= 0.0 && s.x < 512.0);
            assert!(s.y >= 0.0 && s.y < 256.0);
        }
    }

    #[test]
    fn test_random_sites_determinism() {
        let a = random_sites(&mut ChaCha8Rng::seed_from_u64(7), 20, 100.0, 100.0);
        let b = random_sites(&mut ChaCha8Rng::seed_from_u64(7), 20, 100.0, 100.0);
        let c = random_sites(&mut ChaCha8Rng::seed_from_u64(8), 20, 100.0, 100.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_tile_sites() {
        let sites = vec![Point::new(10.0, 20.0), Point::new(30.0, 40.0)];
        let tiled = tile_sites(&sites, 100.0, 50.0);

        assert_eq!(tiled.len(), 18);
        // untranslated copy in the middle
        assert_eq!(&tiled[8..10], &sites[..]);
        assert_eq!(tiled[0], Point::new(-90.0, -30.0));
        assert_eq!(tiled[17], Point::new(130.0, 90.0));

        for s in &tiled {
            assert!(s.x >= -100.0 && s.x < 200.0);
            assert!(s.y >= -50.0 && s.y < 100.0);
        }
    }

    #[test]
    fn test_tile_empty() {
        assert!(tile_sites(&[], 10.0, 10.0).is_empty());
    }
}
