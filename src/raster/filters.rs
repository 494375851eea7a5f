//! Coverage filters: wrap-around Gaussian blur, goo remap, displacement
//!
//! The bitmap is a repeating texture, so every neighbourhood lookup wraps
//! around the opposite edge.

use rayon::prelude::*;

use super::turbulence::Turbulence;
use super::CoverageMap;
use crate::config::GooFilter;

/// Normalised 1D Gaussian kernel with radius `ceil(3 * sigma)`
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let radius = (3.0 * sigma).ceil() as i32;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Separable Gaussian blur with toroidal wrap
pub fn blur_wrapped(map: &mut CoverageMap, sigma: f32) {
    if sigma <= 0.0 {
        return;
    }
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;
    let (width, height) = (map.width(), map.height());

    // Horizontal pass
    let src = map.data().to_vec();
    map.data_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let src_row = &src[y * width..(y + 1) * width];
            for (x, out) in row.iter_mut().enumerate() {
                *out = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, w)| {
                        let sx = (x as isize + k as isize - radius).rem_euclid(width as isize) as usize;
                        w * src_row[sx]
                    })
                    .sum();
            }
        });

    // Vertical pass
    let src = map.data().to_vec();
    map.data_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            row.fill(0.0);
            for (k, w) in kernel.iter().enumerate() {
                let sy = (y as isize + k as isize - radius).rem_euclid(height as isize) as usize;
                let src_row = &src[sy * width..(sy + 1) * width];
                for (out, value) in row.iter_mut().zip(src_row) {
                    *out += w * value;
                }
            }
        });
}

/// Blur, then remap coverage through the goo alpha curve
pub fn apply_goo(map: &mut CoverageMap, goo: &GooFilter) {
    blur_wrapped(map, goo.std_deviation);
    map.data_mut().par_iter_mut().for_each(|c| *c = goo.remap(*c));
}

/// Shift coverage along a blurred turbulence field
///
/// Two independent turbulence channels drive x and y. Each output pixel reads
/// the source at `p + scale * (channel - 0.5)`, bilinearly and with wrap.
pub fn displace(map: &mut CoverageMap, scale: f32, turbulence: [Turbulence; 2], std_deviation: f32) {
    let (width, height) = (map.width(), map.height());

    let mut channels = turbulence.map(|t| CoverageMap::from_data(width, height, t.render(width, height)));
    for channel in channels.iter_mut() {
        blur_wrapped(channel, std_deviation);
    }
    let [dx_map, dy_map] = channels;

    let src = map.clone();
    map.data_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let dx = scale * (dx_map.get(x, y) - 0.5);
                let dy = scale * (dy_map.get(x, y) - 0.5);
                *out = src.sample_wrapped(x as f32 + 0.5 + dx, y as f32 + 0.5 + dy);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stripes(width: usize, height: usize) -> CoverageMap {
        let mut map = CoverageMap::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if (x / 4) % 2 == 0 {
                    map.set(x, y, 1.0);
                }
            }
        }
        map
    }

    #[test]
    fn test_kernel_normalised() {
        let kernel = gaussian_kernel(4.0);
        assert_eq!(kernel.len(), 25);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(kernel[12] > kernel[11]);
        assert_eq!(gaussian_kernel(0.0), vec![1.0]);
    }

    #[test]
    fn test_blur_preserves_mass() {
        let mut map = stripes(32, 16);
        let before: f32 = map.data().iter().sum();
        blur_wrapped(&mut map, 3.0);
        let after: f32 = map.data().iter().sum();
        assert!((before - after).abs() < 1e-2);
    }

    #[test]
    fn test_blur_wraps_edges() {
        // A single hot pixel at the corner bleeds into the opposite corner
        let mut map = CoverageMap::new(16, 16);
        map.set(0, 0, 1.0);
        blur_wrapped(&mut map, 1.5);
        assert!(map.get(15, 15) > 0.0);
        assert!((map.get(15, 0) - map.get(1, 0)).abs() < 1e-6);
        assert!((map.get(0, 15) - map.get(0, 1)).abs() < 1e-6);
    }

    #[test]
    fn test_goo_closes_narrow_gaps() {
        // Two blocks separated by a 2px channel merge under a steep remap
        let mut map = CoverageMap::new(96, 96);
        for y in 20..60 {
            for x in (10..40).chain(42..72) {
                map.set(x, y, 1.0);
            }
        }
        apply_goo(&mut map, &GooFilter::MERGE);
        assert!(map.get(40, 40) > 0.99);
        assert!(map.get(41, 40) > 0.99);
        // background two blur radii away stays empty
        assert_eq!(map.get(41, 0), 0.0);
    }

    #[test]
    fn test_zero_scale_displacement_is_identity() {
        let mut map = stripes(16, 16);
        let original = map.clone();
        let t = Turbulence::stitched(0.05, 1, 1, 16, 16);
        displace(&mut map, 0.0, [t, t], 2.0);
        for (a, b) in map.data().iter().zip(original.data()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_displacement_moves_content() {
        let mut map = stripes(32, 32);
        let original = map.clone();
        let t1 = Turbulence::stitched(0.05, 1, 1, 32, 32);
        let t2 = Turbulence::stitched(0.05, 1, 2, 32, 32);
        displace(&mut map, 8.0, [t1, t2], 1.0);
        assert_ne!(map.data(), original.data());
        assert!(map.data().iter().all(|c| (0.0..=1.0).contains(c)));
    }
}
