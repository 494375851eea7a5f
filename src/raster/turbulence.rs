//! Tileable turbulence
//!
//! Gradient noise on an integer lattice whose hash wraps with a fixed period,
//! so the field repeats exactly across the texture. Turbulence sums the
//! absolute value of each octave, giving the sharp creases of water ripples.

use rayon::prelude::*;

// ============================================================================
// PERMUTATION TABLE
// ============================================================================
// Standard 256-element permutation table from Ken Perlin's reference implementation.
const PERM: [u32; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209, 76,
    132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173,
    186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212, 207, 206,
    59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44, 154, 163,
    70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232,
    178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162,
    241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157, 184, 84, 204,
    176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29, 24, 72, 243, 141,
    128, 195, 78, 66, 215, 61, 156, 180,
];

/// Lattice hash mixed with a seed
#[inline]
fn hash(x: u32, y: u32, seed: u32) -> u32 {
    let seed_hash = (seed.wrapping_mul(1103515245).wrapping_add(12345)) >> 16;
    let ix = (x ^ seed_hash) & 255;
    let iy = (y ^ (seed_hash >> 8)) & 255;
    let a = PERM[ix as usize];
    PERM[((a + iy) & 255) as usize]
}

/// Dot product with one of 8 lattice gradients
#[inline]
fn gradient(hash_value: u32, x: f32, y: f32) -> f32 {
    let h = hash_value & 7;
    let (u, v) = if h < 4 { (x, y) } else { (y, x) };
    let sign_u = if (h & 1) == 0 { -u } else { u };
    let sign_v = if (h & 2) == 0 { -v } else { v };
    sign_u + sign_v
}

/// Quintic smoothstep, 6t⁵ - 15t⁴ + 10t³
#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// 2D gradient noise repeating every `period` lattice cells, roughly in [-1, 1]
fn periodic_noise(x: f32, y: f32, period: (i64, i64), seed: u32) -> f32 {
    let x_floor = x.floor();
    let y_floor = y.floor();
    let xf = x - x_floor;
    let yf = y - y_floor;

    let wrap = |i: i64, p: i64| i.rem_euclid(p) as u32;
    let x0 = wrap(x_floor as i64, period.0);
    let x1 = wrap(x_floor as i64 + 1, period.0);
    let y0 = wrap(y_floor as i64, period.1);
    let y1 = wrap(y_floor as i64 + 1, period.1);

    let g00 = gradient(hash(x0, y0, seed), xf, yf);
    let g10 = gradient(hash(x1, y0, seed), xf - 1.0, yf);
    let g01 = gradient(hash(x0, y1, seed), xf, yf - 1.0);
    let g11 = gradient(hash(x1, y1, seed), xf - 1.0, yf - 1.0);

    let u = fade(xf);
    let v = fade(yf);
    // Max of |g| is 2 at the cell centre diagonal; halve into [-1, 1]
    0.5 * lerp(lerp(g00, g10, u), lerp(g01, g11, u), v)
}

/// Stitched turbulence over a `width x height` tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Turbulence {
    frequency: (f32, f32),
    period: (i64, i64),
    octaves: usize,
    seed: u32,
}

impl Turbulence {
    /// Turbulence whose frequency is nudged so whole lattice cells fit the tile
    ///
    /// Per axis the candidate frequencies are `floor(size * f) / size` and
    /// `ceil(size * f) / size`; the one with the smaller ratio to `f` wins.
    pub fn stitched(base_frequency: f32, octaves: usize, seed: u32, width: u32, height: u32) -> Self {
        let (fx, px) = stitch(base_frequency, width);
        let (fy, py) = stitch(base_frequency, height);
        Self {
            frequency: (fx, fy),
            period: (px, py),
            octaves: octaves.max(1),
            seed,
        }
    }

    /// Lattice cells per tile on each axis (first octave)
    #[inline]
    pub fn period(&self) -> (i64, i64) {
        self.period
    }

    /// Turbulence at a pixel position, in [0, 1]
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut scale = 1.0;
        for octave in 0..self.octaves {
            let period = (self.period.0 << octave, self.period.1 << octave);
            let seed = self.seed.wrapping_add(octave as u32);
            let n = periodic_noise(
                x * self.frequency.0 * scale,
                y * self.frequency.1 * scale,
                period,
                seed,
            );
            total += n.abs() * amplitude;
            amplitude *= 0.5;
            scale *= 2.0;
        }
        total.clamp(0.0, 1.0)
    }

    /// Sample every pixel centre of a `width x height` grid, row-major
    pub fn render(&self, width: usize, height: usize) -> Vec<f32> {
        let mut out = vec![0.0; width * height];
        out.par_chunks_mut(width.max(1))
            .enumerate()
            .for_each(|(y, row)| {
                for (x, value) in row.iter_mut().enumerate() {
                    *value = self.sample(x as f32 + 0.5, y as f32 + 0.5);
                }
            });
        out
    }
}

fn stitch(frequency: f32, size: u32) -> (f32, i64) {
    let size_f = size as f32;
    let lo = (size_f * frequency).floor().max(1.0);
    let hi = (size_f * frequency).ceil().max(1.0);
    let cells = if lo == hi || frequency / (lo / size_f) < (hi / size_f) / frequency {
        lo
    } else {
        hi
    };
    (cells / size_f, cells as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stitch_frequency() {
        // 512 * 0.025 = 12.8 cells: 13 is closer in ratio than 12
        let (f, cells) = stitch(0.025, 512);
        assert_eq!(cells, 13);
        assert!((f - 13.0 / 512.0).abs() < 1e-7);

        // never below one cell per tile
        assert_eq!(stitch(0.001, 64).1, 1);
    }

    #[test]
    fn test_range_and_determinism() {
        let t = Turbulence::stitched(0.025, 2, 42, 128, 128);
        for i in 0..200 {
            let (x, y) = (i as f32 * 1.37, i as f32 * 0.71);
            let v = t.sample(x, y);
            assert!((0.0..=1.0).contains(&v));
            assert_eq!(v, t.sample(x, y));
        }
    }

    #[test]
    fn test_tiles_seamlessly() {
        let t = Turbulence::stitched(0.025, 2, 7, 256, 128);
        for i in 0..50 {
            let x = i as f32 * 3.3;
            let y = i as f32 * 1.9;
            assert!((t.sample(x, y) - t.sample(x + 256.0, y)).abs() < 1e-3);
            assert!((t.sample(x, y) - t.sample(x, y + 128.0)).abs() < 1e-3);
        }
    }

    #[test]
    fn test_seeds_differ() {
        let a = Turbulence::stitched(0.05, 1, 1, 64, 64).render(64, 64);
        let b = Turbulence::stitched(0.05, 1, 2, 64, 64).render(64, 64);
        assert_eq!(a.len(), 64 * 64);
        assert_ne!(a, b);
    }

    #[test]
    fn test_zero_at_lattice_points() {
        // gradient noise vanishes on the lattice
        let t = Turbulence::stitched(1.0 / 16.0, 1, 3, 64, 64);
        assert_eq!(t.sample(0.0, 0.0), 0.0);
        assert_eq!(t.sample(16.0, 32.0), 0.0);
    }
}
