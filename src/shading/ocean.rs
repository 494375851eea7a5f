//! Toon water: foam line, depth tint and animated caustics
//!
//! Per fragment the program compares the scene depth behind the water with
//! the depth of the water surface itself:
//!
//! - less than 0.2 units of water: a foam band that fades in over 0.1 units
//! - otherwise a shallow-to-deep tint (refracted near the shore) darkened and
//!   lit by two caustic lookups, blended in from the foam over 0.2..0.3 units

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::{DVec2, Vec2, Vec4};

use super::{smoothstep, Color, DepthFrame};
use crate::texture::CausticTexture;

/// Distance over which the dark caustics fade out
const DARK_FOAM_DISTANCE: f32 = 8.0;
/// Distance over which the light caustics fade out
const LIGHT_FOAM_DISTANCE: f32 = 12.0;
/// Water thickness below which only foam is drawn
const FOAM_DEPTH: f32 = 0.2;
/// Width of the foam to water blend
const FOAM_BLEND: f32 = 0.1;
/// Amplitude in pixels of the refraction wobble
const REFRACTION_SHIFT: f32 = 3.0;
/// Vertical wave amplitude of the surface mesh
const WAVE_HEIGHT: f32 = 0.08;

/// Water look
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OceanParams {
    pub color_foam: Color,
    pub color_shallow: Color,
    pub color_deep: Color,
    pub opacity_foam: f32,
    pub opacity_shallow: f32,
    pub opacity_deep: f32,
    /// Caustic texture repeats across the surface
    pub repeat: f32,
    /// Water thickness at which the tint is fully deep
    pub max_depth: f32,
}

impl OceanParams {
    /// Preset of the ready-made ocean plane: dark blue depths, pale shallows
    pub fn toon_preset() -> Self {
        Self {
            color_deep: Color::from_rgb8(0, 0, 139),
            color_shallow: Color::from_rgb8(255, 240, 245),
            ..Self::default()
        }
    }
}

impl Default for OceanParams {
    fn default() -> Self {
        Self {
            color_foam: Color::WHITE,
            color_shallow: Color::from_rgb8(140, 220, 255),
            color_deep: Color::from_rgb8(0, 57, 115),
            opacity_foam: 0.6,
            opacity_shallow: 0.2,
            opacity_deep: 1.0,
            repeat: 10.0,
            max_depth: 3.0,
        }
    }
}

/// Inputs of one water fragment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OceanFragment {
    /// Surface texture coordinate
    pub uv: Vec2,
    /// Window position in pixels
    pub frag_coord: Vec2,
    /// Camera distance of the water surface at this fragment
    pub surface_depth: f32,
    /// Animation clock in milliseconds
    pub time_ms: f32,
}

/// The water program with its caustic texture bound
#[derive(Debug, Clone)]
pub struct OceanShader {
    params: OceanParams,
    caustics: CausticTexture,
}

impl OceanShader {
    pub fn new(params: OceanParams, caustics: CausticTexture) -> Self {
        Self { params, caustics }
    }

    #[inline]
    pub fn params(&self) -> &OceanParams {
        &self.params
    }

    #[inline]
    pub fn caustics(&self) -> &CausticTexture {
        &self.caustics
    }

    /// Height offset of the surface mesh at `uv`
    pub fn surface_offset(uv: Vec2, time_ms: f32) -> f32 {
        let time = time_ms * 0.001;
        WAVE_HEIGHT * (time / 1.8 + uv.y * 20.0).sin() + WAVE_HEIGHT * (time / 2.0 + uv.x * 20.0).cos()
    }

    /// Colour and opacity of one fragment
    ///
    /// Depth lookups use the clip planes `depth` was captured with.
    pub fn shade(&self, frag: &OceanFragment, depth: &DepthFrame) -> Vec4 {
        let p = &self.params;
        let time = frag.time_ms * 0.001;
        let surface = frag.surface_depth;
        let scene = depth.scene_depth(frag.frag_coord);
        let water = scene - surface;

        let foam = p.color_foam.with_alpha(p.opacity_foam);
        if water < FOAM_DEPTH {
            return p.color_foam.with_alpha(p.opacity_foam * smoothstep(0.0, FOAM_BLEND, water));
        }

        let shallow = p.color_shallow.with_alpha(p.opacity_shallow);
        let deep = p.color_deep.with_alpha(p.opacity_deep);
        let thickness = if water < p.max_depth {
            let wobble = Vec2::new(REFRACTION_SHIFT * (time + 0.1 * frag.frag_coord.y).sin(), 0.0);
            depth.scene_depth(frag.frag_coord + wobble) - surface
        } else {
            water
        };
        let tint = 1.5 * (0.5 * shallow).lerp(deep, smoothstep(0.0, p.max_depth, thickness));

        let transition = smoothstep(FOAM_DEPTH, FOAM_DEPTH + FOAM_BLEND, water);
        foam.lerp(tint * self.dark_foam(frag.uv, surface) + self.light_foam(frag.uv, surface, time), transition)
    }

    /// Static caustic layer that darkens the tint up close
    fn dark_foam(&self, uv: Vec2, surface: f32) -> Vec4 {
        let repeat = self.params.repeat * 1.25;
        let warp = Vec2::new((10.0 * repeat * uv.x).sin(), (10.0 * repeat * uv.y).cos());
        let coord = (uv + Vec2::new(0.5, 0.0)) * repeat + (2.0 / self.params.repeat * 1.25) * warp;
        Vec4::ONE - 0.2 * smoothstep(DARK_FOAM_DISTANCE, 0.0, surface) * self.caustic(coord)
    }

    /// Drifting caustic layer added on top
    fn light_foam(&self, uv: Vec2, surface: f32, time: f32) -> Vec4 {
        let repeat = self.params.repeat;
        let drift = Vec2::new(
            (time * 2.0 + repeat * 10.0 * uv.x).sin(),
            (time * 2.0 + repeat * 10.0 * uv.y).cos(),
        );
        let ripple = Vec2::new((repeat * 20.0 * uv.x).sin(), (repeat * 20.0 * uv.y).cos());
        let coord = uv * repeat + (1.0 / repeat) * drift + (2.0 / repeat) * ripple;
        self.caustic(coord) * 0.5 * smoothstep(LIGHT_FOAM_DISTANCE, 0.0, surface)
    }

    fn caustic(&self, coord: Vec2) -> Vec4 {
        self.caustics.sample(DVec2::new(coord.x as f64, coord.y as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use image::{Rgba, RgbaImage};

    fn split(color: Vec4) -> (Vec3, f32) {
        (color.truncate(), color.w)
    }

    fn shader(pixel: Rgba<u8>) -> OceanShader {
        OceanShader::new(OceanParams::default(), CausticTexture::from_bitmap(RgbaImage::from_pixel(4, 4, pixel)))
    }

    fn fragment(surface_depth: f32) -> OceanFragment {
        OceanFragment {
            uv: Vec2::new(0.3, 0.6),
            frag_coord: Vec2::new(2.0, 2.0),
            surface_depth,
            time_ms: 1234.0,
        }
    }

    fn close(a: Vec4, b: Vec4) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn test_defaults() {
        let p = OceanParams::default();
        assert_eq!(p.color_shallow, Color::from_rgb8(140, 220, 255));
        assert_eq!(p.color_deep, Color::from_rgb8(0, 57, 115));
        assert_eq!((p.opacity_foam, p.opacity_shallow, p.opacity_deep), (0.6, 0.2, 1.0));
        assert_eq!((p.repeat, p.max_depth), (10.0, 3.0));

        let toon = OceanParams::toon_preset();
        assert_eq!(toon.color_deep, Color::parse("darkblue").unwrap());
        assert_eq!(toon.color_shallow, Color::parse("lavenderblush").unwrap());
        assert_eq!(toon.color_foam, Color::WHITE);
    }

    #[test]
    fn test_foam_at_shoreline() {
        let shader = shader(Rgba([0, 0, 0, 255]));
        let depth = DepthFrame::uniform(4, 4, 10.0, 0.1, 50.0).unwrap();

        // surface touching the ground: invisible foam
        let (rgb, alpha) = split(shader.shade(&fragment(10.0), &depth));
        assert_eq!(rgb, Vec3::ONE);
        assert!(alpha.abs() < 1e-4);

        // 0.15 units of water: full foam opacity
        let (rgb, alpha) = split(shader.shade(&fragment(9.85), &depth));
        assert_eq!(rgb, Vec3::ONE);
        assert!((alpha - 0.6).abs() < 1e-4);
    }

    #[test]
    fn test_depth_uses_frame_clip_planes() {
        // 0.1 units of water under a camera with its own near and far
        let shader = shader(Rgba([0, 0, 0, 255]));
        let depth = DepthFrame::uniform(4, 4, 20.0, 1.0, 100.0).unwrap();
        let (rgb, alpha) = split(shader.shade(&fragment(19.9), &depth));
        assert_eq!(rgb, Vec3::ONE);
        assert!((alpha - 0.6).abs() < 1e-3, "alpha {}", alpha);

        // same scene through different clip planes shades the same
        let other = DepthFrame::uniform(4, 4, 20.0, 0.5, 30.0).unwrap();
        let a = shader.shade(&fragment(18.0), &depth);
        let b = shader.shade(&fragment(18.0), &other);
        assert!(close(a, b));
    }

    #[test]
    fn test_deep_water_far_away() {
        // Far from the camera both caustic layers have faded out
        let shader = shader(Rgba([255, 255, 255, 255]));
        let depth = DepthFrame::uniform(4, 4, 45.0, 0.1, 50.0).unwrap();
        let color = shader.shade(&fragment(20.0), &depth);

        let p = OceanParams::default();
        assert!(close(color, 1.5 * p.color_deep.with_alpha(p.opacity_deep)));
    }

    #[test]
    fn test_shallow_tint_uses_refracted_depth() {
        // Left half of the screen is deep, right half shallow; the wobble at
        // this time and row reads the other side
        let depth = image::ImageBuffer::from_fn(4, 4, |x, _| image::Luma([if x < 2 { 0.9 } else { 0.3 }]));
        let depth = DepthFrame::new(depth, 0.1, 50.0).unwrap();
        let shader = shader(Rgba([255, 255, 255, 255]));

        let p = OceanParams::default();
        let scene = depth.near() + (depth.far() - depth.near()) * 0.3;
        let frag = OceanFragment {
            uv: Vec2::ZERO,
            frag_coord: Vec2::new(2.5, 0.5),
            surface_depth: scene - 1.0,
            time_ms: -(0.05 + std::f32::consts::FRAC_PI_2) * 1000.0,
        };
        let color = shader.shade(&frag, &depth);
        // sin(time + 0.1 * y) = -1 shifts the lookup three pixels left, where
        // the scene is far deeper than max_depth. Caustics have faded out at
        // this distance.
        assert!(close(color, 1.5 * p.color_deep.with_alpha(p.opacity_deep)));
    }

    #[test]
    fn test_caustics_brighten_nearby_water() {
        let depth = DepthFrame::uniform(4, 4, 6.0, 0.1, 50.0).unwrap();
        let lit = shader(Rgba([255, 255, 255, 255])).shade(&fragment(2.0), &depth);
        let dark = shader(Rgba([0, 0, 0, 0])).shade(&fragment(2.0), &depth);
        assert!(lit.x > dark.x);
        assert!(lit.z > dark.z);
    }

    #[test]
    fn test_surface_offset() {
        let offset = OceanShader::surface_offset(Vec2::ZERO, 0.0);
        assert!((offset - 0.08).abs() < 1e-6);
        for i in 0..20 {
            let uv = Vec2::new(i as f32 * 0.05, 1.0 - i as f32 * 0.05);
            assert!(OceanShader::surface_offset(uv, i as f32 * 100.0).abs() <= 0.16 + 1e-6);
        }
    }
}
