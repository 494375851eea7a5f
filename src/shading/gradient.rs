//! Linear gradients with two to four colour stops

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::{Vec2, Vec4};

use super::{smoothstep, Color};
use crate::error::{CausticError, Result};

/// Linear gradient along an angle in texture space
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use toon_ocean::shading::{Color, GradientShader};
///
/// // red at the bottom edge, green at the top
/// let gradient = GradientShader::two_stop();
/// let top = gradient.shade(Vec2::new(0.5, 1.0));
/// let green = Color::parse("green").unwrap().rgb();
/// assert!((top.truncate() - green).abs().max_element() < 1e-6);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GradientShader {
    colors: Vec<Color>,
    stops: Vec<f32>,
    opacity: f32,
    angle: f32,
}

impl GradientShader {
    /// Gradient through `colors`, reaching colour `i` at `stops[i]`
    ///
    /// `angle` is in degrees; 0 runs along `u`, 90 along `v`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless there are 2 to 4 colours with one stop
    /// each, and every number is finite.
    pub fn new(colors: Vec<Color>, stops: Vec<f32>, opacity: f32, angle: f32) -> Result<Self> {
        if !(2..=4).contains(&colors.len()) {
            return Err(CausticError::InvalidConfig(format!(
                "gradient needs 2 to 4 colours (got {})",
                colors.len()
            )));
        }
        if stops.len() != colors.len() {
            return Err(CausticError::InvalidConfig(format!(
                "gradient has {} colours but {} stops",
                colors.len(),
                stops.len()
            )));
        }
        if !(opacity.is_finite() && angle.is_finite() && stops.iter().all(|s| s.is_finite())) {
            return Err(CausticError::InvalidConfig("gradient parameters must be finite".into()));
        }
        Ok(Self {
            colors,
            stops,
            opacity,
            angle,
        })
    }

    /// Red to green, stops `0 1`
    pub fn two_stop() -> Self {
        Self::preset(2, &[0.0, 1.0])
    }

    /// Red, green, blue, stops `0 0.5 1`
    pub fn three_stop() -> Self {
        Self::preset(3, &[0.0, 0.5, 1.0])
    }

    /// Red, green, blue, yellow, stops `0 0.33 0.66 1`
    pub fn four_stop() -> Self {
        Self::preset(4, &[0.0, 0.33, 0.66, 1.0])
    }

    fn preset(count: usize, stops: &[f32]) -> Self {
        let palette = [
            Color::from_rgb8(255, 0, 0),
            Color::from_rgb8(0, 128, 0),
            Color::from_rgb8(0, 0, 255),
            Color::from_rgb8(255, 255, 0),
        ];
        Self {
            colors: palette[..count].to_vec(),
            stops: stops.to_vec(),
            opacity: 1.0,
            angle: 90.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_angle(mut self, degrees: f32) -> Self {
        self.angle = degrees;
        self
    }

    #[inline]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    #[inline]
    pub fn stops(&self) -> &[f32] {
        &self.stops
    }

    /// Colour at `uv`
    ///
    /// Each segment is a smoothstep between its stops. Past a stop the next
    /// segment takes over, so values beyond the last stop keep the last colour.
    pub fn shade(&self, uv: Vec2) -> Vec4 {
        let angle = self.angle.to_radians();
        let t = uv.x * angle.cos() + uv.y * angle.sin();

        let mut rgb = self.segment(0, t);
        for i in 1..self.colors.len() - 1 {
            if t > self.stops[i] {
                rgb = self.segment(i, t);
            }
        }
        rgb.extend(self.opacity)
    }

    fn segment(&self, i: usize, t: f32) -> glam::Vec3 {
        let blend = smoothstep(self.stops[i], self.stops[i + 1], t);
        self.colors[i].rgb().lerp(self.colors[i + 1].rgb(), blend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec4, b: Vec4) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn test_two_stop_runs_along_v() {
        let g = GradientShader::two_stop();
        let red = Color::from_rgb8(255, 0, 0).with_alpha(1.0);
        let green = Color::from_rgb8(0, 128, 0).with_alpha(1.0);
        assert!(close(g.shade(Vec2::new(0.9, 0.0)), red));
        assert!(close(g.shade(Vec2::new(0.1, 1.0)), green));
        // smoothstep midpoint
        assert!(close(g.shade(Vec2::new(0.0, 0.5)), red.lerp(green, 0.5)));
    }

    #[test]
    fn test_angle_zero_runs_along_u() {
        let g = GradientShader::two_stop().with_angle(0.0);
        let green = Color::from_rgb8(0, 128, 0).with_alpha(1.0);
        assert!(close(g.shade(Vec2::new(1.0, 0.0)), green));
    }

    #[test]
    fn test_three_stop_hits_every_colour() {
        let g = GradientShader::three_stop();
        let colors: Vec<Vec4> = g.colors().iter().map(|c| c.with_alpha(1.0)).collect();
        assert!(close(g.shade(Vec2::new(0.0, 0.0)), colors[0]));
        assert!(close(g.shade(Vec2::new(0.0, 0.5)), colors[1]));
        assert!(close(g.shade(Vec2::new(0.0, 1.0)), colors[2]));
        assert!(close(g.shade(Vec2::new(0.0, 1.5)), colors[2]));
    }

    #[test]
    fn test_four_stop_and_opacity() {
        let g = GradientShader::four_stop().with_opacity(0.25);
        assert_eq!(g.stops(), &[0.0, 0.33, 0.66, 1.0]);
        let end = g.shade(Vec2::new(0.0, 1.0));
        assert!(close(end, Color::from_rgb8(255, 255, 0).with_alpha(0.25)));
        // between the third and fourth stop
        let c = g.shade(Vec2::new(0.0, 0.83));
        assert!(c.x > 0.0 && c.y > 0.0 && c.z > 0.0);
    }

    #[test]
    fn test_validation() {
        let c = Color::WHITE;
        assert!(GradientShader::new(vec![c], vec![0.0], 1.0, 0.0).is_err());
        assert!(GradientShader::new(vec![c; 5], vec![0.0; 5], 1.0, 0.0).is_err());
        assert!(GradientShader::new(vec![c; 3], vec![0.0, 1.0], 1.0, 0.0).is_err());
        assert!(GradientShader::new(vec![c; 2], vec![0.0, f32::NAN], 1.0, 0.0).is_err());
        assert!(GradientShader::new(vec![c; 2], vec![0.0, 1.0], 1.0, 45.0).is_ok());
    }
}
