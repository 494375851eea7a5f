//! RGB colours for shader parameters

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::{Vec3, Vec4};

use crate::error::{CausticError, Result};

/// Named colours accepted by [`Color::parse`]
const NAMED: [(&str, [u8; 3]); 8] = [
    ("white", [255, 255, 255]),
    ("black", [0, 0, 0]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("darkblue", [0, 0, 139]),
    ("lavenderblush", [255, 240, 245]),
];

/// RGB colour with channels in [0, 1]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub Vec3);

impl Color {
    pub const WHITE: Color = Color(Vec3::ONE);
    pub const BLACK: Color = Color(Vec3::ZERO);

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Color(Vec3::new(r as f32, g as f32, b as f32) / 255.0)
    }

    /// Parse `#rrggbb`, `#rgb`, `rgb(r, g, b)` or a colour name
    ///
    /// # Example
    ///
    /// ```
    /// use toon_ocean::shading::Color;
    ///
    /// assert_eq!(Color::parse("rgb(0, 57, 115)").unwrap(), Color::from_rgb8(0, 57, 115));
    /// assert_eq!(Color::parse("#ff0000").unwrap(), Color::parse("red").unwrap());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for anything else.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let invalid = || CausticError::InvalidInput(format!("unrecognised colour '{}'", text));

        if let Some(hex) = text.strip_prefix('#') {
            let digits: Vec<u8> = hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| d as u8))
                .collect::<Option<_>>()
                .ok_or_else(invalid)?;
            return match digits[..] {
                [r, g, b] => Ok(Self::from_rgb8(r * 17, g * 17, b * 17)),
                [r1, r0, g1, g0, b1, b0] => Ok(Self::from_rgb8(r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0)),
                _ => Err(invalid()),
            };
        }

        if let Some(body) = text.strip_prefix("rgb(").and_then(|t| t.strip_suffix(')')) {
            let channels: Vec<u8> = body
                .split(',')
                .map(|c| c.trim().parse::<u8>().ok())
                .collect::<Option<_>>()
                .ok_or_else(invalid)?;
            return match channels[..] {
                [r, g, b] => Ok(Self::from_rgb8(r, g, b)),
                _ => Err(invalid()),
            };
        }

        NAMED
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(text))
            .map(|(_, [r, g, b])| Self::from_rgb8(*r, *g, *b))
            .ok_or_else(invalid)
    }

    #[inline]
    pub fn rgb(&self) -> Vec3 {
        self.0
    }

    #[inline]
    pub fn with_alpha(&self, alpha: f32) -> Vec4 {
        self.0.extend(alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Color::parse("#ffffff").unwrap(), Color::WHITE);
        assert_eq!(Color::parse("#000").unwrap(), Color::BLACK);
        assert_eq!(Color::parse("#8CDCFF").unwrap(), Color::from_rgb8(140, 220, 255));
        assert_eq!(Color::parse(" rgb(140, 220,255) ").unwrap(), Color::from_rgb8(140, 220, 255));
        assert_eq!(Color::parse("DarkBlue").unwrap(), Color::from_rgb8(0, 0, 139));
        assert_eq!(Color::parse("lavenderblush").unwrap(), Color::from_rgb8(255, 240, 245));
        assert_eq!(Color::parse("green").unwrap(), Color::from_rgb8(0, 128, 0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for text in ["", "#12", "#gggggg", "rgb(1, 2)", "rgb(1, 2, 300)", "seafoam"] {
            assert!(matches!(Color::parse(text), Err(CausticError::InvalidInput(_))), "{}", text);
        }
    }

    #[test]
    fn test_with_alpha() {
        assert_eq!(Color::WHITE.with_alpha(0.6), Vec4::new(1.0, 1.0, 1.0, 0.6));
    }
}
