//! Planar geometry primitives
//!
//! Points are `glam::DVec2` so the whole diagram pipeline runs in double
//! precision. The y axis grows downward (bitmap convention), which is why the
//! bounding box talks about `top` and `bottom` rather than min/max.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CausticError, Result};

/// A planar coordinate
pub type Point = DVec2;

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Affine interpolation between `p1` (t = 0) and `p2` (t = 1)
///
/// `t` is not clamped: values outside `[0, 1]` extrapolate along the line.
#[inline]
pub fn lerp(p1: Point, p2: Point, t: f64) -> Point {
    Point::new(p1.x + (p2.x - p1.x) * t, p1.y + (p2.y - p1.y) * t)
}

/// A straight segment between two points
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

impl Segment {
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        distance(self.a, self.b)
    }

    #[inline]
    pub fn midpoint(&self) -> Point {
        lerp(self.a, self.b, 0.5)
    }
}

/// Axis-aligned clipping rectangle
///
/// Invariant: `left < right` and `top < bottom`, all four finite. The only
/// way to obtain a `BBox` is through [`BBox::new`], which enforces it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl BBox {
    /// Create a bounding box
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any side is not finite or the box has
    /// non-positive width or height.
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Result<Self> {
        if !(left.is_finite() && right.is_finite() && top.is_finite() && bottom.is_finite()) {
            return Err(CausticError::InvalidInput(format!(
                "bounding box sides must be finite (got left={}, right={}, top={}, bottom={})",
                left, right, top, bottom
            )));
        }
        if left >= right || top >= bottom {
            return Err(CausticError::InvalidInput(format!(
                "bounding box must have positive size (got {}..{} x {}..{})",
                left, right, top, bottom
            )));
        }
        Ok(Self {
            left,
            right,
            top,
            bottom,
        })
    }

    /// Bounding box of the base domain `[0, width] x [0, height]`
    pub fn domain(width: f64, height: f64) -> Result<Self> {
        Self::new(0.0, width, 0.0, height)
    }

    /// Oversized box extending one full domain past every edge
    ///
    /// Cells near the border of the base domain are then never clipped by
    /// the box itself, only by their neighbours.
    pub fn around_domain(width: f64, height: f64) -> Result<Self> {
        Self::new(-width, width * 2.0, -height, height * 2.0)
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.left
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.right
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.top
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Check whether a point lies inside or on the border
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }

    /// Box grown by `margin` on every side (shrunk for a negative margin)
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the result would be empty or non-finite.
    pub fn expanded(&self, margin: f64) -> Result<Self> {
        Self::new(
            self.left - margin,
            self.right + margin,
            self.top - margin,
            self.bottom + margin,
        )
    }
}

/// Signed polygon area (shoelace formula), polygon closed implicitly
///
/// Positive for vertices ordered clockwise on screen (y down).
pub fn polygon_area(vertices: &[Point]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for (i, a) in vertices.iter().enumerate() {
        let b = vertices[(i + 1) % vertices.len()];
        twice_area += a.x * b.y - b.x * a.y;
    }
    twice_area * 0.5
}

/// Area centroid of a polygon, closed implicitly
///
/// Falls back to the vertex average when the polygon has (numerically) zero
/// area. Returns `None` for an empty vertex list.
pub fn polygon_centroid(vertices: &[Point]) -> Option<Point> {
    if vertices.is_empty() {
        return None;
    }

    let mut twice_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for (i, a) in vertices.iter().enumerate() {
        let b = vertices[(i + 1) % vertices.len()];
        let cross = a.x * b.y - b.x * a.y;
        twice_area += cross;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }

    if twice_area.abs() < 1e-12 {
        let sum: Point = vertices.iter().copied().sum();
        return Some(sum / vertices.len() as f64);
    }

    let factor = 1.0 / (3.0 * twice_area);
    Some(Point::new(cx * factor, cy * factor))
}
