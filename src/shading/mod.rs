//! CPU versions of the water and gradient shading programs
//!
//! These evaluate one fragment at a time with the same math the GPU programs
//! run, which makes the look testable and usable for offline previews.

mod color;
mod depth;
mod gradient;
mod ocean;

pub use color::Color;
pub use depth::{DepthFrame, DepthSource};
pub use gradient::GradientShader;
pub use ocean::{OceanFragment, OceanParams, OceanShader};

/// Hermite step between two edges
///
/// Works for reversed edges (`edge0 > edge1`) too, which the ocean program
/// uses to fade effects out with distance. Equal edges give a hard step.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
