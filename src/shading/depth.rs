//! Scene depth captured before the water is drawn

use glam::Vec2;
use image::{ImageBuffer, Luma};

use crate::error::{CausticError, Result};

/// Depth bitmap with one `f32` per pixel
pub type DepthImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Scene depth for one camera, normalised to [0, 1] between the clip planes
///
/// Values are linear: 0 is the near plane, 1 the far plane. Lookups use
/// nearest filtering and clamp to the edge.
#[derive(Debug, Clone)]
pub struct DepthFrame {
    depth: DepthImage,
    near: f32,
    far: f32,
}

impl DepthFrame {
    /// Wrap an already linear depth bitmap
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty bitmap or clip planes that are not
    /// `0 < near < far`.
    pub fn new(depth: DepthImage, near: f32, far: f32) -> Result<Self> {
        if depth.width() == 0 || depth.height() == 0 {
            return Err(CausticError::InvalidInput("depth frame has no pixels".into()));
        }
        if !(near > 0.0 && far > near && far.is_finite()) {
            return Err(CausticError::InvalidInput(format!(
                "clip planes must satisfy 0 < near < far (got {}, {})",
                near, far
            )));
        }
        Ok(Self { depth, near, far })
    }

    /// Convert a perspective depth buffer (window-space z) to linear depth
    pub fn from_perspective(buffer: &DepthImage, near: f32, far: f32) -> Result<Self> {
        let linear = ImageBuffer::from_fn(buffer.width(), buffer.height(), |x, y| {
            Luma([perspective_to_linear(buffer.get_pixel(x, y).0[0], near, far)])
        });
        Self::new(linear, near, far)
    }

    /// Same depth everywhere, in scene units
    pub fn uniform(width: u32, height: u32, distance: f32, near: f32, far: f32) -> Result<Self> {
        let normalised = ((distance - near) / (far - near)).clamp(0.0, 1.0);
        Self::new(ImageBuffer::from_pixel(width, height, Luma([normalised])), near, far)
    }

    #[inline]
    pub fn near(&self) -> f32 {
        self.near
    }

    #[inline]
    pub fn far(&self) -> f32 {
        self.far
    }

    /// Size of the frame in pixels
    pub fn resolution(&self) -> Vec2 {
        Vec2::new(self.depth.width() as f32, self.depth.height() as f32)
    }

    /// Normalised depth at `coord` in [0, 1]² screen space
    pub fn read(&self, coord: Vec2) -> f32 {
        let (w, h) = self.depth.dimensions();
        let x = ((coord.x * w as f32).floor().max(0.0) as u32).min(w - 1);
        let y = ((coord.y * h as f32).floor().max(0.0) as u32).min(h - 1);
        self.depth.get_pixel(x, y).0[0]
    }

    /// Scene distance at a fragment position in pixels
    pub fn scene_depth(&self, frag_coord: Vec2) -> f32 {
        let d = self.read(frag_coord / self.resolution());
        self.near + (self.far - self.near) * d
    }
}

/// Perspective window depth to linear [0, 1] depth
pub fn perspective_to_linear(window_z: f32, near: f32, far: f32) -> f32 {
    let view_z = (near * far) / ((far - near) * window_z - far);
    (view_z + near) / (near - far)
}

/// Host hook that renders the scene depth for a camera
///
/// Called once per camera and frame; stereo rigs call it once per eye.
pub trait DepthSource {
    type Camera;

    fn capture(&mut self, camera: &Self::Camera) -> Result<DepthFrame>;
}
