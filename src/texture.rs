//! Caustic texture handle
//!
//! A [`CausticTexture`] is usable the moment a build starts: it holds a
//! blank white bitmap until the background rasterization swaps real pixels
//! in. Clones share the same pixels.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use glam::{DVec2, Vec4};
use image::{Rgba, RgbaImage};
use log::warn;

use crate::error::{CausticError, Result};
use crate::mask::{PolygonMask, BACKGROUND};
use crate::raster::MaskRasterizer;

/// How texture coordinates outside `[0, 1)` are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
}

#[derive(Debug, Clone, PartialEq)]
enum Status {
    Pending,
    Ready,
    Failed(CausticError),
}

#[derive(Debug)]
struct State {
    bitmap: RgbaImage,
    status: Status,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<State>,
    ready: Condvar,
    needs_update: AtomicBool,
}

/// Tileable caustic bitmap, filled in asynchronously
#[derive(Debug, Clone)]
pub struct CausticTexture {
    width: u32,
    height: u32,
    shared: Arc<Shared>,
}

impl CausticTexture {
    /// All-background texture that is still waiting for its pixels
    pub fn blank(width: u32, height: u32) -> Self {
        Self::with_state(width, height, RgbaImage::from_pixel(width, height, BACKGROUND), Status::Pending)
    }

    /// Texture that already holds its final pixels
    pub fn from_bitmap(bitmap: RgbaImage) -> Self {
        let (width, height) = bitmap.dimensions();
        let texture = Self::with_state(width, height, bitmap, Status::Ready);
        texture.shared.needs_update.store(true, Ordering::Release);
        texture
    }

    fn with_state(width: u32, height: u32, bitmap: RgbaImage, status: Status) -> Self {
        Self {
            width,
            height,
            shared: Arc::new(Shared {
                state: Mutex::new(State { bitmap, status }),
                ready: Condvar::new(),
                needs_update: AtomicBool::new(false),
            }),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn wrap_s(&self) -> WrapMode {
        WrapMode::Repeat
    }

    #[inline]
    pub fn wrap_t(&self) -> WrapMode {
        WrapMode::Repeat
    }

    /// Whether the rendered pixels are in
    pub fn is_ready(&self) -> bool {
        self.lock().status == Status::Ready
    }

    /// Whether new pixels arrived that the consumer has not picked up yet
    pub fn needs_update(&self) -> bool {
        self.shared.needs_update.load(Ordering::Acquire)
    }

    /// Clear the update flag, returning whether it was set
    pub fn take_update(&self) -> bool {
        self.shared.needs_update.swap(false, Ordering::AcqRel)
    }

    /// Copy of the current pixels
    pub fn bitmap(&self) -> RgbaImage {
        self.lock().bitmap.clone()
    }

    /// Block until the build finishes
    ///
    /// # Errors
    ///
    /// Returns the rasterization error if the build failed; the texture then
    /// keeps its blank pixels.
    pub fn wait_ready(&self) -> Result<()> {
        let state = self
            .shared
            .ready
            .wait_while(self.lock(), |state| state.status == Status::Pending)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match &state.status {
            Status::Failed(err) => Err(err.clone()),
            _ => Ok(()),
        }
    }

    /// Bilinear lookup with repeat wrapping, channels in [0, 1]
    ///
    /// `uv = (0, 0)` is the top-left corner of the bitmap.
    pub fn sample(&self, uv: DVec2) -> Vec4 {
        let state = self.lock();
        let bitmap = &state.bitmap;
        let (w, h) = (bitmap.width() as i64, bitmap.height() as i64);
        if w == 0 || h == 0 {
            return Vec4::ZERO;
        }

        let fx = uv.x * w as f64 - 0.5;
        let fy = uv.y * h as f64 - 0.5;
        let (x0, y0) = (fx.floor(), fy.floor());
        let (tx, ty) = ((fx - x0) as f32, (fy - y0) as f32);

        let texel = |x: i64, y: i64| -> Vec4 {
            let Rgba(px) = *bitmap.get_pixel(x.rem_euclid(w) as u32, y.rem_euclid(h) as u32);
            Vec4::new(px[0] as f32, px[1] as f32, px[2] as f32, px[3] as f32) / 255.0
        };
        let (x0, y0) = (x0 as i64, y0 as i64);
        let top = texel(x0, y0).lerp(texel(x0 + 1, y0), tx);
        let bottom = texel(x0, y0 + 1).lerp(texel(x0 + 1, y0 + 1), tx);
        top.lerp(bottom, ty)
    }

    /// Encode the current pixels as PNG
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.lock()
            .bitmap
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| CausticError::Io(format!("{}: {}", path.display(), e)))
    }

    /// Rasterize `mask` on the rayon pool and swap the result in
    pub(crate) fn spawn_render(&self, mask: PolygonMask, rasterizer: Arc<dyn MaskRasterizer>) {
        let texture = self.clone();
        rayon::spawn(move || {
            let result = rasterizer.rasterize(&mask);
            texture.finish(result);
        });
    }

    pub(crate) fn finish(&self, result: Result<RgbaImage>) {
        let result = result.and_then(|bitmap| {
            if bitmap.dimensions() != (self.width, self.height) {
                return Err(CausticError::RasterizationFailed(format!(
                    "rasterizer returned {:?}, expected {}x{}",
                    bitmap.dimensions(),
                    self.width,
                    self.height
                )));
            }
            Ok(bitmap)
        });

        let mut state = self.lock();
        match result {
            Ok(bitmap) => {
                state.bitmap = bitmap;
                state.status = Status::Ready;
                self.shared.needs_update.store(true, Ordering::Release);
            }
            Err(err) => {
                warn!("[Caustics] rasterization failed, keeping blank texture: {}", err);
                state.status = Status::Failed(err);
            }
        }
        drop(state);
        self.shared.ready.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
