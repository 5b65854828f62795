//! Boundary to the external segmentation model
//!
//! The model itself is a black box owned by the caller. It is expensive to
//! initialize, stateful, and not safe to call reentrantly, so shared use goes
//! through [`SharedGenerator`], which serializes access and releases any
//! device-side cache after every run.

use crate::error::VisionError;
use image::{GrayImage, Luma, RgbImage};
use parking_lot::Mutex;
use tracing::debug;

/// Raw binary mask emitted by the external model.
#[derive(Debug, Clone)]
pub struct RawMask {
    pixels: Vec<bool>,
    width: u32,
    height: u32,
    /// Model-reported mask quality, nominally in [0, 1]
    pub predicted_iou: f32,
    /// Count of set pixels, precomputed by the model
    pub area: u64,
}

impl RawMask {
    /// Wrap a model-produced raster with its reported score and pixel area.
    pub fn new(
        pixels: Vec<bool>,
        width: u32,
        height: u32,
        predicted_iou: f32,
        area: u64,
    ) -> Result<Self, VisionError> {
        if pixels.len() != width as usize * height as usize {
            return Err(VisionError::Segmentation(format!(
                "Mask buffer holds {} pixels for a {}x{} raster",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            pixels,
            width,
            height,
            predicted_iou,
            area,
        })
    }

    /// Build a mask from a raster alone, counting the set pixels.
    pub fn from_pixels(
        pixels: Vec<bool>,
        width: u32,
        height: u32,
        predicted_iou: f32,
    ) -> Result<Self, VisionError> {
        let area = pixels.iter().filter(|set| **set).count() as u64;
        Self::new(pixels, width, height, predicted_iou, area)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at (x, y) belongs to the mask.
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.pixels[(y * self.width + x) as usize]
    }

    /// Whether the mask covers at least `min_relative_area` of `total_area`
    /// pixels. Evaluated before any contour work.
    pub fn covers_minimum_area(&self, total_area: u64, min_relative_area: f64) -> bool {
        self.area as f64 >= total_area as f64 * min_relative_area
    }

    /// Render the mask as an 8-bit raster for contour tracing.
    pub(crate) fn to_gray(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            if self.is_set(x, y) {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }
}

/// Produces candidate masks for an image.
///
/// Implementations wrap the external segmentation model. The trait is the
/// injection point: pipelines receive a generator instead of reaching for
/// process-wide state.
pub trait MaskGenerator: Send {
    /// Run the model over `image` and return its candidate masks.
    fn generate(&mut self, image: &RgbImage) -> Result<Vec<RawMask>, VisionError>;

    /// Drop any device-side cache accumulated during the last run.
    ///
    /// Called after every [`generate`](Self::generate), whether it succeeded
    /// or failed. The default is a no-op for models with nothing to release.
    fn release_cache(&mut self) {}
}

/// Serializes access to a shared [`MaskGenerator`].
pub struct SharedGenerator<G> {
    inner: Mutex<G>,
}

impl<G: MaskGenerator> SharedGenerator<G> {
    pub fn new(generator: G) -> Self {
        Self {
            inner: Mutex::new(generator),
        }
    }

    /// Run one generate call under the lock. The model cache is released
    /// before the lock is handed to the next caller, on success and on
    /// failure alike.
    pub fn generate(&self, image: &RgbImage) -> Result<Vec<RawMask>, VisionError> {
        let mut generator = self.inner.lock();
        debug!("Acquired model lock for mask generation");
        let result = generator.generate(image);
        generator.release_cache();
        result
    }
}
