//! Segment extraction pipeline

use crate::config::VisionConfig;
use crate::error::VisionError;
use crate::model::{MaskGenerator, RawMask, SharedGenerator};
use crate::processing::{color, contour, geometry};
use crate::types::{Palette, Segment};
use image::RgbImage;
use std::sync::Arc;
use tracing::{debug, info};

/// Segments plus the image-level palette from one pipeline run.
#[derive(Debug, Clone)]
pub struct ImageAnalysis {
    pub segments: Vec<Segment>,
    pub palette: Palette,
}

/// Build validated segments from raw model masks.
///
/// Fails only when the image has zero area. Masks below the relative-area
/// threshold, and masks whose boundaries collapse to degenerate geometry,
/// are skipped without error. IDs are assigned in polygon emission order,
/// starting at 1; one mask with several connected components yields one
/// segment per component, all sharing the mask's color, area and score.
pub fn build_segments(
    image: &RgbImage,
    masks: &[RawMask],
    min_relative_area: f64,
) -> Result<Vec<Segment>, VisionError> {
    build_with_ratio(image, masks, min_relative_area, geometry::DEFAULT_SIMPLIFY_RATIO)
}

pub(crate) fn build_with_ratio(
    image: &RgbImage,
    masks: &[RawMask],
    min_relative_area: f64,
    simplify_ratio: f64,
) -> Result<Vec<Segment>, VisionError> {
    let (width, height) = image.dimensions();
    let total_area = width as u64 * height as u64;
    if total_area == 0 {
        return Err(VisionError::InvalidImage(
            "Image has zero area".to_string(),
        ));
    }

    let mut segments = Vec::new();
    let mut next_id: u32 = 1;

    for mask in masks {
        if mask.width() != width || mask.height() != height {
            return Err(VisionError::Segmentation(format!(
                "Mask raster is {}x{} but the image is {}x{}",
                mask.width(),
                mask.height(),
                width,
                height
            )));
        }

        if !mask.covers_minimum_area(total_area, min_relative_area) {
            debug!(
                "Skipping mask covering {} of {} pixels (threshold {:.3})",
                mask.area, total_area, min_relative_area
            );
            continue;
        }

        let boundaries = contour::extract_boundaries(mask, simplify_ratio);
        if boundaries.is_empty() {
            continue;
        }

        // One color sample and one area ratio per mask; the retention
        // decision and the reported area use the same raw pixel count.
        let mask_color = color::mean_mask_color(image, mask)?;
        let area = mask.area as f64 / total_area as f64;

        for boundary in boundaries {
            if let Some(polygon) = geometry::normalize_boundary(&boundary, width, height) {
                segments.push(Segment::new(
                    next_id,
                    mask_color.clone(),
                    area,
                    polygon,
                    mask.predicted_iou,
                ));
                next_id += 1;
            }
        }
    }

    info!("Built {} segments from {} raw masks", segments.len(), masks.len());
    Ok(segments)
}

/// Mask-to-vector pipeline with an injected segmentation model.
///
/// The generator is passed in explicitly and shared behind a lock; the
/// pipeline itself holds no global state.
pub struct SegmentationPipeline<G> {
    config: VisionConfig,
    generator: Arc<SharedGenerator<G>>,
}

impl<G: MaskGenerator> SegmentationPipeline<G> {
    /// Create a pipeline. The configuration is validated up front.
    pub fn new(
        config: VisionConfig,
        generator: Arc<SharedGenerator<G>>,
    ) -> Result<Self, VisionError> {
        config.validate().map_err(VisionError::Config)?;
        Ok(Self { config, generator })
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    /// Run the model over `image` and post-process its masks into segments
    /// and a dominant-color palette.
    pub fn analyze(&self, image: &RgbImage) -> Result<ImageAnalysis, VisionError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(VisionError::InvalidImage(
                "Image has zero area".to_string(),
            ));
        }

        debug!("Generating masks for {}x{} image", width, height);
        let masks = self.generator.generate(image)?;
        info!("Model produced {} candidate masks", masks.len());

        let segments = build_with_ratio(
            image,
            &masks,
            self.config.min_relative_area,
            self.config.simplify_ratio,
        )?;
        let palette = color::extract_palette(image, self.config.palette_size)?;

        Ok(ImageAnalysis { segments, palette })
    }
}
