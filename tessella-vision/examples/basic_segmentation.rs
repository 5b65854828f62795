//! Basic example of using tessella-vision
//!
//! Runs the pipeline over a synthetic three-band image with a stand-in mask
//! generator, prints the extracted segments and palette, and writes a debug
//! render next to the working directory.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use image::{Rgb, RgbImage};
use tessella_vision::{
    evict_stale_artifacts, render_debug, unique_artifact_path, MaskGenerator, RawMask,
    RenderOptions, SegmentationPipeline, SharedGenerator, VisionConfig, VisionError,
};

/// Stand-in for a real segmentation model: one mask per horizontal band.
struct BandGenerator;

impl MaskGenerator for BandGenerator {
    fn generate(&mut self, image: &RgbImage) -> Result<Vec<RawMask>, VisionError> {
        let (width, height) = image.dimensions();
        let band = height / 3;
        let mut masks = Vec::new();
        for i in 0..3u32 {
            let top = i * band;
            let bottom = if i == 2 { height } else { top + band };
            let mut pixels = vec![false; (width * height) as usize];
            for y in top..bottom {
                for x in 0..width {
                    pixels[(y * width + x) as usize] = true;
                }
            }
            masks.push(RawMask::from_pixels(pixels, width, height, 0.9)?);
        }
        Ok(masks)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let image = RgbImage::from_fn(120, 90, |_, y| {
        if y < 30 {
            Rgb([200, 60, 40])
        } else if y < 60 {
            Rgb([40, 160, 80])
        } else {
            Rgb([40, 80, 200])
        }
    });

    let generator = Arc::new(SharedGenerator::new(BandGenerator));
    let pipeline = SegmentationPipeline::new(VisionConfig::default(), generator)?;

    let analysis = pipeline.analyze(&image)?;
    println!("Found {} segments", analysis.segments.len());
    for segment in &analysis.segments {
        println!(
            "  #{}: color {} area {:.2} score {:.2} ({} vertices)",
            segment.id,
            segment.color,
            segment.area,
            segment.score,
            segment.polygon.len()
        );
    }
    println!("Palette: {:?}", analysis.palette.colors());

    let options = RenderOptions {
        label_scores: pipeline.config().label_scores,
    };
    let rendered = render_debug(&image, &analysis.segments, options);
    let path = unique_artifact_path(Path::new("bands.debug.png"));
    rendered.save(&path)?;
    println!("Debug render written to {}", path.display());

    let max_age = Duration::from_secs(pipeline.config().artifact_max_age_hours * 3600);
    let removed = evict_stale_artifacts(Path::new("."), "*.debug.png", max_age)?;
    if removed > 0 {
        println!("Evicted {} stale debug renders", removed);
    }

    Ok(())
}
