//! Mask post-processing pipelines

pub mod color;
pub mod contour;
pub mod geometry;
pub mod segmentation;

pub use color::extract_palette;
pub use segmentation::{build_segments, ImageAnalysis, SegmentationPipeline};
