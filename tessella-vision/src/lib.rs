//! tessella-vision: mask-to-vector post-processing for image segmentation
//!
//! Converts raw binary masks from an external segmentation model into
//! normalized, colored polygon segments, extracts a dominant-color palette
//! for the whole image, and renders debug overlays for human inspection.
//!
//! The model itself is injected through the [`MaskGenerator`] trait; this
//! crate owns everything that happens after the masks exist.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod model;
pub mod processing;
pub mod render;
pub mod types;

pub use artifacts::{evict_stale_artifacts, unique_artifact_path, DEFAULT_MAX_AGE_HOURS};
pub use config::VisionConfig;
pub use error::VisionError;
pub use model::{MaskGenerator, RawMask, SharedGenerator};
pub use processing::{build_segments, extract_palette, ImageAnalysis, SegmentationPipeline};
pub use render::{render_debug, RenderOptions};
pub use types::{NormalizedPoint, Palette, Polygon, Segment};
