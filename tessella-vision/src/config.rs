//! Configuration for tessella-vision

use crate::artifacts::DEFAULT_MAX_AGE_HOURS;
use crate::processing::geometry::DEFAULT_SIMPLIFY_RATIO;
use serde::{Deserialize, Serialize};

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Minimum mask area as a fraction of the total image area
    pub min_relative_area: f64,
    /// Number of dominant colors extracted per image
    pub palette_size: usize,
    /// Polygon simplification tolerance as a fraction of boundary perimeter
    pub simplify_ratio: f64,
    /// Age in hours after which debug artifacts are evicted
    pub artifact_max_age_hours: u64,
    /// Draw confidence scores next to segment IDs in debug renders
    pub label_scores: bool,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            min_relative_area: 0.01,
            palette_size: 3,
            simplify_ratio: DEFAULT_SIMPLIFY_RATIO,
            artifact_max_age_hours: DEFAULT_MAX_AGE_HOURS,
            label_scores: false,
        }
    }
}

impl VisionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.min_relative_area.is_finite()
            || self.min_relative_area < 0.0
            || self.min_relative_area >= 1.0
        {
            return Err("Minimum relative area must be in [0, 1)".to_string());
        }

        if self.palette_size == 0 || self.palette_size > 64 {
            return Err("Palette size must be between 1 and 64".to_string());
        }

        if !self.simplify_ratio.is_finite() || self.simplify_ratio < 0.0 || self.simplify_ratio >= 1.0
        {
            return Err("Simplify ratio must be in [0, 1)".to_string());
        }

        if self.artifact_max_age_hours == 0 || self.artifact_max_age_hours > 24 * 365 {
            return Err("Artifact max age must be between 1 hour and 1 year".to_string());
        }

        Ok(())
    }
}
