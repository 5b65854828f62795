//! Error types for tessella-vision

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Segmentation failed: {0}")]
    Segmentation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
