//! Errors raised while building acceleration structures or reading images.

use thiserror::Error;

/// Errors that can occur in the renderer.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot build a BVH over an empty object list")]
    EmptyBvh,

    #[error("Object {index} has no finite bounding box and cannot be placed in a BVH")]
    MissingBoundingBox { index: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("No images to average")]
    NoImages,

    #[error("Image resolution mismatch: expected {expected_width}x{expected_height}, got {width}x{height}")]
    ResolutionMismatch {
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },
}

pub type RenderResult<T> = Result<T, RenderError>;
