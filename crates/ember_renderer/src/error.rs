//! Error types for scene construction and rendering.

use thiserror::Error;

/// Errors that can occur while building acceleration structures or rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A primitive reported no bounding box where one is required.
    #[error("object {index} has no bounding box and cannot be placed in a BVH")]
    MissingBoundingBox { index: usize },

    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Mesh import failed: {0}")]
    Mesh(#[from] ember_core::MeshError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;
