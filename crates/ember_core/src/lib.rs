//! Ember Core - asset loading for the path tracer.
//!
//! This crate provides the collaborators the renderer consumes as plain data:
//!
//! - **Meshes**: Wavefront OBJ files flattened into positions and triangle indices
//! - **Textures**: image files decoded into a linear RGB pixel grid addressable by `(u, v)`
//!
//! # Example
//!
//! ```ignore
//! use ember_core::{load_obj, ImageData};
//!
//! let mesh = load_obj("models/teapot.obj")?;
//! println!("Loaded {} triangles", mesh.triangle_count());
//!
//! let earth = ImageData::load("images/earthmap.jpg")?;
//! let color = earth.sample(0.5, 0.5);
//! ```

pub mod mesh;
pub mod texture;

// Re-export commonly used types
pub use mesh::{load_obj, Mesh, MeshError, MeshResult};
pub use texture::{ImageData, TextureError, TextureResult};
