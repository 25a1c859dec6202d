//! Ember Renderer - CPU Monte Carlo path tracing
//!
//! A physically based path tracer: spheres, axis-aligned rectangles, boxes
//! and triangle meshes, instanced through translation and rotation, with
//! participating media, a BVH over everything, and light importance sampling
//! mixed with each material's own scattering density.
//!
//! Rendering is deterministic for a given [`RenderConfig::seed`] regardless
//! of thread count.

mod aarect;
mod bvh;
mod camera;
mod constant_medium;
mod cuboid;
mod error;
mod hittable;
mod integrator;
mod material;
mod mesh;
mod pdf;
mod renderer;
pub mod sampling;
mod scene;
mod sphere;
mod texture;
mod timing;
mod transform;
mod triangle;

pub use aarect::{AaRect, XyRect, XzRect, YzRect};
pub use bvh::BvhNode;
pub use camera::Camera;
pub use constant_medium::ConstantMedium;
pub use cuboid::Cuboid;
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList, Samplable, SamplableList};
pub use integrator::ray_color;
pub use material::{
    reflect, refract, Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal,
    ScatterRecord,
};
pub use mesh::{mesh_triangles, triangle_mesh};
pub use pdf::{CosinePdf, HittablePdf, MixturePdf, Pdf};
pub use renderer::{
    color_to_rgb, linear_to_gamma, partition_rows, render, render_pixel, render_with_progress,
    ImageBuffer, PixelEstimate, RenderConfig, RenderOutput, RenderStats, RenderView,
};
pub use scene::Scene;
pub use sphere::Sphere;
pub use texture::{CheckerTexture, ImageTexture, SolidColor, Texture, MISSING_TEXTURE_COLOR};
pub use timing::{Stopwatch, TimingEntry, Timings};
pub use transform::{FlipFace, RotateY, Translate};
pub use triangle::Triangle;

/// Re-export the math types the public API is written in
pub use ember_math::{Aabb, Color, Interval, Point3, Ray, Vec3};
