//! Ember math - geometric kernel for the path tracer.
//!
//! Everything is double precision: light-sampling densities of small, distant
//! objects must agree to 1e-6 across transforms, which `f32` cannot deliver.

// Re-export glam for convenience
pub use glam::DVec3;

mod aabb;
mod interval;
mod onb;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;

/// 3D vector.
pub type Vec3 = DVec3;
/// A position in world or object space.
pub type Point3 = DVec3;
/// Linear RGB color (components usually in [0, 1], lights go above).
pub type Color = DVec3;

/// Convert degrees to radians.
#[inline]
pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

/// True if every component is within `1e-8` of zero.
#[inline]
pub fn near_zero(v: Vec3) -> bool {
    const S: f64 = 1e-8;
    v.x.abs() < S && v.y.abs() < S && v.z.abs() < S
}
