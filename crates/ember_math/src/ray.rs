use crate::{Point3, Vec3};

/// A ray in 3D space with origin, direction, and time.
///
/// The direction is not required to be unit length. `time` lies in the
/// camera shutter interval and drives motion blur.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Point3,
    direction: Vec3,
    time: f64,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub fn new(origin: Point3, direction: Vec3, time: f64) -> Self {
        Self {
            origin,
            direction,
            time,
        }
    }

    /// Create a ray at time 0.
    #[inline]
    pub fn new_simple(origin: Point3, direction: Vec3) -> Self {
        Self::new(origin, direction, 0.0)
    }

    #[inline]
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Time value of the ray (used for motion blur).
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction
    }
}
