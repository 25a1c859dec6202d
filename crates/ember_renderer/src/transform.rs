//! Instance transforms: translation, rotation about Y, and face flipping.
//!
//! Each wrapper shares its inner object through an `Arc` and is samplable
//! whenever the inner object is.

use std::sync::Arc;

use ember_math::{degrees_to_radians, Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable, Samplable};

/// Moves an object by a fixed offset.
pub struct Translate<H: ?Sized = dyn Hittable> {
    inner: Arc<H>,
    offset: Vec3,
}

impl<H: ?Sized> Translate<H> {
    pub fn new(inner: Arc<H>, offset: Vec3) -> Self {
        Self { inner, offset }
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }
}

impl<H: Hittable + ?Sized> Hittable for Translate<H> {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let moved = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());

        // Direction is unchanged, so the face orientation carries over as is.
        self.inner.hit(&moved, ray_t, rng).map(|mut rec| {
            rec.p += self.offset;
            rec
        })
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        self.inner
            .bounding_box(time0, time1)
            .map(|bbox| bbox.translate(self.offset))
    }
}

impl<H: Samplable + ?Sized> Samplable for Translate<H> {
    fn pdf_value(&self, origin: Point3, direction: Vec3) -> f64 {
        self.inner.pdf_value(origin - self.offset, direction)
    }

    fn random(&self, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        self.inner.random(origin - self.offset, rng)
    }
}

/// Rotates an object about the Y axis.
pub struct RotateY<H: ?Sized = dyn Hittable> {
    inner: Arc<H>,
    sin_theta: f64,
    cos_theta: f64,
}

impl<H: ?Sized> RotateY<H> {
    /// Rotate by `angle` degrees (counter-clockwise looking down -Y).
    pub fn new(inner: Arc<H>, angle: f64) -> Self {
        let radians = degrees_to_radians(angle);
        Self {
            inner,
            sin_theta: radians.sin(),
            cos_theta: radians.cos(),
        }
    }

    /// Object space to world space.
    fn rotate(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x + self.sin_theta * v.z,
            v.y,
            -self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }

    /// World space to object space.
    fn counter_rotate(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x - self.sin_theta * v.z,
            v.y,
            self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }
}

impl<H: Hittable + ?Sized> Hittable for RotateY<H> {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let rotated = Ray::new(
            self.counter_rotate(ray.origin()),
            self.counter_rotate(ray.direction()),
            ray.time(),
        );

        // Rotation preserves dot products, so front_face stays valid.
        self.inner.hit(&rotated, ray_t, rng).map(|mut rec| {
            rec.p = self.rotate(rec.p);
            rec.normal = self.rotate(rec.normal);
            rec
        })
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        let bbox = self.inner.bounding_box(time0, time1)?;
        let corners = bbox.corners().map(|corner| self.rotate(corner));

        let (min, max) = corners.iter().fold(
            (Point3::splat(f64::INFINITY), Point3::splat(f64::NEG_INFINITY)),
            |(min, max), &c| (min.min(c), max.max(c)),
        );
        Some(Aabb::from_points(min, max))
    }
}

impl<H: Samplable + ?Sized> Samplable for RotateY<H> {
    fn pdf_value(&self, origin: Point3, direction: Vec3) -> f64 {
        self.inner
            .pdf_value(self.counter_rotate(origin), self.counter_rotate(direction))
    }

    fn random(&self, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        self.rotate(self.inner.random(self.counter_rotate(origin), rng))
    }
}

/// Swaps which side of a surface counts as the front face.
///
/// Used to turn one-sided lights around without touching their geometry.
pub struct FlipFace<H: ?Sized = dyn Hittable> {
    inner: Arc<H>,
}

impl<H: ?Sized> FlipFace<H> {
    pub fn new(inner: Arc<H>) -> Self {
        Self { inner }
    }
}

impl<H: Hittable + ?Sized> Hittable for FlipFace<H> {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        self.inner.hit(ray, ray_t, rng).map(|mut rec| {
            rec.front_face = !rec.front_face;
            rec
        })
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        self.inner.bounding_box(time0, time1)
    }
}

impl<H: Samplable + ?Sized> Samplable for FlipFace<H> {
    fn pdf_value(&self, origin: Point3, direction: Vec3) -> f64 {
        self.inner.pdf_value(origin, direction)
    }

    fn random(&self, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        self.inner.random(origin, rng)
    }
}
