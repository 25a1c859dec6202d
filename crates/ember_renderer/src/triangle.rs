//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use ember_math::{Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable, Samplable};
use crate::material::Material;
use crate::sampling::gen_f64;

/// Bounding box padding so axis-aligned triangles keep some depth.
const BOX_EPSILON: f64 = 1e-6;

/// A triangle primitive.
///
/// Vertices are counter-clockwise when seen from the front face.
pub struct Triangle {
    vertices: [Point3; 3],
    /// Edges from vertex 0
    edge1: Vec3,
    edge2: Vec3,
    /// Pre-computed face normal (unit length)
    normal: Vec3,
    area: f64,
    material: Arc<dyn Material>,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Point3, v1: Point3, v2: Point3, material: Arc<dyn Material>) -> Self {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let cross = edge1.cross(edge2);

        Self {
            vertices: [v0, v1, v2],
            edge1,
            edge2,
            normal: cross.normalize_or_zero(),
            area: 0.5 * cross.length(),
            material,
        }
    }

    pub fn vertices(&self) -> &[Point3; 3] {
        &self.vertices
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    /// Möller-Trumbore intersection returning `(t, u, v)`.
    fn solve(&self, ray: &Ray, ray_t: Interval) -> Option<(f64, f64, f64)> {
        let h = ray.direction().cross(self.edge2);
        let a = self.edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-8 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.vertices[0];
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(self.edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * self.edge2.dot(q);
        if !ray_t.accepts(t) {
            return None;
        }

        Some((t, u, v))
    }
}

impl Hittable for Triangle {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let (t, u, v) = self.solve(ray, ray_t)?;
        Some(HitRecord::new(ray, t, self.normal, self.material.as_ref(), (u, v)))
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        let [v0, v1, v2] = self.vertices;
        let min = v0.min(v1).min(v2);
        let max = v0.max(v1).max(v2);
        let eps = Vec3::splat(BOX_EPSILON);
        Some(Aabb::from_points(min - eps, max + eps))
    }
}

impl Samplable for Triangle {
    fn pdf_value(&self, origin: Point3, direction: Vec3) -> f64 {
        let ray = Ray::new_simple(origin, direction);
        let Some((t, _, _)) = self.solve(&ray, Interval::new(0.001, f64::INFINITY)) else {
            return 0.0;
        };

        let distance_squared = t * t * direction.length_squared();
        let cosine = (direction.dot(self.normal) / direction.length()).abs();
        distance_squared / (cosine * self.area)
    }

    fn random(&self, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        // Sample the parallelogram and fold the far half back into the triangle.
        let mut r1 = gen_f64(rng);
        let mut r2 = gen_f64(rng);
        if r1 + r2 > 1.0 {
            r1 = 1.0 - r1;
            r2 = 1.0 - r2;
        }
        self.vertices[0] + r1 * self.edge1 + r2 * self.edge2 - origin
    }
}
