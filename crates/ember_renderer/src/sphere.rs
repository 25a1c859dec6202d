//! Sphere primitive, optionally moving linearly during the shutter interval.

use std::f64::consts::PI;
use std::sync::Arc;

use ember_math::{Aabb, Interval, Onb, Point3, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable, Samplable};
use crate::material::Material;
use crate::sampling::{cone_one_minus_cos, random_to_sphere};

/// A sphere primitive.
pub struct Sphere {
    center0: Point3,
    center1: Point3,
    time0: f64,
    time1: f64,
    radius: f64,
    material: Arc<dyn Material>,
}

impl Sphere {
    /// Create a stationary sphere.
    pub fn new(center: Point3, radius: f64, material: Arc<dyn Material>) -> Self {
        Self::moving(center, center, 0.0, 1.0, radius, material)
    }

    /// Create a sphere whose center moves from `center0` at `time0` to
    /// `center1` at `time1`.
    ///
    /// Negative radii are clamped to zero and a zero-radius sphere is never
    /// hit. Wrap the sphere in `FlipFace` for inward-facing normals.
    pub fn moving(
        center0: Point3,
        center1: Point3,
        time0: f64,
        time1: f64,
        radius: f64,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            center0,
            center1,
            time0,
            time1,
            radius: radius.max(0.0),
            material,
        }
    }

    /// Center at `time`, linearly interpolated.
    pub fn center(&self, time: f64) -> Point3 {
        if self.time1 == self.time0 {
            return self.center0;
        }
        let s = (time - self.time0) / (self.time1 - self.time0);
        self.center0 + s * (self.center1 - self.center0)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Nearest root of the ray/sphere quadratic in `ray_t`.
    fn solve(&self, ray: &Ray, ray_t: Interval, center: Point3) -> Option<f64> {
        if self.radius == 0.0 {
            return None;
        }

        let oc = center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        [(h - sqrtd) / a, (h + sqrtd) / a]
            .into_iter()
            .find(|&root| ray_t.accepts(root))
    }

    /// UV coordinates for a point on the unit sphere centered at the origin.
    fn get_sphere_uv(p: Vec3) -> (f64, f64) {
        // theta: angle down from +Y, phi: angle around Y from -X
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let center = self.center(ray.time());
        let t = self.solve(ray, ray_t, center)?;

        let outward_normal = (ray.at(t) - center) / self.radius;
        let uv = Self::get_sphere_uv(outward_normal);
        Some(HitRecord::new(ray, t, outward_normal, self.material.as_ref(), uv))
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        let rvec = Vec3::splat(self.radius);
        let c0 = self.center(time0);
        let c1 = self.center(time1);
        let box0 = Aabb::from_points(c0 - rvec, c0 + rvec);
        let box1 = Aabb::from_points(c1 - rvec, c1 + rvec);
        Some(Aabb::surrounding(&box0, &box1))
    }
}

// Light sampling uses the sphere's position at time0.
impl Samplable for Sphere {
    fn pdf_value(&self, origin: Point3, direction: Vec3) -> f64 {
        let ray = Ray::new_simple(origin, direction);
        if self
            .solve(&ray, Interval::new(0.001, f64::INFINITY), self.center0)
            .is_none()
        {
            return 0.0;
        }

        let distance_squared = (self.center0 - origin).length_squared();
        let solid_angle = 2.0 * PI * cone_one_minus_cos(self.radius, distance_squared);
        1.0 / solid_angle
    }

    fn random(&self, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        let direction = self.center0 - origin;
        let distance_squared = direction.length_squared();
        Onb::from_w(direction).local(random_to_sphere(self.radius, distance_squared, rng))
    }
}
