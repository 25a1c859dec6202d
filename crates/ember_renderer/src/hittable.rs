//! Hittable and Samplable traits, HitRecord, and HittableList.

use std::sync::Arc;

use ember_math::{Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;

use crate::material::Material;

/// Record of a ray-object intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Point3,
    /// Surface normal at intersection (always points against the ray)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// Parameter t where the intersection occurs
    pub t: f64,
    /// Surface coordinates
    pub u: f64,
    pub v: f64,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record and orient its normal against `ray`.
    pub fn new(
        ray: &Ray,
        t: f64,
        outward_normal: Vec3,
        material: &'a dyn Material,
        (u, v): (f64, f64),
    ) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            material,
            t,
            u,
            v,
            front_face: true,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The stored normal always points against the ray, so `front_face`
    /// remembers which side was hit.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `t` in `(ray_t.min, ray_t.max]`.
    ///
    /// `rng` is only consumed by stochastic geometry such as participating
    /// media.
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>>;

    /// Box enclosing the object over the shutter interval, if it is bounded.
    fn bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb>;
}

/// Objects that can be sampled as direct light targets.
pub trait Samplable: Hittable {
    /// Solid-angle density of sampling `direction` from `origin`.
    fn pdf_value(&self, origin: Point3, direction: Vec3) -> f64;

    /// Random direction from `origin` towards the object.
    fn random(&self, origin: Point3, rng: &mut dyn RngCore) -> Vec3;
}

/// A list of shared objects.
///
/// `HittableList<dyn Samplable>` (see [`SamplableList`]) is itself
/// samplable, which is how several lights are sampled as one target.
pub struct HittableList<H: ?Sized = dyn Hittable> {
    objects: Vec<Arc<H>>,
}

/// A list whose members can all be sampled.
pub type SamplableList = HittableList<dyn Samplable>;

impl<H: ?Sized> HittableList<H> {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Arc<H>) {
        self.objects.push(object);
    }

    /// Clear all objects from the list.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn objects(&self) -> &[Arc<H>] {
        &self.objects
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl<H: ?Sized> Default for HittableList<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized> Clone for HittableList<H> {
    fn clone(&self) -> Self {
        Self {
            objects: self.objects.clone(),
        }
    }
}

impl<H: Hittable + ?Sized> Hittable for HittableList<H> {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            if let Some(rec) = object.hit(ray, Interval::new(ray_t.min, closest_so_far), rng) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        let mut objects = self.objects.iter();
        let first = objects.next()?.bounding_box(time0, time1)?;
        objects.try_fold(first, |acc, object| {
            object
                .bounding_box(time0, time1)
                .map(|bbox| Aabb::surrounding(&acc, &bbox))
        })
    }
}

impl<H: Samplable + ?Sized> Samplable for HittableList<H> {
    fn pdf_value(&self, origin: Point3, direction: Vec3) -> f64 {
        if self.objects.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .objects
            .iter()
            .map(|object| object.pdf_value(origin, direction))
            .sum();
        sum / self.objects.len() as f64
    }

    /// Direction towards a uniformly chosen member.
    ///
    /// An empty list has nothing to aim at: callers must check
    /// [`HittableList::is_empty`] first. Release builds return `Vec3::X`.
    fn random(&self, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        debug_assert!(!self.objects.is_empty(), "sampling an empty list");
        if self.objects.is_empty() {
            return Vec3::X;
        }
        let index = (crate::sampling::gen_f64(rng) * self.objects.len() as f64) as usize;
        self.objects[index.min(self.objects.len() - 1)].random(origin, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use crate::sphere::Sphere;
    use ember_math::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sphere(center: Point3, radius: f64) -> Arc<Sphere> {
        Arc::new(Sphere::new(
            center,
            radius,
            Arc::new(Lambertian::from_color(Color::splat(0.5))),
        ))
    }

    #[test]
    fn test_list_returns_nearest() {
        let mut list: HittableList = HittableList::new();
        list.add(sphere(Point3::new(0.0, 0.0, -5.0), 1.0));
        list.add(sphere(Point3::new(0.0, 0.0, -2.0), 0.5));

        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new_simple(Point3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = list.hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng).unwrap();
        assert!((rec.t - 1.5).abs() < 1e-9);
        assert!(rec.front_face);
    }

    #[test]
    fn test_list_bounding_box() {
        let mut list: HittableList = HittableList::new();
        assert!(list.bounding_box(0.0, 1.0).is_none());

        list.add(sphere(Point3::new(-2.0, 0.0, 0.0), 1.0));
        list.add(sphere(Point3::new(3.0, 0.0, 0.0), 1.0));
        let bbox = list.bounding_box(0.0, 1.0).unwrap();
        assert_eq!(bbox.min().x, -3.0);
        assert_eq!(bbox.max().x, 4.0);
    }

    #[test]
    fn test_samplable_list_averages() {
        let light = sphere(Point3::new(0.0, 0.0, -4.0), 1.0);
        let origin = Point3::ZERO;
        let direction = Vec3::new(0.0, 0.0, -1.0);
        let single = light.pdf_value(origin, direction);

        let mut lights = SamplableList::new();
        lights.add(light);
        lights.add(sphere(Point3::new(0.0, 10.0, 0.0), 1.0));

        // Second light is not in this direction, so the average halves.
        assert!((lights.pdf_value(origin, direction) - single / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_samplable_list() {
        let lights = SamplableList::new();
        assert_eq!(lights.pdf_value(Point3::ZERO, Vec3::X), 0.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "sampling an empty list")]
    fn test_random_on_empty_list_asserts() {
        let lights = SamplableList::new();
        let mut rng = StdRng::seed_from_u64(0);
        lights.random(Point3::ZERO, &mut rng);
    }

    #[test]
    fn test_set_face_normal_back_face() {
        let material = Lambertian::from_color(Color::ONE);
        let ray = Ray::new_simple(Point3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        let rec = HitRecord::new(&ray, 1.0, Vec3::new(0.0, 0.0, 1.0), &material, (0.0, 0.0));
        assert!(!rec.front_face);
        assert_eq!(rec.normal, Vec3::new(0.0, 0.0, -1.0));
    }
}
