//! Homogeneous participating medium (smoke, fog, water volume).

use std::sync::Arc;

use ember_math::{Aabb, Color, Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};
use crate::material::Isotropic;
use crate::sampling::gen_f64;
use crate::texture::Texture;

/// Offset past the entry point when searching for the exit point.
const EXIT_EPSILON: f64 = 0.0001;

/// A volume of constant density bounded by a closed surface.
///
/// A ray scatters inside with probability `1 - exp(-density * length)`; the
/// boundary must be convex for the entry/exit pair to be meaningful.
pub struct ConstantMedium<H: ?Sized = dyn Hittable> {
    boundary: Arc<H>,
    neg_inv_density: f64,
    phase_function: Isotropic,
}

impl<H: ?Sized> ConstantMedium<H> {
    pub fn new(boundary: Arc<H>, density: f64, albedo: Arc<dyn Texture>) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function: Isotropic::new(albedo),
        }
    }

    pub fn from_color(boundary: Arc<H>, density: f64, color: Color) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function: Isotropic::from_color(color),
        }
    }
}

impl<H: Hittable + ?Sized> Hittable for ConstantMedium<H> {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let entry = self.boundary.hit(ray, Interval::UNIVERSE, rng)?;
        let exit = self
            .boundary
            .hit(ray, Interval::new(entry.t + EXIT_EPSILON, f64::INFINITY), rng)?;

        let t_exit = exit.t.min(ray_t.max);
        let t_entry = entry.t.max(ray_t.min);
        if t_entry >= t_exit {
            return None;
        }
        let t_entry = t_entry.max(0.0);

        let ray_length = ray.direction().length();
        let distance_inside_boundary = (t_exit - t_entry) * ray_length;
        let hit_distance = self.neg_inv_density * gen_f64(rng).ln();
        if hit_distance > distance_inside_boundary {
            return None;
        }

        let t = t_entry + hit_distance / ray_length;
        if !ray_t.accepts(t) {
            return None;
        }

        Some(HitRecord {
            p: ray.at(t),
            // Arbitrary: the phase function ignores the normal.
            normal: Vec3::X,
            material: &self.phase_function,
            t,
            u: 0.0,
            v: 0.0,
            front_face: true,
        })
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        self.boundary.bounding_box(time0, time1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cuboid::Cuboid;
    use crate::material::Lambertian;
    use crate::sphere::Sphere;
    use ember_math::Point3;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn boundary() -> Arc<Sphere> {
        Arc::new(Sphere::new(
            Point3::ZERO,
            1.0,
            Arc::new(Lambertian::from_color(Color::ONE)),
        ))
    }

    #[test]
    fn test_dense_medium_scatters_inside() {
        let medium = ConstantMedium::from_color(boundary(), 1e6, Color::ONE);
        let ray = Ray::new_simple(Point3::new(0.0, 0.0, -5.0), Vec3::Z);
        let mut rng = StdRng::seed_from_u64(1);

        let rec = medium
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .unwrap();
        assert!(rec.t >= 4.0 && rec.t < 4.01);
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::X);
    }

    #[test]
    fn test_thin_medium_mostly_transparent() {
        let medium = ConstantMedium::from_color(boundary(), 1e-6, Color::ONE);
        let ray = Ray::new_simple(Point3::new(0.0, 0.0, -5.0), Vec3::Z);
        let mut rng = StdRng::seed_from_u64(2);

        let hits = (0..1000)
            .filter(|_| {
                medium
                    .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
                    .is_some()
            })
            .count();
        assert!(hits < 5);
    }

    #[test]
    fn test_ray_starting_inside() {
        let medium = ConstantMedium::from_color(boundary(), 1e6, Color::ONE);
        let ray = Ray::new_simple(Point3::ZERO, Vec3::Z);
        let mut rng = StdRng::seed_from_u64(3);

        let rec = medium
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .unwrap();
        assert!(rec.t >= 0.001 && rec.t < 0.02);
    }

    #[test]
    fn test_scatter_at_range_start_rejected() {
        // A generator stuck near 1 puts the scatter point on `ray_t.min`.
        let medium = ConstantMedium::from_color(boundary(), 1e300, Color::ONE);
        let ray = Ray::new_simple(Point3::ZERO, Vec3::Z);
        let mut rng = StepRng::new(u64::MAX, 0);

        assert!(medium
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .is_none());
    }

    #[test]
    fn test_miss_and_range() {
        let medium = ConstantMedium::from_color(boundary(), 1e6, Color::ONE);
        let mut rng = StdRng::seed_from_u64(4);

        let away = Ray::new_simple(Point3::new(0.0, 5.0, -5.0), Vec3::Z);
        assert!(medium
            .hit(&away, Interval::new(0.001, f64::INFINITY), &mut rng)
            .is_none());

        // Query range ends before the medium starts.
        let toward = Ray::new_simple(Point3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!(medium.hit(&toward, Interval::new(0.001, 3.0), &mut rng).is_none());
    }

    #[test]
    fn test_bounding_box_is_boundary_box() {
        let cube = Arc::new(Cuboid::new(
            Point3::ZERO,
            Point3::splat(2.0),
            Arc::new(Lambertian::from_color(Color::ONE)),
        ));
        let medium = ConstantMedium::from_color(cube.clone(), 0.5, Color::ZERO);
        assert_eq!(medium.bounding_box(0.0, 1.0), cube.bounding_box(0.0, 1.0));
    }
}
