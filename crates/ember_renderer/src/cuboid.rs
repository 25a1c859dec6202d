//! Axis-aligned box built from six rectangles.

use std::sync::Arc;

use ember_math::{Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;

use crate::aarect::{XyRect, XzRect, YzRect};
use crate::hittable::{HitRecord, Hittable, Samplable, SamplableList};
use crate::material::Material;

/// Axis-aligned box between two corners, all faces sharing one material.
pub struct Cuboid {
    box_min: Point3,
    box_max: Point3,
    sides: SamplableList,
}

impl Cuboid {
    /// Create a box spanning the two corner points (in any order).
    pub fn new(p0: Point3, p1: Point3, material: Arc<dyn Material>) -> Self {
        let box_min = p0.min(p1);
        let box_max = p0.max(p1);
        let (min, max) = (box_min, box_max);

        let mut sides = SamplableList::new();
        sides.add(Arc::new(XyRect::new(min.x, max.x, min.y, max.y, max.z, material.clone())));
        sides.add(Arc::new(XyRect::new(min.x, max.x, min.y, max.y, min.z, material.clone())));
        sides.add(Arc::new(XzRect::new(min.x, max.x, min.z, max.z, max.y, material.clone())));
        sides.add(Arc::new(XzRect::new(min.x, max.x, min.z, max.z, min.y, material.clone())));
        sides.add(Arc::new(YzRect::new(min.y, max.y, min.z, max.z, max.x, material.clone())));
        sides.add(Arc::new(YzRect::new(min.y, max.y, min.z, max.z, min.x, material)));

        Self {
            box_min,
            box_max,
            sides,
        }
    }

    pub fn min(&self) -> Point3 {
        self.box_min
    }

    pub fn max(&self) -> Point3 {
        self.box_max
    }
}

impl Hittable for Cuboid {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        self.sides.hit(ray, ray_t, rng)
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        Some(Aabb::from_points(self.box_min, self.box_max))
    }
}

impl Samplable for Cuboid {
    fn pdf_value(&self, origin: Point3, direction: Vec3) -> f64 {
        self.sides.pdf_value(origin, direction)
    }

    fn random(&self, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        self.sides.random(origin, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use ember_math::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_box() -> Cuboid {
        Cuboid::new(
            Point3::ONE,
            Point3::ZERO,
            Arc::new(Lambertian::from_color(Color::splat(0.5))),
        )
    }

    #[test]
    fn test_corners_are_normalized() {
        let cuboid = unit_box();
        assert_eq!(cuboid.min(), Point3::ZERO);
        assert_eq!(cuboid.max(), Point3::ONE);
    }

    #[test]
    fn test_hit_nearest_face() {
        let cuboid = unit_box();
        let ray = Ray::new_simple(Point3::new(0.5, 0.5, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(0);

        let rec = cuboid
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 4.0).abs() < 1e-12);
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_hit_from_inside() {
        let cuboid = unit_box();
        let ray = Ray::new_simple(Point3::splat(0.5), Vec3::new(1.0, 0.0, 0.0));
        let mut rng = StdRng::seed_from_u64(0);

        let rec = cuboid
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 0.5).abs() < 1e-12);
        assert!(!rec.front_face);
    }

    #[test]
    fn test_pdf_value_averages_crossed_faces() {
        let cuboid = unit_box();
        let gray: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::splat(0.5)));
        let near = XyRect::new(0.0, 1.0, 0.0, 1.0, 1.0, gray.clone());
        let far = XyRect::new(0.0, 1.0, 0.0, 1.0, 0.0, gray);

        let origin = Point3::new(0.5, 0.5, 5.0);
        let direction = Vec3::new(0.05, -0.05, -1.0);

        // The ray enters through z = 1 and leaves through z = 0; the other
        // four sides contribute nothing.
        let expected = (near.pdf_value(origin, direction) + far.pdf_value(origin, direction)) / 6.0;
        assert!(expected > 0.0);
        assert!((cuboid.pdf_value(origin, direction) - expected).abs() < 1e-12);

        assert_eq!(cuboid.pdf_value(origin, Vec3::Z), 0.0);
    }

    #[test]
    fn test_random_directions_hit_box() {
        let cuboid = unit_box();
        let origin = Point3::new(3.0, 2.5, -4.0);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..200 {
            let direction = cuboid.random(origin, &mut rng);
            let ray = Ray::new_simple(origin, direction);
            assert!(cuboid
                .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
                .is_some());
            assert!(cuboid.pdf_value(origin, direction) > 0.0);
        }
    }

    #[test]
    fn test_bounding_box() {
        let bbox = unit_box().bounding_box(0.0, 1.0).unwrap();
        assert_eq!(bbox.min(), Point3::ZERO);
        assert_eq!(bbox.max(), Point3::ONE);
    }
}
