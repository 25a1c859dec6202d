//! Axis-aligned rectangles.
//!
//! One generic implementation covers the three orientations; `AXIS` is the
//! axis the rectangle is perpendicular to.

use std::sync::Arc;

use ember_math::{Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable, Samplable};
use crate::material::Material;
use crate::sampling::gen_range;

/// Half-thickness given to the fixed axis of a rectangle's bounding box.
const THICKNESS: f64 = 0.0001;

/// Rectangle spanning `[a0, a1] x [b0, b1]` in the plane `coord[AXIS] = k`.
///
/// `a` and `b` are the two remaining axes in increasing order.
pub struct AaRect<const AXIS: usize> {
    a0: f64,
    a1: f64,
    b0: f64,
    b1: f64,
    k: f64,
    material: Arc<dyn Material>,
}

/// Rectangle in the plane x = k, spanning y and z.
pub type YzRect = AaRect<0>;
/// Rectangle in the plane y = k, spanning x and z.
pub type XzRect = AaRect<1>;
/// Rectangle in the plane z = k, spanning x and y.
pub type XyRect = AaRect<2>;

impl<const AXIS: usize> AaRect<AXIS> {
    const PLANE_AXES: (usize, usize) = match AXIS {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    };

    pub fn new(a0: f64, a1: f64, b0: f64, b1: f64, k: f64, material: Arc<dyn Material>) -> Self {
        Self {
            a0,
            a1,
            b0,
            b1,
            k,
            material,
        }
    }

    fn outward_normal() -> Vec3 {
        let mut n = Vec3::ZERO;
        n[AXIS] = 1.0;
        n
    }

    /// Plane crossing inside the rectangle: `(t, a, b)`.
    fn solve(&self, ray: &Ray, ray_t: Interval) -> Option<(f64, f64, f64)> {
        let (ia, ib) = Self::PLANE_AXES;
        let origin = ray.origin();
        let dir = ray.direction();

        // A ray parallel to the plane yields an infinite or NaN t.
        let t = (self.k - origin[AXIS]) / dir[AXIS];
        if !t.is_finite() || !ray_t.accepts(t) {
            return None;
        }

        let a = origin[ia] + t * dir[ia];
        let b = origin[ib] + t * dir[ib];
        if a < self.a0 || a > self.a1 || b < self.b0 || b > self.b1 {
            return None;
        }
        Some((t, a, b))
    }

    fn area(&self) -> f64 {
        (self.a1 - self.a0) * (self.b1 - self.b0)
    }
}

impl<const AXIS: usize> Hittable for AaRect<AXIS> {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let (t, a, b) = self.solve(ray, ray_t)?;
        let u = (a - self.a0) / (self.a1 - self.a0);
        let v = (b - self.b0) / (self.b1 - self.b0);
        Some(HitRecord::new(
            ray,
            t,
            Self::outward_normal(),
            self.material.as_ref(),
            (u, v),
        ))
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        let (ia, ib) = Self::PLANE_AXES;
        let mut min = Point3::ZERO;
        let mut max = Point3::ZERO;
        min[ia] = self.a0;
        max[ia] = self.a1;
        min[ib] = self.b0;
        max[ib] = self.b1;
        min[AXIS] = self.k - THICKNESS;
        max[AXIS] = self.k + THICKNESS;
        Some(Aabb::from_points(min, max))
    }
}

impl<const AXIS: usize> Samplable for AaRect<AXIS> {
    fn pdf_value(&self, origin: Point3, direction: Vec3) -> f64 {
        let ray = Ray::new_simple(origin, direction);
        let Some((t, _, _)) = self.solve(&ray, Interval::new(0.001, f64::INFINITY)) else {
            return 0.0;
        };

        let distance_squared = t * t * direction.length_squared();
        let cosine = (direction[AXIS] / direction.length()).abs();
        distance_squared / (cosine * self.area())
    }

    fn random(&self, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        let (ia, ib) = Self::PLANE_AXES;
        let mut point = Point3::ZERO;
        point[ia] = gen_range(rng, self.a0, self.a1);
        point[ib] = gen_range(rng, self.b0, self.b1);
        point[AXIS] = self.k;
        point - origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use ember_math::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Color::splat(0.5)))
    }

    #[test]
    fn test_xz_rect_hit_from_below() {
        let rect = XzRect::new(-1.0, 1.0, -1.0, 1.0, 2.0, gray());
        let ray = Ray::new_simple(Point3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(0);

        let rec = rect
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 2.0).abs() < 1e-12);
        assert!(!rec.front_face);
        assert_eq!(rec.normal, Vec3::new(0.0, -1.0, 0.0));
        assert!((rec.u - 0.5).abs() < 1e-12);
        assert!((rec.v - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_plane_axes() {
        assert_eq!(YzRect::PLANE_AXES, (1, 2));
        assert_eq!(XzRect::PLANE_AXES, (0, 2));
        assert_eq!(XyRect::PLANE_AXES, (0, 1));
    }

    #[test]
    fn test_parallel_ray_misses() {
        let rect = XyRect::new(-1.0, 1.0, -1.0, 1.0, 0.0, gray());
        let ray = Ray::new_simple(Point3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        let mut rng = StdRng::seed_from_u64(0);
        assert!(rect
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .is_none());
    }

    #[test]
    fn test_parallel_ray_on_either_side_misses() {
        let rect = XyRect::new(-1.0, 1.0, -1.0, 1.0, 0.0, gray());
        let mut rng = StdRng::seed_from_u64(0);
        for z in [-1.0, 1.0] {
            let origin = Point3::new(0.0, 0.0, z);
            let ray = Ray::new_simple(origin, Vec3::Y);
            assert!(rect
                .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
                .is_none());
            assert_eq!(rect.pdf_value(origin, Vec3::Y), 0.0);
        }
    }

    #[test]
    fn test_outside_extent_misses() {
        let rect = YzRect::new(0.0, 1.0, 0.0, 1.0, 3.0, gray());
        let ray = Ray::new_simple(Point3::new(0.0, 2.0, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let mut rng = StdRng::seed_from_u64(0);
        assert!(rect
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .is_none());
    }

    #[test]
    fn test_bounding_box_is_padded() {
        let rect = XzRect::new(0.0, 2.0, 0.0, 3.0, 5.0, gray());
        let bbox = rect.bounding_box(0.0, 1.0).unwrap();
        assert!(bbox.y.size() > 0.0);
        assert!(bbox.y.contains(5.0));
        assert_eq!(bbox.x.max, 2.0);
        assert_eq!(bbox.z.max, 3.0);
    }

    #[test]
    fn test_pdf_value_head_on() {
        // Unit square at distance 1, hit perpendicularly: pdf = d^2 / area.
        let rect = XyRect::new(-0.5, 0.5, -0.5, 0.5, -1.0, gray());
        let pdf = rect.pdf_value(Point3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!((pdf - 1.0).abs() < 1e-12);
        assert_eq!(rect.pdf_value(Point3::ZERO, Vec3::new(0.0, 0.0, 1.0)), 0.0);
    }

    #[test]
    fn test_random_lands_on_rect() {
        let rect = XzRect::new(213.0, 343.0, 227.0, 332.0, 554.0, gray());
        let origin = Point3::new(278.0, 0.0, 278.0);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let dir = rect.random(origin, &mut rng);
            let p = origin + dir;
            assert!((p.y - 554.0).abs() < 1e-12);
            assert!((213.0..=343.0).contains(&p.x));
            assert!(rect.pdf_value(origin, dir) > 0.0);
        }
    }
}
