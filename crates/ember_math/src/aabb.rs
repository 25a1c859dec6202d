use crate::{Interval, Point3, Ray};

/// Axis-Aligned Bounding Box for the BVH.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
/// Construction pads any axis thinner than `PAD_DELTA`, so flat primitives
/// (rectangles, axis-aligned triangles) still have a box the slab test can hit.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

const PAD_DELTA: f64 = 0.0001;

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two corner points (in any order).
    pub fn from_points(a: Point3, b: Point3) -> Self {
        Self::new(
            Interval::new(a.x.min(b.x), a.x.max(b.x)),
            Interval::new(a.y.min(b.y), a.y.max(b.y)),
            Interval::new(a.z.min(b.z), a.z.max(b.z)),
        )
    }

    /// Create an AABB that surrounds two other AABBs.
    ///
    /// Component-wise min/max union; associative and commutative.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> Point3 {
        Point3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Maximum corner.
    pub fn max(&self) -> Point3 {
        Point3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// All eight corners of the box.
    pub fn corners(&self) -> [Point3; 8] {
        let (lo, hi) = (self.min(), self.max());
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// True if `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &Aabb) -> bool {
        (0..3).all(|axis| {
            let outer = self.axis_interval(axis);
            let inner = other.axis_interval(axis);
            outer.min <= inner.min && inner.max <= outer.max
        })
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Uses the slab method. A zero direction component yields infinite
    /// slab bounds, which `f64::min`/`max` handle without special casing.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        let ray_orig = r.origin();
        let ray_dir = r.direction();

        for axis in 0..3 {
            let ax = self.axis_interval(axis);
            let adinv = 1.0 / ray_dir[axis];

            let mut t0 = (ax.min - ray_orig[axis]) * adinv;
            let mut t1 = (ax.max - ray_orig[axis]) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }

        true
    }

    /// Translate (move) the AABB by an offset vector.
    pub fn translate(&self, offset: Point3) -> Aabb {
        Aabb::new(
            self.x.add_scalar(offset.x),
            self.y.add_scalar(offset.y),
            self.z.add_scalar(offset.z),
        )
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        if self.x.size() < PAD_DELTA {
            self.x = self.x.expand(PAD_DELTA);
        }
        if self.y.size() < PAD_DELTA {
            self.y = self.y.expand(PAD_DELTA);
        }
        if self.z.size() < PAD_DELTA {
            self.z = self.z.expand(PAD_DELTA);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 10.0), Vec3::new(0.0, 10.0, 0.0));

        assert_eq!(aabb.min(), Vec3::ZERO);
        assert_eq!(aabb.max(), Vec3::splat(10.0));
    }

    #[test]
    fn test_aabb_surrounding_is_commutative() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::splat(5.0));
        let box2 = Aabb::from_points(Vec3::splat(3.0), Vec3::splat(10.0));

        let ab = Aabb::surrounding(&box1, &box2);
        let ba = Aabb::surrounding(&box2, &box1);
        assert_eq!(ab, ba);
        assert_eq!(ab.min(), Vec3::ZERO);
        assert_eq!(ab.max(), Vec3::splat(10.0));
        assert!(ab.contains_box(&box1));
        assert!(ab.contains_box(&box2));
        assert!(!box1.contains_box(&ab));
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));

        // Ray pointing at center
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray pointing away
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray missing the box
        let ray = Ray::new_simple(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Box is beyond the allowed range
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 3.0)));
    }

    #[test]
    fn test_flat_box_is_padded_and_hittable() {
        // Zero thickness on Y, like an XZ rectangle
        let flat = Aabb::from_points(Vec3::new(0.0, 2.0, 0.0), Vec3::new(1.0, 2.0, 1.0));
        assert!(flat.y.size() > 0.0);

        let ray = Ray::new_simple(Vec3::new(0.5, 5.0, 0.5), Vec3::new(0.0, -1.0, 0.0));
        assert!(flat.hit(&ray, Interval::new(0.001, f64::INFINITY)));
    }

    #[test]
    fn test_aabb_translate() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let translated = aabb.translate(Vec3::new(5.0, 0.0, 0.0));

        assert_eq!(translated.x.min, 5.0);
        assert_eq!(translated.x.max, 6.0);
        assert_eq!(translated.y.min, 0.0);
    }

    #[test]
    fn test_aabb_corners() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        let corners = aabb.corners();

        assert!(corners.contains(&Vec3::ZERO));
        assert!(corners.contains(&Vec3::new(1.0, 2.0, 3.0)));
        assert!(corners.contains(&Vec3::new(0.0, 2.0, 3.0)));
    }
}
