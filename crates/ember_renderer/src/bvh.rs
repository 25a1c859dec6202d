//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over shared objects. Each split picks a random axis and
//! orders children by the minimum of their boxes along it.

use std::sync::Arc;

use ember_math::{Aabb, Interval, Ray};
use log::{debug, error};
use rand::{Rng, RngCore};

use crate::error::{RenderError, RenderResult};
use crate::hittable::{HitRecord, Hittable, HittableList};

/// BVH node - either a branch with two children or a leaf holding one object.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with a single object.
    Leaf {
        object: Arc<dyn Hittable>,
        bbox: Aabb,
    },
    /// Built from an empty list; never hit.
    Empty,
}

impl BvhNode {
    /// Build a BVH over `objects` for the shutter interval `[time0, time1]`.
    ///
    /// Fails if any object has no bounding box.
    pub fn new(
        objects: Vec<Arc<dyn Hittable>>,
        time0: f64,
        time1: f64,
        rng: &mut dyn RngCore,
    ) -> RenderResult<Self> {
        let mut boxed = Vec::with_capacity(objects.len());
        for (index, object) in objects.into_iter().enumerate() {
            let Some(bbox) = object.bounding_box(time0, time1) else {
                error!("No bounding box for object {} in BVH construction", index);
                return Err(RenderError::MissingBoundingBox { index });
            };
            boxed.push((object, bbox));
        }

        let count = boxed.len();
        let node = if boxed.is_empty() {
            BvhNode::Empty
        } else {
            Self::build(&mut boxed, rng)
        };

        debug!(
            "Built BVH over {} objects: {} nodes, depth {}",
            count,
            node.node_count(),
            node.depth()
        );
        Ok(node)
    }

    /// Build a BVH over the members of a list.
    pub fn from_list(
        list: &HittableList,
        time0: f64,
        time1: f64,
        rng: &mut dyn RngCore,
    ) -> RenderResult<Self> {
        Self::new(list.objects().to_vec(), time0, time1, rng)
    }

    /// Recursive construction over a non-empty slice.
    fn build(objects: &mut [(Arc<dyn Hittable>, Aabb)], rng: &mut dyn RngCore) -> Self {
        if let [(object, bbox)] = objects {
            return BvhNode::Leaf {
                object: object.clone(),
                bbox: *bbox,
            };
        }

        let axis = rng.gen_range(0..3);
        objects.sort_by(|a, b| {
            let a_min = a.1.axis_interval(axis).min;
            let b_min = b.1.axis_interval(axis).min;
            a_min.total_cmp(&b_min)
        });

        // Two objects end up as an ordered pair of leaves.
        let mid = objects.len() / 2;
        let (left_objects, right_objects) = objects.split_at_mut(mid);
        let left = Self::build(left_objects, rng);
        let right = Self::build(right_objects, rng);

        let bbox = match (left.bbox(), right.bbox()) {
            (Some(l), Some(r)) => Aabb::surrounding(&l, &r),
            (Some(b), None) | (None, Some(b)) => b,
            (None, None) => Aabb::EMPTY,
        };

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }

    /// Box of this node, absent for `Empty`.
    pub fn bbox(&self) -> Option<Aabb> {
        match self {
            BvhNode::Empty => None,
            BvhNode::Leaf { bbox, .. } | BvhNode::Branch { bbox, .. } => Some(*bbox),
        }
    }

    /// Left and right children of a branch.
    pub fn children(&self) -> Option<(&BvhNode, &BvhNode)> {
        match self {
            BvhNode::Branch { left, right, .. } => Some((left, right)),
            _ => None,
        }
    }

    /// Number of levels; a lone leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Total number of nodes, leaves included.
    pub fn node_count(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        match self {
            BvhNode::Empty => None,

            BvhNode::Leaf { object, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }
                object.hit(ray, ray_t, rng)
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(ray, ray_t, rng);

                // Only check right up to closest hit
                let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
                let hit_right = right.hit(ray, Interval::new(ray_t.min, right_max), rng);

                hit_right.or(hit_left)
            }
        }
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        self.bbox()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant_medium::ConstantMedium;
    use crate::material::Lambertian;
    use crate::sphere::Sphere;
    use ember_math::{Color, Point3, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Infinite plane; has no bounding box.
    struct Plane;

    impl Hittable for Plane {
        fn hit(&self, _: &Ray, _: Interval, _: &mut dyn RngCore) -> Option<HitRecord<'_>> {
            None
        }

        fn bounding_box(&self, _: f64, _: f64) -> Option<Aabb> {
            None
        }
    }

    fn sphere_at(x: f64) -> Arc<dyn Hittable> {
        Arc::new(Sphere::new(
            Point3::new(x, 0.0, -5.0),
            0.5,
            Arc::new(Lambertian::from_color(Color::splat(0.5))),
        ))
    }

    #[test]
    fn test_bvh_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        let bvh = BvhNode::new(vec![], 0.0, 1.0, &mut rng).unwrap();
        assert!(matches!(bvh, BvhNode::Empty));
        assert!(bvh.bounding_box(0.0, 1.0).is_none());

        let ray = Ray::new_simple(Point3::ZERO, Vec3::Z);
        assert!(bvh.hit(&ray, Interval::UNIVERSE, &mut rng).is_none());
    }

    #[test]
    fn test_bvh_single_sphere() {
        let mut rng = StdRng::seed_from_u64(0);
        let bvh = BvhNode::new(vec![sphere_at(0.0)], 0.0, 1.0, &mut rng).unwrap();
        assert!(matches!(bvh, BvhNode::Leaf { .. }));

        let ray = Ray::new_simple(Point3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(bvh
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .is_some());
    }

    #[test]
    fn test_bvh_pair_is_ordered() {
        let mut rng = StdRng::seed_from_u64(0);
        let material = Arc::new(Lambertian::from_color(Color::ONE));
        let high: Arc<dyn Hittable> =
            Arc::new(Sphere::new(Point3::new(3.0, 3.0, 3.0), 0.5, material.clone()));
        let low: Arc<dyn Hittable> =
            Arc::new(Sphere::new(Point3::new(-3.0, -3.0, -3.0), 0.5, material));
        let bvh = BvhNode::new(vec![high, low], 0.0, 1.0, &mut rng).unwrap();

        let (left, right) = bvh.children().unwrap();
        assert!(matches!(left, BvhNode::Leaf { .. }));
        assert!(matches!(right, BvhNode::Leaf { .. }));

        // The low sphere comes first on every axis, so it is always on the left.
        assert_eq!(left.bbox().unwrap().min().x, -3.5);
        assert_eq!(right.bbox().unwrap().min().x, 2.5);
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let mut rng = StdRng::seed_from_u64(1);
        let spheres = (0..10).map(|i| sphere_at(i as f64)).collect();
        let bvh = BvhNode::new(spheres, 0.0, 1.0, &mut rng).unwrap();
        assert_eq!(bvh.node_count(), 19);
        assert!(bvh.depth() >= 4);

        let ray = Ray::new_simple(Point3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = bvh
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.p.z - (-4.5)).abs() < 1e-9);
    }

    #[test]
    fn test_bvh_missing_bounding_box() {
        let mut rng = StdRng::seed_from_u64(0);
        let objects: Vec<Arc<dyn Hittable>> = vec![sphere_at(0.0), Arc::new(Plane)];
        let result = BvhNode::new(objects, 0.0, 1.0, &mut rng);
        assert!(matches!(
            result,
            Err(RenderError::MissingBoundingBox { index: 1 })
        ));
    }

    #[test]
    fn test_bvh_holds_media() {
        let mut rng = StdRng::seed_from_u64(0);
        let boundary = sphere_at(0.0);
        let fog: Arc<dyn Hittable> = Arc::new(ConstantMedium::from_color(boundary, 1e6, Color::ONE));
        let bvh = BvhNode::new(vec![fog, sphere_at(4.0)], 0.0, 1.0, &mut rng).unwrap();

        let ray = Ray::new_simple(Point3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = bvh
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .unwrap();
        assert!(rec.t >= 4.5 && rec.t < 4.6);
    }
}
