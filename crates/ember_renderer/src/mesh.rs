//! Turning imported meshes into renderable triangles.

use std::path::Path;
use std::sync::Arc;

use ember_core::{load_obj, Mesh};
use rand::RngCore;

use crate::bvh::BvhNode;
use crate::error::RenderResult;
use crate::hittable::Hittable;
use crate::material::Material;
use crate::triangle::Triangle;

/// One triangle primitive per mesh face, all sharing `material`.
pub fn mesh_triangles(mesh: &Mesh, material: Arc<dyn Material>) -> Vec<Arc<dyn Hittable>> {
    mesh.triangles()
        .map(|[v0, v1, v2]| {
            Arc::new(Triangle::new(v0, v1, v2, material.clone())) as Arc<dyn Hittable>
        })
        .collect()
}

/// Load an OBJ file and build a BVH over its triangles.
pub fn triangle_mesh(
    path: impl AsRef<Path>,
    material: Arc<dyn Material>,
    rng: &mut dyn RngCore,
) -> RenderResult<BvhNode> {
    let mesh = load_obj(path)?;
    BvhNode::new(mesh_triangles(&mesh, material), 0.0, 1.0, rng)
}
