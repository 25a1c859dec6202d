//! Triangle mesh representation and OBJ import.
//!
//! The renderer never sees the file format: it gets positions and indices
//! and builds its own triangle primitives and BVH from them.

use std::path::Path;

use ember_math::{Aabb, Point3};
use thiserror::Error;

/// Errors that can occur during mesh loading.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Failed to parse OBJ file {path}: {source}")]
    Obj {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("OBJ file {0} contains no geometry")]
    Empty(String),

    #[error("Face index {index} out of range ({vertex_count} vertices)")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

pub type MeshResult<T> = Result<T, MeshError>;

/// A mesh consisting of vertex positions and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one point per vertex)
    pub positions: Vec<Point3>,

    /// Triangle indices (every 3 indices form a triangle, counter-clockwise)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and indices.
    ///
    /// Fails if any index points past the end of `positions`.
    pub fn new(positions: Vec<Point3>, indices: Vec<u32>) -> MeshResult<Self> {
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: positions.len(),
            });
        }

        let bounds = Self::compute_bounds(&positions);
        Ok(Self {
            positions,
            indices,
            bounds,
        })
    }

    /// Number of complete triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate over triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|face| {
            [
                self.positions[face[0] as usize],
                self.positions[face[1] as usize],
                self.positions[face[2] as usize],
            ]
        })
    }

    fn compute_bounds(positions: &[Point3]) -> Aabb {
        let Some(first) = positions.first() else {
            return Aabb::EMPTY;
        };

        let (min, max) = positions
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));

        Aabb::from_points(min, max)
    }
}

/// Load a Wavefront OBJ file, merging all of its shapes into one mesh.
///
/// Polygons are triangulated on load.
pub fn load_obj(path: impl AsRef<Path>) -> MeshResult<Mesh> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
    )
    .map_err(|source| MeshError::Obj {
        path: path.display().to_string(),
        source,
    })?;

    let mut positions = Vec::new();
    let mut indices = Vec::new();

    for model in &models {
        let base = positions.len() as u32;
        positions.extend(
            model
                .mesh
                .positions
                .chunks_exact(3)
                .map(|p| Point3::new(p[0] as f64, p[1] as f64, p[2] as f64)),
        );
        indices.extend(model.mesh.indices.iter().map(|i| base + i));

        log::debug!(
            "OBJ shape '{}': {} faces",
            model.name,
            model.mesh.indices.len() / 3
        );
    }

    if indices.is_empty() {
        return Err(MeshError::Empty(path.display().to_string()));
    }

    let mesh = Mesh::new(positions, indices)?;
    log::info!(
        "Loaded {} ({} vertices, {} triangles)",
        path.display(),
        mesh.positions.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_obj(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("ember_{}_{}.obj", name, std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_mesh_bounds() {
        let mesh = Mesh::new(
            vec![
                Point3::new(-1.0, 0.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
                Point3::new(0.0, 0.0, 3.0),
            ],
            vec![0, 1, 2],
        )
        .unwrap();

        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.bounds.min(), Point3::new(-1.0, 0.0, 0.0));
        assert_eq!(mesh.bounds.max(), Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_mesh_rejects_bad_index() {
        let result = Mesh::new(vec![Point3::ZERO], vec![0, 0, 5]);
        assert!(matches!(
            result,
            Err(MeshError::IndexOutOfRange { index: 5, .. })
        ));
    }

    #[test]
    fn test_load_obj_triangulates_quads() {
        let path = write_temp_obj(
            "quad",
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n",
        );

        let mesh = load_obj(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        for tri in mesh.triangles() {
            for v in tri {
                assert_eq!(v.z, 0.0);
            }
        }
    }

    #[test]
    fn test_load_missing_obj_fails() {
        let result = load_obj("/definitely/not/here.obj");
        assert!(matches!(result, Err(MeshError::Obj { .. })));
    }
}
