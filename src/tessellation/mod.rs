//! Triangle meshes derived from the floor plan.

mod tessellate_floor;

pub use tessellate_floor::TessellateFloor;

use crate::math::{Point2, Point3, Vector3};

/// A triangle mesh in scene space (`y` up).
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// UV coordinates.
    pub uvs: Vec<Point2>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}
