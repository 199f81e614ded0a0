use std::collections::HashMap;

use spade::{ConstrainedDelaunayTriangulation, Point2 as SpadePoint2, Triangulation};

use crate::error::{Result, TessellationError};
use crate::floorplan::Floorplan;
use crate::math::distance_2d::distance;
use crate::math::polygon_2d::point_in_polygon;
use crate::math::{plan_to_scene, Point2, Vector3, TOLERANCE};

use super::TriangleMesh;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Triangulates the floor of a room.
///
/// The outline is the room's interior ring (inside the wall faces), or the
/// corner polygon when the ring is not available. Triangles face up.
pub struct TessellateFloor {
    room: usize,
    elevation: f64,
}

impl TessellateFloor {
    #[must_use]
    pub fn new(room: usize) -> Self {
        Self { room, elevation: 0.0 }
    }

    /// Places the floor at a scene height other than zero.
    #[must_use]
    pub fn at_elevation(mut self, elevation: f64) -> Self {
        self.elevation = elevation;
        self
    }

    /// # Errors
    ///
    /// Returns `TessellationError::Failed` for an unknown room or an
    /// outline the triangulation rejects.
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self, plan: &Floorplan) -> Result<TriangleMesh> {
        let room = plan
            .rooms()
            .get(self.room)
            .ok_or_else(|| TessellationError::Failed(format!("no room at index {}", self.room)))?;
        let outline = floor_outline(if room.interior_corners.len() >= 3 {
            &room.interior_corners
        } else {
            &room.polygon
        });
        if outline.len() < 3 {
            return Err(TessellationError::Failed(format!("room {} has a degenerate floor", self.room)).into());
        }
        let scale = room.texture().scale;
        let cdt = triangulate_outline(&outline)?;

        let mut mesh = TriangleMesh::default();
        let mut vertex_map: HashMap<usize, u32> = HashMap::new();
        for face in cdt.inner_faces() {
            let vertices = face.vertices();
            let [a, b, c] = vertices.map(|v| v.position());
            let centroid = Point2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
            // Outline sides are constraints, so a triangle is wholly inside or outside.
            if !point_in_polygon(&centroid, &outline) {
                continue;
            }

            let mut tri = [0u32; 3];
            for (slot, vertex) in tri.iter_mut().zip(vertices) {
                *slot = *vertex_map.entry(vertex.fix().index()).or_insert_with(|| {
                    let pos = vertex.position();
                    let p = Point2::new(pos.x, pos.y);
                    mesh.vertices.push(plan_to_scene(&p, self.elevation));
                    mesh.normals.push(Vector3::y());
                    mesh.uvs.push(Point2::new(p.x / scale, p.y / scale));
                    (mesh.vertices.len() - 1) as u32
                });
            }
            // Plan-CCW maps to scene-clockwise seen from above.
            mesh.indices.push([tri[0], tri[2], tri[1]]);
        }

        tracing::trace!(room = self.room, triangles = mesh.indices.len(), "floor tessellated");
        Ok(mesh)
    }
}

/// Drops consecutive outline points that coincide, including a closing repeat.
fn floor_outline(points: &[Point2]) -> Vec<Point2> {
    let mut outline: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if outline.last().is_none_or(|last| distance(last, p) > TOLERANCE) {
            outline.push(*p);
        }
    }
    if outline.len() > 1 && outline.first().zip(outline.last()).is_some_and(|(a, b)| distance(a, b) <= TOLERANCE) {
        outline.pop();
    }
    outline
}

/// Triangulates the outline with every side kept as a constraint edge.
fn triangulate_outline(outline: &[Point2]) -> Result<Cdt> {
    let mut cdt = Cdt::new();
    cdt.add_constraint_edges(outline.iter().map(|p| SpadePoint2::new(p.x, p.y)), true)
        .map_err(|e| TessellationError::Failed(format!("floor outline rejected: {e}")))?;
    Ok(cdt)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::topology::CornerId;

    fn draw(plan: &mut Floorplan, points: &[(f64, f64)]) {
        let ids: Vec<CornerId> = points
            .iter()
            .map(|&(x, y)| plan.new_corner(Point2::new(x, y), None))
            .collect();
        for i in 0..ids.len() {
            plan.new_wall(ids[i], ids[(i + 1) % ids.len()]).unwrap();
        }
    }

    fn mesh_area(mesh: &TriangleMesh) -> f64 {
        mesh.indices
            .iter()
            .map(|&[a, b, c]| {
                let (a, b, c) = (
                    mesh.vertices[a as usize],
                    mesh.vertices[b as usize],
                    mesh.vertices[c as usize],
                );
                (b - a).cross(&(c - a)).norm() / 2.0
            })
            .sum()
    }

    #[test]
    fn square_floor_is_two_upward_triangles() {
        let mut plan = Floorplan::new();
        draw(&mut plan, &[(0.0, 0.0), (400.0, 0.0), (400.0, 400.0), (0.0, 400.0)]);
        let mesh = TessellateFloor::new(0).execute(&plan).unwrap();
        assert_eq!(mesh.indices.len(), 2);
        assert_eq!(mesh.vertices.len(), 4);
        // Interior ring is inset by half the wall thickness.
        assert!((mesh_area(&mesh) - 380.0 * 380.0).abs() < 1e-6);

        for &[a, b, c] in &mesh.indices {
            let (a, b, c) = (
                mesh.vertices[a as usize],
                mesh.vertices[b as usize],
                mesh.vertices[c as usize],
            );
            assert!((b - a).cross(&(c - a)).y > 0.0);
        }
        assert!(mesh.normals.iter().all(|n| *n == Vector3::y()));
    }

    #[test]
    fn concave_floor_excludes_notch() {
        let mut plan = Floorplan::new();
        draw(
            &mut plan,
            &[
                (0.0, 0.0),
                (400.0, 0.0),
                (400.0, 200.0),
                (200.0, 200.0),
                (200.0, 400.0),
                (0.0, 400.0),
            ],
        );
        let mesh = TessellateFloor::new(0).at_elevation(15.0).execute(&plan).unwrap();
        assert_eq!(mesh.indices.len(), 4);
        // 380 x 180 + 180 x 200 of interior floor.
        assert!((mesh_area(&mesh) - (380.0 * 180.0 + 180.0 * 200.0)).abs() < 1e-6);
        assert!(mesh.vertices.iter().all(|v| (v.y - 15.0).abs() < 1e-12));
        assert!(!mesh.vertices.contains(&Point3::new(300.0, 15.0, 300.0)));
    }

    #[test]
    fn repeated_outline_points_are_dropped() {
        let square = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
            Point2::new(0.0, 0.0),
        ];
        assert_eq!(floor_outline(&square).len(), 4);
    }

    #[test]
    fn unknown_room_is_an_error() {
        let plan = Floorplan::new();
        assert!(TessellateFloor::new(0).execute(&plan).is_err());
    }
}
