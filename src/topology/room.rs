use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::math::polygon_2d::{centroid_2d, left_normal, point_in_polygon, signed_area_2d};
use crate::math::{plan_to_scene, Point2, Point3, Vector2};

use super::half_edge::PlaneBounds;
use super::{CornerId, HalfEdge, HalfEdgeId, Texture, WallData, WallId};

pub const DEFAULT_ROOM_TYPE: &str = "other";
pub const DEFAULT_FLOOR_TEXTURE: &str = "rooms/textures/default_floor_texture.jpg";
const FLOOR_TEXTURE_SCALE: f64 = 400.0;

/// User-editable room attributes, preserved across rebuilds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAttributes {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default = "default_room_type")]
    pub room_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub color_tags: Vec<String>,
    #[serde(default = "default_floor_texture")]
    pub floor_texture: String,
}

fn default_room_type() -> String {
    DEFAULT_ROOM_TYPE.to_owned()
}

fn default_floor_texture() -> String {
    DEFAULT_FLOOR_TEXTURE.to_owned()
}

impl RoomAttributes {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for RoomAttributes {
    fn default() -> Self {
        Self {
            name: String::new(),
            room_type: default_room_type(),
            tags: Vec::new(),
            color_tags: Vec::new(),
            floor_texture: default_floor_texture(),
        }
    }
}

/// An enclosed counter-clockwise cycle of corners.
///
/// Rooms are derived: the floor plan discards and rediscovers all of them
/// on every structural change.
#[derive(Debug, Clone)]
pub struct Room {
    pub corners: Vec<CornerId>,
    /// Persisted ids of `corners`, same order.
    pub corner_ids: Vec<String>,
    /// Corner positions, same order.
    pub polygon: Vec<Point2>,
    pub attributes: RoomAttributes,
    /// Unsigned floor area.
    pub area: f64,
    pub area_center: Point2,
    /// First half-edge of the boundary ring.
    pub edge_pointer: Option<HalfEdgeId>,
    /// Interior miter points of the ring, the visible floor outline.
    pub interior_corners: Vec<Point2>,
    pub floor_bounds: PlaneBounds,
}

impl Room {
    #[must_use]
    pub fn new(corners: Vec<CornerId>, corner_ids: Vec<String>, polygon: Vec<Point2>) -> Self {
        let mut room = Self {
            corners,
            corner_ids,
            polygon,
            attributes: RoomAttributes::default(),
            area: 0.0,
            area_center: Point2::origin(),
            edge_pointer: None,
            interior_corners: Vec::new(),
            floor_bounds: PlaneBounds::default(),
        };
        room.update_area();
        room
    }

    /// Comma-joined corner ids in cycle order.
    #[must_use]
    pub fn cycle_id(&self) -> String {
        self.corner_ids.join(",")
    }

    /// Comma-joined corner ids, sorted; independent of the cycle start.
    #[must_use]
    pub fn uuid(&self) -> String {
        sorted_corner_key(&self.corner_ids)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.attributes.name
    }

    /// Floor finish as a texture descriptor.
    #[must_use]
    pub fn texture(&self) -> Texture {
        Texture {
            url: self.attributes.floor_texture.clone(),
            stretch: false,
            scale: FLOOR_TEXTURE_SCALE,
        }
    }

    /// Recomputes area and centroid from `polygon`.
    #[allow(clippy::cast_precision_loss)]
    pub fn update_area(&mut self) {
        self.area = signed_area_2d(&self.polygon).abs();
        self.area_center = centroid_2d(&self.polygon).unwrap_or_else(|| {
            let n = self.polygon.len().max(1) as f64;
            let sum = self.polygon.iter().fold(Vector2::zeros(), |acc, p| acc + p.coords);
            Point2::from(sum / n)
        });
    }

    /// Sets the interior outline and derives the floor-plane bounds.
    pub fn set_interior_corners(&mut self, points: Vec<Point2>) {
        let mut min = Point3::new(f64::INFINITY, 0.0, f64::INFINITY);
        let mut max = Point3::new(f64::NEG_INFINITY, 0.0, f64::NEG_INFINITY);
        for p in &points {
            let q = plan_to_scene(p, 0.0);
            min = min.inf(&q);
            max = max.sup(&q);
        }
        if !points.is_empty() {
            self.floor_bounds = PlaneBounds {
                min,
                max,
                center: nalgebra::center(&min, &max),
            };
        }
        self.interior_corners = points;
    }

    #[must_use]
    pub fn point_in_room(&self, p: &Point2) -> bool {
        point_in_polygon(p, &self.polygon)
    }

    /// Whether every id in `ids` is a corner of this room.
    #[must_use]
    pub fn has_all_corners_by_id<S: AsRef<str>>(&self, ids: &[S]) -> bool {
        ids.iter()
            .all(|id| self.corner_ids.iter().any(|c| c == id.as_ref()))
    }

    /// Wraps an index into the corner cycle.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn cycle_index(&self, index: isize) -> usize {
        let n = self.corners.len().max(1) as isize;
        index.rem_euclid(n) as usize
    }

    /// Walls of the boundary ring, in ring order.
    #[must_use]
    pub fn walls(&self, edges: &SlotMap<HalfEdgeId, HalfEdge>) -> Vec<WallId> {
        let mut walls = Vec::new();
        let Some(first) = self.edge_pointer else {
            return walls;
        };
        let mut current = first;
        while let Some(edge) = edges.get(current) {
            walls.push(edge.wall);
            match edge.next {
                Some(next) if next != first && walls.len() < edges.len() => current = next,
                _ => break,
            }
        }
        walls
    }

    /// Endpoints of `wall`, ordered against the cycle direction.
    #[must_use]
    pub fn wall_endpoints(&self, wall: &WallData) -> Option<(Point2, Point2)> {
        let i = self.corners.iter().position(|&c| c == wall.start)?;
        let j = self.corners.iter().position(|&c| c == wall.end)?;
        let last = self.corners.len() - 1;
        if (i == 0 && j == last) || (j == 0 && i == last) {
            return Some((self.polygon[0], self.polygon[last]));
        }
        Some((self.polygon[i.max(j)], self.polygon[i.min(j)]))
    }

    /// Unit direction of `wall` as seen from this room.
    #[must_use]
    pub fn wall_direction(&self, wall: &WallData) -> Option<Vector2> {
        let (start, end) = self.wall_endpoints(wall)?;
        (end - start).try_normalize(0.0)
    }

    /// Unit normal of `wall` pointing out of this room.
    #[must_use]
    pub fn wall_out_direction(&self, wall: &WallData) -> Option<Vector2> {
        self.wall_direction(wall).map(left_normal)
    }
}

/// Sorted, comma-joined corner ids.
#[must_use]
pub fn sorted_corner_key<S: AsRef<str>>(ids: &[S]) -> String {
    let mut sorted: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();
    sorted.join(",")
}
