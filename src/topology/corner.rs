use crate::math::angle_2d::cyclic_order;
use crate::math::{Point2, Vector2};

use super::WallId;

slotmap::new_key_type! {
    /// Unique identifier for a corner in the topology store.
    pub struct CornerId;
}

/// The angle between two consecutive walls around a corner.
///
/// Used only for drawing angle annotations; never authoritative.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerWedge {
    /// Neighbour at the start of the wedge, counter-clockwise order.
    pub from: CornerId,
    /// Neighbour at the end of the wedge.
    pub to: CornerId,
    /// Polar angle of `from`, degrees in `[0, 360)`.
    pub start_angle: f64,
    /// Polar angle of `to`, degrees; may exceed 360 on the wrapping wedge.
    pub end_angle: f64,
    /// Opening of the wedge in degrees.
    pub angle: f64,
    /// Unit vector halfway between the two walls.
    pub bisector: Vector2,
}

/// Data associated with a floor-plan corner.
#[derive(Debug, Clone)]
pub struct CornerData {
    /// Stable persisted identifier.
    pub id: String,
    /// Plan position in centimetres.
    pub position: Point2,
    /// Height of the floor at this corner.
    pub elevation: f64,
    /// Walls whose `start` is this corner.
    pub wall_starts: Vec<WallId>,
    /// Walls whose `end` is this corner.
    pub wall_ends: Vec<WallId>,
    /// Cached wedge angles, refreshed by the drag-tier update.
    pub wedges: Vec<CornerWedge>,
}

impl CornerData {
    /// Creates a corner with no attached walls.
    #[must_use]
    pub fn new(id: impl Into<String>, position: Point2, elevation: f64) -> Self {
        Self {
            id: id.into(),
            position,
            elevation,
            wall_starts: Vec::new(),
            wall_ends: Vec::new(),
            wedges: Vec::new(),
        }
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.position.y
    }

    /// All attached walls, starts first.
    pub fn attached_walls(&self) -> impl Iterator<Item = WallId> + '_ {
        self.wall_starts.iter().chain(self.wall_ends.iter()).copied()
    }

    /// Whether no wall touches this corner.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.wall_starts.is_empty() && self.wall_ends.is_empty()
    }

    pub(crate) fn attach_start(&mut self, wall: WallId) {
        if !self.wall_starts.contains(&wall) {
            self.wall_starts.push(wall);
        }
    }

    pub(crate) fn attach_end(&mut self, wall: WallId) {
        if !self.wall_ends.contains(&wall) {
            self.wall_ends.push(wall);
        }
    }

    pub(crate) fn detach_wall(&mut self, wall: WallId) {
        self.wall_starts.retain(|&w| w != wall);
        self.wall_ends.retain(|&w| w != wall);
    }
}

/// Computes the wedges between consecutive neighbours around `origin`.
///
/// A corner with fewer than two neighbours has no wedges.
#[must_use]
pub fn compute_wedges(origin: &Point2, neighbours: &[(CornerId, Point2)]) -> Vec<CornerWedge> {
    if neighbours.len() < 2 {
        return Vec::new();
    }
    let points: Vec<Point2> = neighbours.iter().map(|(_, p)| *p).collect();
    let order = cyclic_order(&points, origin);
    let n = order.indices.len();

    (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            let start_angle = order.angles[i];
            let mut end_angle = order.angles[j];
            if j == 0 {
                end_angle += 360.0;
            }
            let angle = end_angle - start_angle;
            let mid = (start_angle + angle * 0.5).to_radians();
            CornerWedge {
                from: neighbours[order.indices[i]].0,
                to: neighbours[order.indices[j]].0,
                start_angle,
                end_angle,
                angle,
                bisector: Vector2::new(mid.cos(), mid.sin()),
            }
        })
        .collect()
}
