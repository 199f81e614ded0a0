use std::f64::consts::TAU;

use crate::math::angle_2d::{angle, angle_2pi, rotate};
use crate::math::distance_2d::{distance, point_to_segment_dist};
use crate::math::{plan_to_scene, Isometry2, Point2, Point3, Vector2, TOLERANCE};

use super::{CornerId, WallId, WallSide};

slotmap::new_key_type! {
    /// Unique identifier for a half-edge. Invalidated by every full rebuild.
    pub struct HalfEdgeId;
}

/// Smallest wedge the miter join is computed for, in radians (2°).
///
/// Wedges closer to a full reversal are clamped so `offset / sin(θ/2)`
/// stays finite.
pub const MIN_WEDGE_ANGLE: f64 = 2.0 * std::f64::consts::PI / 180.0;

/// A directed centreline segment between two corner positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSegment {
    pub start: Point2,
    pub end: Point2,
}

impl EdgeSegment {
    #[must_use]
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn direction(&self) -> Vector2 {
        self.end - self.start
    }
}

/// Offset from the shared corner of `v1 → v2` to the interior miter point.
///
/// `v1` ends where `v2` starts. A missing neighbour is replaced by a
/// collinear extension of the other segment, which reduces the result to a
/// plain left normal of length `offset`. The exterior miter point is the
/// negated vector.
#[must_use]
pub fn half_angle_vector(v1: Option<&EdgeSegment>, v2: Option<&EdgeSegment>, offset: f64) -> Vector2 {
    let (v1, v2) = match (v1, v2) {
        (Some(a), Some(b)) => (*a, *b),
        (None, Some(b)) => (EdgeSegment::new(b.start - b.direction(), b.start), *b),
        (Some(a), None) => (*a, EdgeSegment::new(a.end, a.end + a.direction())),
        (None, None) => return Vector2::zeros(),
    };

    let raw = angle_2pi(&(v1.start - v1.end), &(v2.end - v1.end));
    let theta = raw.clamp(MIN_WEDGE_ANGLE, TAU - MIN_WEDGE_ANGLE);
    if (theta - raw).abs() > TOLERANCE {
        tracing::warn!(theta = raw, "degenerate wedge clamped for miter join");
    }

    let rotated = rotate(&v2.direction(), theta * 0.5);
    let mag = rotated.norm();
    if mag < TOLERANCE {
        return Vector2::zeros();
    }
    rotated * (offset / (theta * 0.5).sin() / mag)
}

/// Rigid map from plan space into a wall face's canonical frame.
///
/// The face start lands on the origin and the face runs along `+x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceFrame {
    pub transform: Isometry2,
    pub inverse: Isometry2,
}

impl FaceFrame {
    #[must_use]
    pub fn new(start: &Point2, end: &Point2) -> Self {
        let heading = -angle(&Vector2::new(1.0, 0.0), &(end - start));
        let transform = Isometry2::rotation(-heading) * Isometry2::translation(-start.x, -start.y);
        Self {
            transform,
            inverse: transform.inverse(),
        }
    }

    #[must_use]
    pub fn to_local(&self, p: &Point2) -> Point2 {
        self.transform.transform_point(p)
    }

    #[must_use]
    pub fn to_plan(&self, p: &Point2) -> Point2 {
        self.inverse.transform_point(p)
    }
}

impl Default for FaceFrame {
    fn default() -> Self {
        Self {
            transform: Isometry2::identity(),
            inverse: Isometry2::identity(),
        }
    }
}

/// Axis-aligned scene-space bounds of a half-edge's interior plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneBounds {
    pub min: Point3,
    pub max: Point3,
    pub center: Point3,
}

impl Default for PlaneBounds {
    fn default() -> Self {
        Self {
            min: Point3::origin(),
            max: Point3::origin(),
            center: Point3::origin(),
        }
    }
}

impl PlaneBounds {
    fn from_points(points: &[Point3]) -> Self {
        let mut min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min = min.inf(p);
            max = max.sup(p);
        }
        Self {
            min,
            max,
            center: nalgebra::center(&min, &max),
        }
    }
}

/// One side of a wall as seen from inside a room.
///
/// Half-edges are rebuilt from scratch on every full update; `next` and
/// `prev` link the ring of one room, and are `None` for the synthetic
/// pair generated for an orphan wall.
#[derive(Debug, Clone)]
pub struct HalfEdge {
    pub wall: WallId,
    /// Index into the floor plan's room list.
    pub room: Option<usize>,
    pub side: WallSide,
    /// Corner the traversal leaves from.
    pub start: CornerId,
    /// Corner the traversal arrives at.
    pub end: CornerId,
    pub next: Option<HalfEdgeId>,
    pub prev: Option<HalfEdgeId>,
    /// Half the wall thickness.
    pub offset: f64,
    pub height: f64,
    pub interior_start: Point2,
    pub interior_end: Point2,
    pub exterior_start: Point2,
    pub exterior_end: Point2,
    pub interior_frame: FaceFrame,
    pub exterior_frame: FaceFrame,
    pub bounds: PlaneBounds,
}

impl HalfEdge {
    /// Creates an unlinked half-edge; geometry is filled by [`HalfEdge::generate`].
    #[must_use]
    pub fn new(
        wall: WallId,
        room: Option<usize>,
        side: WallSide,
        corners: (CornerId, CornerId),
        thickness: f64,
        height: f64,
    ) -> Self {
        Self {
            wall,
            room,
            side,
            start: corners.0,
            end: corners.1,
            next: None,
            prev: None,
            offset: thickness * 0.5,
            height,
            interior_start: Point2::origin(),
            interior_end: Point2::origin(),
            exterior_start: Point2::origin(),
            exterior_end: Point2::origin(),
            interior_frame: FaceFrame::default(),
            exterior_frame: FaceFrame::default(),
            bounds: PlaneBounds::default(),
        }
    }

    #[must_use]
    pub fn is_front(&self) -> bool {
        self.side == WallSide::Front
    }

    /// The other side of the same wall.
    #[must_use]
    pub fn opposite_side(&self) -> WallSide {
        match self.side {
            WallSide::Front => WallSide::Back,
            WallSide::Back => WallSide::Front,
        }
    }

    /// Recomputes miter points, face frames and plane bounds.
    ///
    /// `this` is the half-edge's own segment, `prev` and `next` the
    /// segments of its ring neighbours.
    pub fn generate(
        &mut self,
        this: &EdgeSegment,
        prev: Option<&EdgeSegment>,
        next: Option<&EdgeSegment>,
        elevations: (f64, f64),
    ) {
        let at_start = half_angle_vector(prev, Some(this), self.offset);
        let at_end = half_angle_vector(Some(this), next, self.offset);

        self.interior_start = this.start + at_start;
        self.interior_end = this.end + at_end;
        self.exterior_start = this.start - at_start;
        self.exterior_end = this.end - at_end;

        self.interior_frame = FaceFrame::new(&self.interior_start, &self.interior_end);
        self.exterior_frame = FaceFrame::new(&self.exterior_start, &self.exterior_end);

        let v1 = plan_to_scene(&self.interior_start, 0.0);
        let v2 = plan_to_scene(&self.interior_end, 0.0);
        let v3 = plan_to_scene(&self.interior_end, elevations.0);
        let v4 = plan_to_scene(&self.interior_start, elevations.1);
        self.bounds = PlaneBounds::from_points(&[v1, v2, v3, v4]);
    }

    #[must_use]
    pub fn interior_center(&self) -> Point2 {
        nalgebra::center(&self.interior_start, &self.interior_end)
    }

    #[must_use]
    pub fn exterior_center(&self) -> Point2 {
        nalgebra::center(&self.exterior_start, &self.exterior_end)
    }

    #[must_use]
    pub fn interior_distance(&self) -> f64 {
        distance(&self.interior_start, &self.interior_end)
    }

    #[must_use]
    pub fn exterior_distance(&self) -> f64 {
        distance(&self.exterior_start, &self.exterior_end)
    }

    /// The wall-face quad: interior start, interior end, exterior end, exterior start.
    #[must_use]
    pub fn corners(&self) -> [Point2; 4] {
        [
            self.interior_start,
            self.interior_end,
            self.exterior_end,
            self.exterior_start,
        ]
    }

    /// Distance from `p` to the interior face line.
    #[must_use]
    pub fn distance_to(&self, p: &Point2) -> f64 {
        point_to_segment_dist(p, &self.interior_start, &self.interior_end)
    }
}
