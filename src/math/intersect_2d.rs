use super::{Point2, Vector2, TOLERANCE};

/// Relation between two 2D segments, as returned by [`classify_segments_2d`].
#[derive(Debug)]
pub enum SegmentRelation {
    /// The segments lie on the same line.
    Collinear,
    /// The segments are parallel but not collinear.
    Parallel,
    /// The segments intersect at the given point.
    Intersecting(Point2),
    /// The segments are not parallel and do not intersect.
    Disjoint,
}

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let cross = d1.perp(d2);
    if cross.abs() < TOLERANCE {
        return None;
    }
    let d = p2 - p1;
    let t = d.perp(d2) / cross;
    let u = d.perp(d1) / cross;
    Some((t, u))
}

/// Classifies the relation between segments `a0 → a1` and `b0 → b1`.
#[must_use]
pub fn classify_segments_2d(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> SegmentRelation {
    let da = a1 - a0;
    let db = b1 - b0;
    let denom = da.perp(&db);
    let offset = b0 - a0;
    let num_a = offset.perp(&db);
    let num_b = offset.perp(&da);

    if denom.abs() < TOLERANCE {
        if num_a.abs() < TOLERANCE && num_b.abs() < TOLERANCE {
            return SegmentRelation::Collinear;
        }
        return SegmentRelation::Parallel;
    }

    let t = num_a / denom;
    let u = num_b / denom;
    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        SegmentRelation::Intersecting(a0 + da * t.clamp(0.0, 1.0))
    } else {
        SegmentRelation::Disjoint
    }
}

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let (t, u) = line_line_intersect_2d(a0, &da, b0, &db)?;

    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t = t.clamp(0.0, 1.0);
        Some((a0 + da * t, t, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Intersection strictly inside both segments.
///
/// Touching at an endpoint (within `margin` of either parameter bound) does
/// not count, so segments sharing a corner never report a crossing.
#[must_use]
pub fn segment_crossing_point_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
    margin: f64,
) -> Option<Point2> {
    let (pt, t, u) = segment_segment_intersect_2d(a0, a1, b0, b1)?;
    let inside = |s: f64| s > margin && s < 1.0 - margin;
    (inside(t) && inside(u)).then_some(pt)
}
