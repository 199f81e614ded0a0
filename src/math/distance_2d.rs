use super::{Point2, TOLERANCE};

/// Euclidean distance between two plan points.
#[must_use]
pub fn distance(a: &Point2, b: &Point2) -> f64 {
    (b - a).norm()
}

/// Returns the point on segment `a → b` closest to `p`.
///
/// Projections falling before `a` (or a degenerate segment) clamp to `a`,
/// projections past `b` clamp to `b`.
#[must_use]
pub fn closest_point_on_segment(p: &Point2, a: &Point2, b: &Point2) -> Point2 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return *a;
    }

    let t = (p - a).dot(&ab) / len_sq;
    if t < 0.0 {
        *a
    } else if t > 1.0 {
        *b
    } else {
        a + ab * t
    }
}

/// Returns the minimum distance from `p` to the segment `a → b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    distance(p, &closest_point_on_segment(p, a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    #[test]
    fn segment_dist_perpendicular_projection() {
        let d = point_to_segment_dist(&Point2::new(1.0, 1.0), &Point2::new(0.0, 0.0), &Point2::new(2.0, 0.0));
        assert!((d - 1.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn segment_dist_endpoint_closest() {
        let d = point_to_segment_dist(&Point2::new(-1.0, 0.0), &Point2::new(0.0, 0.0), &Point2::new(2.0, 0.0));
        assert!((d - 1.0).abs() < TOL, "d={d}");

        let d = point_to_segment_dist(&Point2::new(5.0, 4.0), &Point2::new(0.0, 0.0), &Point2::new(2.0, 0.0));
        assert!((d - 5.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn segment_dist_on_segment() {
        let d = point_to_segment_dist(&Point2::new(1.0, 0.0), &Point2::new(0.0, 0.0), &Point2::new(2.0, 0.0));
        assert!(d.abs() < TOL, "d={d}");
    }

    #[test]
    fn segment_dist_degenerate() {
        let origin = Point2::new(0.0, 0.0);
        let d = point_to_segment_dist(&Point2::new(3.0, 4.0), &origin, &origin);
        assert!((d - 5.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn closest_point_interior() {
        let c = closest_point_on_segment(&Point2::new(3.0, 7.0), &Point2::new(0.0, 0.0), &Point2::new(10.0, 0.0));
        assert!((c.x - 3.0).abs() < TOL);
        assert!(c.y.abs() < TOL);
    }
}
