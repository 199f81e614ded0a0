use std::f64::consts::TAU;

use super::{Point2, Vector2};

/// Signed angle that rotates `start` onto `end` clockwise, in `(-π, π]`.
///
/// A quarter turn to the right is `+π/2`, a quarter turn to the left `-π/2`.
#[must_use]
pub fn angle(start: &Vector2, end: &Vector2) -> f64 {
    let dot = start.dot(end);
    let det = start.perp(end);
    -det.atan2(dot)
}

/// Clockwise angle from `start` to `end`, shifted into `[0, 2π)`.
#[must_use]
pub fn angle_2pi(start: &Vector2, end: &Vector2) -> f64 {
    let theta = angle(start, end);
    if theta < 0.0 {
        theta + TAU
    } else {
        theta
    }
}

/// Normalizes an angle to `[0, 2π)`.
#[must_use]
pub fn normalize_angle(a: f64) -> f64 {
    let r = a % TAU;
    if r < 0.0 {
        r + TAU
    } else {
        r
    }
}

/// Points sorted by their polar angle around an origin.
#[derive(Debug, Clone, Default)]
pub struct CyclicOrder {
    /// Indices into the input slice, in increasing angle order.
    pub indices: Vec<usize>,
    /// Polar angles in degrees, `[0, 360)`, matching `indices`.
    pub angles: Vec<f64>,
    /// The input points, reordered.
    pub points: Vec<Point2>,
}

/// Sorts points counter-clockwise by polar angle around `origin`.
///
/// Ties keep their input order.
#[must_use]
pub fn cyclic_order(points: &[Point2], origin: &Point2) -> CyclicOrder {
    let degrees: Vec<f64> = points
        .iter()
        .map(|p| {
            let v = p - origin;
            normalize_angle(v.y.atan2(v.x)).to_degrees()
        })
        .collect();

    let mut indices: Vec<usize> = (0..points.len()).collect();
    indices.sort_by(|&a, &b| degrees[a].total_cmp(&degrees[b]));

    CyclicOrder {
        angles: indices.iter().map(|&i| degrees[i]).collect(),
        points: indices.iter().map(|&i| points[i]).collect(),
        indices,
    }
}

/// Rotates `v` counter-clockwise by `theta`.
#[must_use]
pub fn rotate(v: &Vector2, theta: f64) -> Vector2 {
    let (sn, cs) = theta.sin_cos();
    Vector2::new(v.x * cs - v.y * sn, v.x * sn + v.y * cs)
}
