pub mod angle_2d;
pub mod distance_2d;
pub mod intersect_2d;
pub mod polygon_2d;

/// 2D point type. Floor-plan coordinates, in centimetres.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type. Scene coordinates with `y` up (plan `y` maps to `z`).
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 2D rigid transformation (rotation + translation).
pub type Isometry2 = nalgebra::Isometry2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Lifts a plan point into scene space at the given height.
#[must_use]
pub fn plan_to_scene(p: &Point2, height: f64) -> Point3 {
    Point3::new(p.x, height, p.y)
}
