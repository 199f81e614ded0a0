//! Default value functions for serde deserialization.

use super::Unit;

pub fn unit() -> Unit {
    Unit::Centimeter
}

pub fn wall_height() -> f64 {
    400.0
}

pub fn wall_thickness() -> f64 {
    20.0
}

pub fn scale() -> f64 {
    1.0
}

pub fn grid_spacing() -> f64 {
    50.0
}

pub fn corner_tolerance() -> f64 {
    30.0
}

pub fn hit_tolerance() -> f64 {
    20.0
}
