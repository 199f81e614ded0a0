//! Display-unit conversions at the load/save/display boundary.
//!
//! All geometry is stored in centimetres; a [`Unit`] converts to and from
//! the raw numbers written into persisted documents and shown to the user.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Rounding factor for persisted values (three decimals).
pub const DECIMALS: f64 = 1000.0;

pub const CM_PER_FOOT: f64 = 30.48;
pub const PIXELS_PER_FOOT: f64 = 15.0;
pub const CM_PER_PIXEL: f64 = CM_PER_FOOT * (1.0 / PIXELS_PER_FOOT);
pub const PIXELS_PER_CM: f64 = 1.0 / CM_PER_PIXEL;

const CM_PER_FOOT_EXACT: f64 = 30.480_016_459_203_095_991;
const CM_PER_INCH_EXACT: f64 = 2.540_001_371_600_257_851_2;
const CM_PER_MM_EXACT: f64 = 0.100_000_054_000_010_149_55;
const FEET_PER_CM: f64 = 0.032_808_416_666_669_996_953;
const INCHES_PER_CM: f64 = 0.3937;

/// A linear display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "inch")]
    Inch,
    #[serde(rename = "feetAndInch")]
    FeetAndInch,
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "cm")]
    Centimeter,
    #[serde(rename = "mm")]
    Millimeter,
}

fn round_off(value: f64) -> f64 {
    (DECIMALS * value).round() / DECIMALS
}

impl Unit {
    /// All supported units, in menu order.
    pub const ALL: [Unit; 5] = [
        Unit::Inch,
        Unit::FeetAndInch,
        Unit::Meter,
        Unit::Centimeter,
        Unit::Millimeter,
    ];

    /// The persisted name of the unit.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Inch => "inch",
            Unit::FeetAndInch => "feetAndInch",
            Unit::Meter => "m",
            Unit::Centimeter => "cm",
            Unit::Millimeter => "mm",
        }
    }

    /// Parses a persisted unit name, `None` for anything unknown.
    #[must_use]
    pub fn parse(name: &str) -> Option<Unit> {
        Unit::ALL.into_iter().find(|u| u.as_str() == name)
    }

    /// Converts a raw value in this unit to centimetres.
    #[must_use]
    pub fn cm_from_measure_raw(self, measure: f64) -> f64 {
        match self {
            Unit::FeetAndInch => round_off(measure * CM_PER_FOOT_EXACT),
            Unit::Inch => round_off(measure * CM_PER_INCH_EXACT),
            Unit::Millimeter => round_off(measure * CM_PER_MM_EXACT),
            Unit::Centimeter => measure,
            Unit::Meter => round_off(100.0 * measure),
        }
    }

    /// Converts centimetres to a raw value in this unit.
    ///
    /// `power` is 1 for lengths and 2 for areas. Feet are not rounded.
    #[must_use]
    pub fn cm_to_measure_raw(self, cm: f64, power: i32) -> f64 {
        match self {
            Unit::FeetAndInch => cm * FEET_PER_CM.powi(power),
            Unit::Inch => round_off(cm * INCHES_PER_CM.powi(power)),
            Unit::Millimeter => round_off(cm * 10f64.powi(power)),
            Unit::Centimeter => round_off(cm),
            Unit::Meter => round_off(cm * 0.01f64.powi(power)),
        }
    }

    /// Formats centimetres for display in this unit.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cm_to_measure(self, cm: f64, power: i32) -> String {
        match self {
            Unit::FeetAndInch => {
                let all_in_feet = cm * FEET_PER_CM.powi(power);
                let feet = all_in_feet.floor();
                let inches = ((all_in_feet - feet) * 12.0).round();
                format!("{}'{}'", feet as i64, inches as i64)
            }
            Unit::Inch => format!("{}'", self.cm_to_measure_raw(cm, power)),
            Unit::Millimeter => format!("{}mm", self.cm_to_measure_raw(cm, power)),
            Unit::Centimeter => format!("{}cm", round_off(cm)),
            Unit::Meter => format!("{}m", self.cm_to_measure_raw(cm, power)),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::parse(s).ok_or_else(|| ConfigError::Invalid(format!("unknown unit '{s}'")))
    }
}

/// Converts centimetres to screen pixels at the given zoom scale.
#[must_use]
pub fn cm_to_pixel(cm: f64, scale: f64) -> f64 {
    cm * PIXELS_PER_CM * scale
}

/// Converts screen pixels to centimetres at the given zoom scale.
#[must_use]
pub fn pixel_to_cm(pixel: f64, scale: f64) -> f64 {
    pixel * CM_PER_PIXEL / scale
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_and_unknown() {
        assert_eq!(Unit::parse("m"), Some(Unit::Meter));
        assert_eq!(Unit::parse("feetAndInch"), Some(Unit::FeetAndInch));
        assert_eq!(Unit::parse("furlong"), None);
        assert!("furlong".parse::<Unit>().is_err());
        assert_eq!("mm".parse::<Unit>().unwrap(), Unit::Millimeter);
    }

    #[test]
    fn serde_uses_persisted_names() {
        let json = serde_json::to_string(&Unit::FeetAndInch).unwrap();
        assert_eq!(json, "\"feetAndInch\"");
        let unit: Unit = serde_json::from_str("\"cm\"").unwrap();
        assert_eq!(unit, Unit::Centimeter);
    }

    #[test]
    fn meter_round_trip() {
        let raw = Unit::Meter.cm_to_measure_raw(1581.1, 1);
        assert!((raw - 15.811).abs() < 1e-12);
        assert!((Unit::Meter.cm_from_measure_raw(raw) - 1581.1).abs() < 1e-9);
    }

    #[test]
    fn every_unit_round_trips_within_rounding() {
        for unit in Unit::ALL {
            let cm = 1234.567;
            let back = unit.cm_from_measure_raw(unit.cm_to_measure_raw(cm, 1));
            assert!((back - cm).abs() < 0.06, "{unit}: {back} vs {cm}");
        }
    }

    #[test]
    fn display_strings() {
        assert_eq!(Unit::Meter.cm_to_measure(150.0, 1), "1.5m");
        assert_eq!(Unit::Centimeter.cm_to_measure(150.0, 1), "150cm");
        assert_eq!(Unit::Millimeter.cm_to_measure(1.5, 1), "15mm");
        assert_eq!(Unit::FeetAndInch.cm_to_measure(CM_PER_FOOT * 4.5, 1), "4'6'");
    }

    #[test]
    fn pixel_conversion_inverts() {
        let px = cm_to_pixel(30.48, 2.0);
        assert!((px - 30.0).abs() < 1e-9);
        assert!((pixel_to_cm(px, 2.0) - 30.48).abs() < 1e-9);
    }
}
