//! Engine configuration.
//!
//! A [`Config`] is owned by each [`Floorplan`](crate::floorplan::Floorplan)
//! and passed explicitly to every unit or screen conversion.

mod defaults;
pub mod units;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub use units::{cm_to_pixel, pixel_to_cm, Unit};

/// Tunable parameters of the floor-plan engine.
///
/// All lengths are centimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Display and persistence unit.
    #[serde(default = "defaults::unit")]
    pub unit: Unit,

    /// Height given to newly drawn walls.
    #[serde(default = "defaults::wall_height")]
    pub wall_height: f64,

    /// Thickness given to newly drawn walls.
    #[serde(default = "defaults::wall_thickness")]
    pub wall_thickness: f64,

    /// Zoom scale used by pixel conversions.
    #[serde(default = "defaults::scale")]
    pub scale: f64,

    /// Spacing of the drawing grid.
    #[serde(default = "defaults::grid_spacing")]
    pub grid_spacing: f64,

    /// Distance under which two positions are the same corner.
    #[serde(default = "defaults::corner_tolerance")]
    pub corner_tolerance: f64,

    /// Pick radius for walls, labels and images.
    #[serde(default = "defaults::hit_tolerance")]
    pub hit_tolerance: f64,

    /// Enables verbose rebuild diagnostics.
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unit: defaults::unit(),
            wall_height: defaults::wall_height(),
            wall_thickness: defaults::wall_thickness(),
            scale: defaults::scale(),
            grid_spacing: defaults::grid_spacing(),
            corner_tolerance: defaults::corner_tolerance(),
            hit_tolerance: defaults::hit_tolerance(),
            debug: false,
        }
    }
}

impl Config {
    /// Parses a configuration from JSON; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` on malformed JSON and
    /// `ConfigError::Invalid` if a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`Config::from_json`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Loads a configuration file, falling back to defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file missing, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Serializes the configuration to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that all lengths are usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("wall_height", self.wall_height),
            ("wall_thickness", self.wall_thickness),
            ("scale", self.scale),
            ("grid_spacing", self.grid_spacing),
            ("corner_tolerance", self.corner_tolerance),
            ("hit_tolerance", self.hit_tolerance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        Ok(())
    }
}
