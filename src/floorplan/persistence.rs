//! Load and save of the persisted floor-plan document.
//!
//! Positions are written in the configured display unit's raw form and
//! converted back to centimetres on load. Corners keep their document
//! order so that room cycle ids survive a round trip.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::config::Unit;
use crate::error::{PersistenceError, Result};
use crate::math::Point2;
use crate::topology::{CornerData, CornerId, RoomAttributes, Texture, WallData};

use super::annotations::{Image2D, TextLabel};
use super::events::FloorplanEvent;
use super::Floorplan;

pub const DOCUMENT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerRecord {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub elevation: f64,
}

/// Corner records keyed by persisted id, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CornerTable(pub Vec<(String, CornerRecord)>);

impl Serialize for CornerTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, record) in &self.0 {
            map.serialize_entry(id, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CornerTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = CornerTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of corner ids to positions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, CornerRecord>()? {
                    entries.push(entry);
                }
                Ok(CornerTable(entries))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallRecord {
    pub corner1: String,
    pub corner2: String,
    #[serde(default)]
    pub front_texture: Texture,
    #[serde(default)]
    pub back_texture: Texture,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// The persisted form of a [`Floorplan`].
///
/// Every key is optional on input; a document without `corners` or
/// `walls` loads as a no-op.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorplanDocument {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub corners: Option<CornerTable>,
    #[serde(default)]
    pub walls: Option<Vec<WallRecord>>,
    #[serde(default)]
    pub rooms: Option<BTreeMap<String, RoomAttributes>>,
    #[serde(default)]
    pub wall_textures: Vec<Texture>,
    #[serde(default)]
    pub floor_textures: BTreeMap<String, Texture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_floor_textures: Option<BTreeMap<String, Texture>>,
    /// Unit name; anything but a known unit string is ignored.
    #[serde(default)]
    pub units: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<TextLabel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<Image2D>>,
}

impl Floorplan {
    /// Parses and loads a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Malformed` if the text is not a valid
    /// document; the plan is left untouched in that case.
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        let document: FloorplanDocument = serde_json::from_str(json).map_err(PersistenceError::from)?;
        self.load_document(document);
        Ok(())
    }

    /// Replaces the plan with the document contents and rebuilds rooms.
    pub fn load_document(&mut self, document: FloorplanDocument) {
        let (Some(corners), Some(walls)) = (document.corners, document.walls) else {
            tracing::debug!("document has no corners or walls; load skipped");
            return;
        };

        self.reset();

        if let Some(units) = document.units {
            match units.as_str().and_then(Unit::parse) {
                Some(unit) => self.config.unit = unit,
                None => tracing::warn!(%units, "unknown unit in document; keeping current unit"),
            }
        }
        let unit = self.config.unit;

        let mut by_id: HashMap<String, CornerId> = HashMap::with_capacity(corners.0.len());
        for (id, record) in corners.0 {
            let position = Point2::new(unit.cm_from_measure_raw(record.x), unit.cm_from_measure_raw(record.y));
            if let Some(existing) = self.corner_near(&position, None) {
                tracing::debug!(%id, "corner within tolerance of an earlier one; merged");
                by_id.insert(id, existing);
                continue;
            }
            let key = if self.store.find_corner(&id).is_some() {
                let fresh = Uuid::new_v4().to_string();
                tracing::warn!(%id, %fresh, "duplicate corner id in document; assigning a new one");
                fresh
            } else {
                id.clone()
            };
            let elevation = unit.cm_from_measure_raw(record.elevation);
            let corner = self.insert_corner(CornerData::new(key, position, elevation));
            by_id.insert(id, corner);
        }

        for record in walls {
            let (Some(&start), Some(&end)) = (by_id.get(&record.corner1), by_id.get(&record.corner2)) else {
                tracing::warn!(
                    corner1 = %record.corner1,
                    corner2 = %record.corner2,
                    "wall references an unknown corner; skipped"
                );
                continue;
            };
            if start == end || self.store.wall_to_or_from(start, end).is_some() {
                tracing::debug!(
                    corner1 = %record.corner1,
                    corner2 = %record.corner2,
                    "wall collapsed or duplicated by merged corners; skipped"
                );
                continue;
            }
            let thickness = record
                .thickness
                .map_or(self.config.wall_thickness, |t| unit.cm_from_measure_raw(t));
            let height = record
                .height
                .map_or(self.config.wall_height, |h| unit.cm_from_measure_raw(h));
            let mut data = WallData::new(start, end, thickness, height);
            data.front_texture = record.front_texture;
            data.back_texture = record.back_texture;
            match self.store.add_wall(data) {
                Ok(wall) => self.events.push(FloorplanEvent::WallAdded(wall)),
                Err(err) => tracing::warn!(%err, "invalid wall in document; skipped"),
            }
        }

        self.saved_rooms = document.rooms.unwrap_or_default();
        self.floor_textures = document.floor_textures;
        if let Some(textures) = document.new_floor_textures {
            self.floor_textures.extend(textures);
        }
        if let Some(labels) = document.labels {
            self.labels = labels;
        }
        if let Some(images) = document.images {
            self.images = images;
        }

        self.update("load", true, &[]);
        self.events.push(FloorplanEvent::Loaded);
    }

    /// Builds the persisted form of the current plan.
    ///
    /// Only corners referenced by a wall are written, in insertion order.
    #[must_use]
    pub fn save_document(&self) -> FloorplanDocument {
        let unit = self.config.unit;

        let corners = self
            .store
            .corners()
            .filter(|(_, c)| !c.is_detached())
            .map(|(_, c)| {
                let record = CornerRecord {
                    x: unit.cm_to_measure_raw(c.position.x, 1),
                    y: unit.cm_to_measure_raw(c.position.y, 1),
                    elevation: unit.cm_to_measure_raw(c.elevation, 1),
                };
                (c.id.clone(), record)
            })
            .collect();

        let persisted_id = |c: CornerId| self.store.corner(c).map(|c| c.id.clone()).unwrap_or_default();
        let walls = self
            .store
            .walls()
            .map(|(_, w)| WallRecord {
                corner1: persisted_id(w.start),
                corner2: persisted_id(w.end),
                front_texture: w.front_texture.clone(),
                back_texture: w.back_texture.clone(),
                thickness: Some(unit.cm_to_measure_raw(w.thickness, 1)),
                height: Some(unit.cm_to_measure_raw(w.height, 1)),
            })
            .collect();

        let rooms = self
            .rooms
            .iter()
            .map(|r| (r.cycle_id(), r.attributes.clone()))
            .collect();

        FloorplanDocument {
            version: DOCUMENT_VERSION.to_owned(),
            corners: Some(CornerTable(corners)),
            walls: Some(walls),
            rooms: Some(rooms),
            wall_textures: Vec::new(),
            floor_textures: BTreeMap::new(),
            new_floor_textures: Some(self.floor_textures.clone()),
            units: Some(serde_json::Value::from(unit.as_str())),
            labels: Some(self.labels.clone()),
            images: Some(self.images.clone()),
        }
    }

    /// # Errors
    ///
    /// Returns `PersistenceError::Malformed` if serialization fails.
    pub fn save_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.save_document()).map_err(PersistenceError::from)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::FloorplanError;
    use approx::assert_relative_eq;

    fn l_shape(unit: Unit) -> Floorplan {
        let mut plan = Floorplan::with_config(Config {
            unit,
            ..Config::default()
        });
        let pts = [
            (0.0, 0.0),
            (400.0, 0.0),
            (400.0, 200.0),
            (200.0, 200.0),
            (200.0, 400.0),
            (0.0, 400.0),
        ];
        let ids: Vec<CornerId> = pts
            .iter()
            .map(|&(x, y)| plan.new_corner(Point2::new(x, y), None))
            .collect();
        for i in 0..ids.len() {
            plan.new_wall(ids[i], ids[(i + 1) % ids.len()]).unwrap();
        }
        plan
    }

    #[test]
    fn round_trip_preserves_corners_walls_and_rooms() {
        let mut plan = l_shape(Unit::Meter);
        assert_eq!(plan.rooms().len(), 1);
        let cycle = plan.rooms()[0].cycle_id();
        let mut attrs = RoomAttributes::named("Kitchen");
        attrs.room_type = "kitchen".into();
        attrs.tags = vec!["tiled".into()];
        assert!(plan.set_room_attributes(&cycle, attrs.clone()));

        let json = plan.save_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["units"], "m");
        assert_eq!(value["corners"].as_object().unwrap().len(), 6);
        assert_eq!(value["rooms"][&cycle]["name"], "Kitchen");

        let mut loaded = Floorplan::new();
        loaded.load_json(&json).unwrap();
        assert_eq!(loaded.config().unit, Unit::Meter);
        assert_eq!(loaded.store().num_corners(), 6);
        assert_eq!(loaded.store().num_walls(), 6);
        for ((_, a), (_, b)) in plan.store().corners().zip(loaded.store().corners()) {
            assert_eq!(a.id, b.id);
            assert!((a.position - b.position).norm() < 1e-6);
        }
        for ((_, a), (_, b)) in plan.store().walls().zip(loaded.store().walls()) {
            assert_eq!(loaded.store().corner(b.start).unwrap().id, plan.store().corner(a.start).unwrap().id);
            assert_eq!(loaded.store().corner(b.end).unwrap().id, plan.store().corner(a.end).unwrap().id);
        }
        assert_eq!(loaded.rooms().len(), 1);
        assert_eq!(loaded.rooms()[0].cycle_id(), cycle);
        assert_eq!(loaded.rooms()[0].attributes, attrs);
        assert_eq!(loaded.drain_events().last(), Some(&FloorplanEvent::Loaded));
    }

    #[test]
    fn document_without_walls_is_a_no_op() {
        let mut plan = l_shape(Unit::Centimeter);
        plan.load_json(r#"{ "corners": {}, "units": "m" }"#).unwrap();
        assert_eq!(plan.store().num_walls(), 6);
        assert_eq!(plan.config().unit, Unit::Centimeter);
    }

    #[test]
    fn malformed_json_is_an_error_and_keeps_state() {
        let mut plan = l_shape(Unit::Centimeter);
        let err = plan.load_json("{ not json").unwrap_err();
        assert!(matches!(err, FloorplanError::Persistence(PersistenceError::Malformed(_))));
        assert_eq!(plan.rooms().len(), 1);
    }

    #[test]
    fn unknown_unit_and_missing_corner_are_tolerated() {
        let json = r#"{
            "corners": {
                "a": { "x": 0, "y": 0 },
                "b": { "x": 300, "y": 0 },
                "c": { "x": 300, "y": 300 }
            },
            "walls": [
                { "corner1": "a", "corner2": "b" },
                { "corner1": "b", "corner2": "c" },
                { "corner1": "c", "corner2": "zz" }
            ],
            "units": { "unexpected": true }
        }"#;
        let mut plan = Floorplan::new();
        plan.load_json(json).unwrap();
        assert_eq!(plan.config().unit, Unit::Centimeter);
        assert_eq!(plan.store().num_walls(), 2);
        assert!(plan.rooms().is_empty());
        let wall = plan.store().wall_ids()[0];
        assert_eq!(plan.wall(wall).unwrap().thickness, plan.config().wall_thickness);
    }

    #[test]
    fn corners_within_tolerance_merge_on_load() {
        let json = r#"{
            "corners": {
                "a": { "x": 0, "y": 0 },
                "b": { "x": 5, "y": 0 },
                "c": { "x": 300, "y": 0 }
            },
            "walls": [
                { "corner1": "a", "corner2": "b" },
                { "corner1": "b", "corner2": "c" },
                { "corner1": "a", "corner2": "c" }
            ]
        }"#;
        let mut plan = Floorplan::new();
        plan.load_json(json).unwrap();
        assert_eq!(plan.store().num_corners(), 2);
        assert_eq!(plan.store().num_walls(), 1);
        let ids: Vec<&str> = plan.store().corners().map(|(_, c)| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn elevation_is_converted_with_the_document_unit() {
        let json = r#"{
            "corners": {
                "a": { "x": 0, "y": 0, "elevation": 4 },
                "b": { "x": 3, "y": 0, "elevation": 2.5 }
            },
            "walls": [{ "corner1": "a", "corner2": "b" }],
            "units": "m"
        }"#;
        let mut plan = Floorplan::new();
        plan.load_json(json).unwrap();
        let elevations: Vec<f64> = plan.store().corners().map(|(_, c)| c.elevation).collect();
        assert_eq!(elevations, [400.0, 250.0]);
        let wall = plan.store().wall_ids()[0];
        assert_relative_eq!(plan.wall_length(wall), 300.0);

        let saved: serde_json::Value = serde_json::from_str(&plan.save_json().unwrap()).unwrap();
        assert_eq!(saved["corners"]["a"]["elevation"], 4.0);
        assert_eq!(saved["corners"]["b"]["elevation"], 2.5);
    }

    #[test]
    fn corner_order_follows_document_not_key_order() {
        let json = r#"{
            "corners": {
                "z": { "x": 0, "y": 0 },
                "m": { "x": 300, "y": 0 },
                "a": { "x": 300, "y": 300 }
            },
            "walls": [
                { "corner1": "z", "corner2": "m" },
                { "corner1": "m", "corner2": "a" },
                { "corner1": "a", "corner2": "z" }
            ],
            "rooms": { "z,m,a": { "name": "Study" } }
        }"#;
        let mut plan = Floorplan::new();
        plan.load_json(json).unwrap();
        let ids: Vec<&str> = plan.store().corners().map(|(_, c)| c.id.as_str()).collect();
        assert_eq!(ids, ["z", "m", "a"]);
        assert_eq!(plan.rooms()[0].name(), "Study");
    }

    #[test]
    fn annotations_and_floor_textures_persist() {
        let mut plan = l_shape(Unit::Centimeter);
        let texture = Texture {
            url: "rooms/textures/oak.jpg".into(),
            stretch: false,
            scale: 300.0,
        };
        let uuid = plan.rooms()[0].uuid();
        plan.set_floor_texture(uuid.clone(), texture.clone());

        let document = plan.save_document();
        let mut loaded = Floorplan::new();
        loaded.load_document(document);
        assert_eq!(loaded.floor_texture(&uuid), Some(&texture));
        assert!(loaded.labels().is_empty());
    }
}
