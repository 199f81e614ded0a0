//! Structural and attribute edits of the corner/wall graph.

use uuid::Uuid;

use crate::error::Result;
use crate::math::distance_2d::{closest_point_on_segment, distance, point_to_segment_dist};
use crate::math::intersect_2d::segment_crossing_point_2d;
use crate::math::polygon_2d::segment_direction;
use crate::math::{Point2, Vector2};
use crate::topology::{CornerData, CornerId, Texture, WallData, WallId, WallSide};

use super::events::{DeletedItem, FloorplanEvent};
use super::Floorplan;

/// Parametric margin that keeps shared endpoints from counting as crossings.
const CROSSING_MARGIN: f64 = 1e-6;

impl Floorplan {
    // --- Corners ---

    /// Returns the corner within the corner tolerance of `position`, or
    /// registers a new one.
    ///
    /// Does not rebuild rooms; a corner on its own never closes a cycle.
    pub fn new_corner(&mut self, position: Point2, id: Option<&str>) -> CornerId {
        if let Some(existing) = self.corner_near(&position, None) {
            return existing;
        }
        let id = id.map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);
        self.insert_corner(CornerData::new(id, position, 0.0))
    }

    pub(crate) fn insert_corner(&mut self, data: CornerData) -> CornerId {
        let corner = self.store.add_corner(data);
        self.events.push(FloorplanEvent::CornerAdded(corner));
        corner
    }

    pub(crate) fn corner_near(&self, position: &Point2, except: Option<CornerId>) -> Option<CornerId> {
        let tolerance = self.config.corner_tolerance;
        self.store
            .corners()
            .find(|&(id, c)| Some(id) != except && distance(&c.position, position) < tolerance)
            .map(|(id, _)| id)
    }

    /// Moves a corner and refreshes nearby geometry without a room rebuild.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner is not in the plan.
    pub fn move_corner(&mut self, corner: CornerId, position: Point2) -> Result<()> {
        self.place_corner(corner, position)?;
        let dirty = self.with_neighbours(&[corner]);
        self.update("corner moved", false, &dirty);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the corner is not in the plan.
    pub fn relative_move_corner(&mut self, corner: CornerId, delta: Vector2) -> Result<()> {
        let position = self.store.position(corner)? + delta;
        self.move_corner(corner, position)
    }

    fn place_corner(&mut self, corner: CornerId, position: Point2) -> Result<()> {
        self.store.corner_mut(corner)?.position = position;
        self.events
            .push(FloorplanEvent::CornerMoved { corner, position });
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the corner is not in the plan.
    pub fn set_corner_elevation(&mut self, corner: CornerId, elevation: f64) -> Result<()> {
        self.store.corner_mut(corner)?.elevation = elevation;
        self.events
            .push(FloorplanEvent::CornerAttributesChanged(corner));
        let dirty = self.with_neighbours(&[corner]);
        self.update("corner elevation", false, &dirty);
        Ok(())
    }

    /// Aligns a corner with any neighbour sharing an axis within `tolerance`.
    ///
    /// Returns which axes `(x, y)` snapped.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner is not in the plan.
    pub fn snap_to_axis(&mut self, corner: CornerId, tolerance: f64) -> Result<(bool, bool)> {
        let mut position = self.store.position(corner)?;
        let mut snapped = (false, false);
        for neighbour in self.store.adjacent_corners(corner) {
            let other = self.store.position(neighbour)?;
            if (position.x - other.x).abs() < tolerance {
                position.x = other.x;
                snapped.0 = true;
            }
            if (position.y - other.y).abs() < tolerance {
                position.y = other.y;
                snapped.1 = true;
            }
        }
        if snapped.0 || snapped.1 {
            self.move_corner(corner, position)?;
        }
        Ok(snapped)
    }

    /// Removes a corner with every wall attached to it, then rebuilds once.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner is not in the plan.
    pub fn remove_corner(&mut self, corner: CornerId) -> Result<()> {
        let walls: Vec<WallId> = self.store.corner(corner)?.attached_walls().collect();
        for wall in walls {
            self.drop_wall(wall)?;
        }
        self.drop_corner(corner)?;
        self.update("corner removed", true, &[]);
        Ok(())
    }

    fn drop_corner(&mut self, corner: CornerId) -> Result<()> {
        let data = self.store.remove_corner(corner)?;
        self.events.push(FloorplanEvent::Deleted(DeletedItem::Corner {
            corner,
            id: data.id,
        }));
        Ok(())
    }

    /// Snaps `corner` onto nearby topology.
    ///
    /// A corner within the corner tolerance absorbs into `corner`; every
    /// wall passing within the tolerance is split at `corner`. Returns
    /// whether anything merged. With `rebuild` the rooms are recomputed.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner is not in the plan.
    pub fn merge_with_intersected(&mut self, corner: CornerId, rebuild: bool) -> Result<bool> {
        self.require_corner(corner)?;
        let mut merged = false;

        let position = self.store.position(corner)?;
        if let Some(other) = self.corner_near(&position, Some(corner)) {
            self.combine_with_corner(corner, other)?;
            merged = true;
        }

        let tolerance = self.config.corner_tolerance;
        let walls: Vec<WallId> = self.store.wall_ids().to_vec();
        for wall in walls {
            if !self.store.contains_wall(wall) || self.store.is_wall_connected(corner, wall) {
                continue;
            }
            let (a, b) = self.store.wall_points(wall)?;
            let p = self.store.position(corner)?;
            if point_to_segment_dist(&p, &a, &b) >= tolerance {
                continue;
            }
            self.store.corner_mut(corner)?.position = closest_point_on_segment(&p, &a, &b);
            self.split_wall(wall, corner)?;
            merged = true;
        }

        if merged && rebuild {
            self.update("corner merged", true, &[]);
        }
        Ok(merged)
    }

    /// Moves `keep` onto `other`, takes over its walls and drops it.
    fn combine_with_corner(&mut self, keep: CornerId, other: CornerId) -> Result<()> {
        let target = self.store.position(other)?;
        self.place_corner(keep, target)?;

        let walls: Vec<WallId> = self.store.corner(other)?.attached_walls().collect();
        for wall in walls {
            let data = self.store.wall(wall)?;
            if data.connects(keep, other) {
                self.drop_wall(wall)?;
            } else if data.start == other {
                self.store.set_wall_start(wall, keep)?;
            } else {
                self.store.set_wall_end(wall, keep)?;
            }
        }
        self.remove_duplicate_walls(keep)?;
        self.drop_corner(other)?;
        tracing::debug!("merged coincident corners");
        Ok(())
    }

    /// Drops later walls that join the same pair of corners as an earlier one.
    fn remove_duplicate_walls(&mut self, corner: CornerId) -> Result<()> {
        let walls: Vec<WallId> = self.store.corner(corner)?.attached_walls().collect();
        let mut seen: Vec<CornerId> = Vec::new();
        for wall in walls {
            let Some(far) = self.store.wall(wall)?.opposite_corner(corner) else {
                continue;
            };
            if seen.contains(&far) {
                self.drop_wall(wall)?;
            } else {
                seen.push(far);
            }
        }
        Ok(())
    }

    /// Splits `wall` at `corner`: the wall now ends there and a copy
    /// continues to the old end.
    fn split_wall(&mut self, wall: WallId, corner: CornerId) -> Result<WallId> {
        let data = self.store.wall(wall)?;
        let mut tail = WallData::new(corner, data.end, data.thickness, data.height);
        tail.front_texture = data.front_texture.clone();
        tail.back_texture = data.back_texture.clone();
        let tail = self.store.add_wall(tail)?;
        self.events.push(FloorplanEvent::WallAdded(tail));
        self.store.set_wall_end(wall, corner)?;
        Ok(tail)
    }

    // --- Walls ---

    /// Creates a wall with the configured thickness and height and rebuilds.
    ///
    /// # Errors
    ///
    /// Returns an error if either corner is missing or both are the same.
    pub fn new_wall(&mut self, start: CornerId, end: CornerId) -> Result<WallId> {
        let data = WallData::new(start, end, self.config.wall_thickness, self.config.wall_height);
        let wall = self.store.add_wall(data)?;
        self.events.push(FloorplanEvent::WallAdded(wall));
        self.update("new wall", true, &[]);
        Ok(wall)
    }

    /// Splits every existing wall that the segment `start → end` crosses.
    ///
    /// Each true crossing gets a corner which is then merged into the
    /// crossed walls. Returns whether any crossing was found.
    ///
    /// # Errors
    ///
    /// Returns an error if either corner is not in the plan.
    pub fn new_walls_for_intersections(&mut self, start: CornerId, end: CornerId) -> Result<bool> {
        let a0 = self.store.position(start)?;
        let a1 = self.store.position(end)?;
        let walls: Vec<WallId> = self.store.wall_ids().to_vec();

        let mut found = false;
        for wall in walls {
            let Ok(data) = self.store.wall(wall) else {
                continue;
            };
            if data.touches(start) || data.touches(end) {
                continue;
            }
            let (b0, b1) = self.store.wall_points(wall)?;
            let Some(point) = segment_crossing_point_2d(&a0, &a1, &b0, &b1, CROSSING_MARGIN) else {
                continue;
            };
            let corner = self.new_corner(point, None);
            self.merge_with_intersected(corner, false)?;
            found = true;
        }

        if found {
            tracing::debug!("inserted corners at wall crossings");
        }
        self.update("wall intersections", true, &[]);
        Ok(found)
    }

    /// Removes a wall, leaving its corners in place, and rebuilds.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall is not in the plan.
    pub fn remove_wall(&mut self, wall: WallId) -> Result<()> {
        self.drop_wall(wall)?;
        self.update("wall removed", true, &[]);
        Ok(())
    }

    fn drop_wall(&mut self, wall: WallId) -> Result<()> {
        let uuid = self.store.wall_uuid(wall)?;
        self.store.remove_wall(wall)?;
        self.events
            .push(FloorplanEvent::Deleted(DeletedItem::Wall { wall, uuid }));
        Ok(())
    }

    /// Moves a wall so its centre lands on `center`.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall is not in the plan.
    pub fn move_wall(&mut self, wall: WallId, center: Point2) -> Result<()> {
        let (a, b) = self.store.wall_points(wall)?;
        self.relative_move_wall(wall, center - nalgebra::center(&a, &b))
    }

    /// Translates both corners of a wall (drag tier).
    ///
    /// # Errors
    ///
    /// Returns an error if the wall is not in the plan.
    pub fn relative_move_wall(&mut self, wall: WallId, delta: Vector2) -> Result<()> {
        let data = self.store.wall(wall)?;
        let (start, end) = (data.start, data.end);
        let (a, b) = self.store.wall_points(wall)?;
        self.place_corner(start, a + delta)?;
        self.place_corner(end, b + delta)?;
        let dirty = self.with_neighbours(&[start, end]);
        self.update("wall moved", false, &dirty);
        Ok(())
    }

    /// Resizes a wall to `length`.
    ///
    /// An end attached to no other wall is free; a free end absorbs the
    /// whole change. With both or neither end free, the change is split.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall is missing or has zero length.
    pub fn set_wall_size(&mut self, wall: WallId, length: f64) -> Result<()> {
        let data = self.store.wall(wall)?;
        let (start, end) = (data.start, data.end);
        let (a, b) = self.store.wall_points(wall)?;
        let direction = segment_direction(&a, &b)?;
        let delta = length - distance(&a, &b);

        let start_free = self.store.adjacent_corners(start).len() == 1;
        let end_free = self.store.adjacent_corners(end).len() == 1;
        let (at_start, at_end) = match (start_free, end_free) {
            (true, false) => (delta, 0.0),
            (false, true) => (0.0, delta),
            _ => (delta * 0.5, delta * 0.5),
        };

        self.place_corner(start, a - direction * at_start)?;
        self.place_corner(end, b + direction * at_end)?;
        self.update("wall resized", true, &[]);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the wall is not in the plan.
    pub fn set_wall_thickness(&mut self, wall: WallId, thickness: f64) -> Result<()> {
        self.store.wall_mut(wall)?.thickness = thickness;
        self.wall_attributes_changed(wall)
    }

    /// # Errors
    ///
    /// Returns an error if the wall is not in the plan.
    pub fn set_wall_height(&mut self, wall: WallId, height: f64) -> Result<()> {
        self.store.wall_mut(wall)?.height = height;
        self.wall_attributes_changed(wall)
    }

    /// # Errors
    ///
    /// Returns an error if the wall is not in the plan.
    pub fn set_wall_texture(&mut self, wall: WallId, side: WallSide, texture: Texture) -> Result<()> {
        self.store.wall_mut(wall)?.set_texture(side, texture);
        self.wall_attributes_changed(wall)
    }

    fn wall_attributes_changed(&mut self, wall: WallId) -> Result<()> {
        let data = self.store.wall(wall)?;
        let dirty = self.with_neighbours(&[data.start, data.end]);
        self.events.push(FloorplanEvent::WallAttributesChanged(wall));
        self.update("wall attributes", false, &dirty);
        Ok(())
    }

    /// Elevations of the wall's start and end corners.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall or one of its corners is missing.
    pub fn wall_elevations(&self, wall: WallId) -> Result<(f64, f64)> {
        let data = self.store.wall(wall)?;
        Ok((
            self.store.corner(data.start)?.elevation,
            self.store.corner(data.end)?.elevation,
        ))
    }

    /// # Errors
    ///
    /// Returns an error if the wall or its start corner is missing.
    pub fn start_elevation(&self, wall: WallId) -> Result<f64> {
        Ok(self.wall_elevations(wall)?.0)
    }

    /// # Errors
    ///
    /// Returns an error if the wall or its end corner is missing.
    pub fn end_elevation(&self, wall: WallId) -> Result<f64> {
        Ok(self.wall_elevations(wall)?.1)
    }

    /// # Errors
    ///
    /// Returns an error if the wall is not in the plan.
    pub fn attach_item(&mut self, wall: WallId, item: impl Into<String>) -> Result<()> {
        self.store.wall_mut(wall)?.attach_item(item);
        Ok(())
    }

    /// Returns whether the item was attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall is not in the plan.
    pub fn detach_item(&mut self, wall: WallId, item: &str) -> Result<bool> {
        Ok(self.store.wall_mut(wall)?.detach_item(item))
    }
}
