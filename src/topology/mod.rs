pub mod corner;
pub mod half_edge;
pub mod room;
pub mod wall;

pub use corner::{compute_wedges, CornerData, CornerId, CornerWedge};
pub use half_edge::{half_angle_vector, EdgeSegment, FaceFrame, HalfEdge, HalfEdgeId, PlaneBounds};
pub use room::{Room, RoomAttributes};
pub use wall::{Texture, WallData, WallId, WallSide};

use crate::error::TopologyError;
use crate::math::Point2;
use slotmap::SlotMap;

/// Central arena that owns all corners and walls.
///
/// Entities reference each other via typed IDs (generational indices).
/// Insertion order is tracked separately because room discovery and
/// persistence both depend on it, and slot reuse would scramble it.
#[derive(Debug, Default, Clone)]
pub struct TopologyStore {
    corners: SlotMap<CornerId, CornerData>,
    walls: SlotMap<WallId, WallData>,
    corner_order: Vec<CornerId>,
    wall_order: Vec<WallId>,
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every corner and wall.
    pub fn clear(&mut self) {
        self.corners.clear();
        self.walls.clear();
        self.corner_order.clear();
        self.wall_order.clear();
    }

    // --- Corner operations ---

    /// Inserts a corner and returns its ID.
    pub fn add_corner(&mut self, data: CornerData) -> CornerId {
        let id = self.corners.insert(data);
        self.corner_order.push(id);
        id
    }

    /// Returns a reference to the corner data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn corner(&self, id: CornerId) -> Result<&CornerData, TopologyError> {
        self.corners
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("corner".into()))
    }

    /// Returns a mutable reference to the corner data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn corner_mut(&mut self, id: CornerId) -> Result<&mut CornerData, TopologyError> {
        self.corners
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("corner".into()))
    }

    /// Position of a corner.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn position(&self, id: CornerId) -> Result<Point2, TopologyError> {
        Ok(self.corner(id)?.position)
    }

    /// Removes a corner that no wall references any more.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` for a stale id and `InvalidTopology` if
    /// walls are still attached.
    pub fn remove_corner(&mut self, id: CornerId) -> Result<CornerData, TopologyError> {
        if !self.corner(id)?.is_detached() {
            return Err(TopologyError::InvalidTopology(
                "corner still has attached walls".into(),
            ));
        }
        self.corner_order.retain(|&c| c != id);
        self.corners
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("corner".into()))
    }

    /// Corner IDs in insertion order.
    #[must_use]
    pub fn corner_ids(&self) -> &[CornerId] {
        &self.corner_order
    }

    /// Corners in insertion order.
    pub fn corners(&self) -> impl Iterator<Item = (CornerId, &CornerData)> {
        self.corner_order
            .iter()
            .filter_map(|&id| self.corners.get(id).map(|c| (id, c)))
    }

    #[must_use]
    pub fn num_corners(&self) -> usize {
        self.corners.len()
    }

    #[must_use]
    pub fn contains_corner(&self, id: CornerId) -> bool {
        self.corners.contains_key(id)
    }

    /// Looks a corner up by its persisted id.
    #[must_use]
    pub fn find_corner(&self, persisted_id: &str) -> Option<CornerId> {
        self.corners()
            .find(|(_, c)| c.id == persisted_id)
            .map(|(id, _)| id)
    }

    /// Corners one wall away, ends of outgoing walls first.
    #[must_use]
    pub fn adjacent_corners(&self, id: CornerId) -> Vec<CornerId> {
        let Ok(corner) = self.corner(id) else {
            return Vec::new();
        };
        let outgoing = corner
            .wall_starts
            .iter()
            .filter_map(|&w| self.walls.get(w).map(|w| w.end));
        let incoming = corner
            .wall_ends
            .iter()
            .filter_map(|&w| self.walls.get(w).map(|w| w.start));

        let mut adjacent = Vec::new();
        for c in outgoing.chain(incoming) {
            if c != id && !adjacent.contains(&c) {
                adjacent.push(c);
            }
        }
        adjacent
    }

    /// The wall running from `from` to `to`.
    #[must_use]
    pub fn wall_to(&self, from: CornerId, to: CornerId) -> Option<WallId> {
        let corner = self.corners.get(from)?;
        corner
            .wall_starts
            .iter()
            .copied()
            .find(|&w| self.walls.get(w).is_some_and(|w| w.end == to))
    }

    /// The wall running from `other` into `corner`.
    #[must_use]
    pub fn wall_from(&self, corner: CornerId, other: CornerId) -> Option<WallId> {
        let data = self.corners.get(corner)?;
        data.wall_ends
            .iter()
            .copied()
            .find(|&w| self.walls.get(w).is_some_and(|w| w.start == other))
    }

    /// Any wall joining the two corners.
    #[must_use]
    pub fn wall_to_or_from(&self, a: CornerId, b: CornerId) -> Option<WallId> {
        self.wall_to(a, b).or_else(|| self.wall_from(a, b))
    }

    /// Whether `wall` is attached to `corner`.
    #[must_use]
    pub fn is_wall_connected(&self, corner: CornerId, wall: WallId) -> bool {
        self.corners
            .get(corner)
            .is_some_and(|c| c.wall_starts.contains(&wall) || c.wall_ends.contains(&wall))
    }

    // --- Wall operations ---

    /// Inserts a wall and attaches it to its corners.
    ///
    /// # Errors
    ///
    /// Returns `SelfLoop` if both ends are the same corner and
    /// `EntityNotFound` if either corner is missing.
    pub fn add_wall(&mut self, data: WallData) -> Result<WallId, TopologyError> {
        if data.start == data.end {
            return Err(TopologyError::SelfLoop);
        }
        self.corner(data.start)?;
        self.corner(data.end)?;
        let (start, end) = (data.start, data.end);
        let id = self.walls.insert(data);
        self.wall_order.push(id);
        self.corner_mut(start)?.attach_start(id);
        self.corner_mut(end)?.attach_end(id);
        Ok(id)
    }

    /// Returns a reference to the wall data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn wall(&self, id: WallId) -> Result<&WallData, TopologyError> {
        self.walls
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("wall".into()))
    }

    /// Returns a mutable reference to the wall data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn wall_mut(&mut self, id: WallId) -> Result<&mut WallData, TopologyError> {
        self.walls
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("wall".into()))
    }

    /// Detaches a wall from both corners and drops it.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn remove_wall(&mut self, id: WallId) -> Result<WallData, TopologyError> {
        let data = self
            .walls
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("wall".into()))?;
        self.wall_order.retain(|&w| w != id);
        for corner in [data.start, data.end] {
            if let Some(c) = self.corners.get_mut(corner) {
                c.detach_wall(id);
            }
        }
        Ok(data)
    }

    /// Reattaches the start of a wall to another corner.
    ///
    /// # Errors
    ///
    /// Returns an error if either entity is missing or the wall would
    /// become a self-loop.
    pub fn set_wall_start(&mut self, wall: WallId, corner: CornerId) -> Result<(), TopologyError> {
        self.reattach(wall, corner, true)
    }

    /// Reattaches the end of a wall to another corner.
    ///
    /// # Errors
    ///
    /// Returns an error if either entity is missing or the wall would
    /// become a self-loop.
    pub fn set_wall_end(&mut self, wall: WallId, corner: CornerId) -> Result<(), TopologyError> {
        self.reattach(wall, corner, false)
    }

    fn reattach(&mut self, wall: WallId, corner: CornerId, start: bool) -> Result<(), TopologyError> {
        self.corner(corner)?;
        let data = self.wall(wall)?;
        let (old, other) = if start {
            (data.start, data.end)
        } else {
            (data.end, data.start)
        };
        if other == corner {
            return Err(TopologyError::SelfLoop);
        }
        if let Some(c) = self.corners.get_mut(old) {
            c.detach_wall(wall);
        }
        let data = self.wall_mut(wall)?;
        if start {
            data.start = corner;
        } else {
            data.end = corner;
        }
        let target = self.corner_mut(corner)?;
        if start {
            target.attach_start(wall);
        } else {
            target.attach_end(wall);
        }
        Ok(())
    }

    /// Wall IDs in insertion order.
    #[must_use]
    pub fn wall_ids(&self) -> &[WallId] {
        &self.wall_order
    }

    /// Walls in insertion order.
    pub fn walls(&self) -> impl Iterator<Item = (WallId, &WallData)> {
        self.wall_order
            .iter()
            .filter_map(|&id| self.walls.get(id).map(|w| (id, w)))
    }

    /// Mutable access to every wall, in arena order.
    pub fn walls_mut(&mut self) -> impl Iterator<Item = (WallId, &mut WallData)> {
        self.walls.iter_mut()
    }

    #[must_use]
    pub fn num_walls(&self) -> usize {
        self.walls.len()
    }

    #[must_use]
    pub fn contains_wall(&self, id: WallId) -> bool {
        self.walls.contains_key(id)
    }

    /// Both endpoint positions of a wall.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall or one of its corners is missing.
    pub fn wall_points(&self, id: WallId) -> Result<(Point2, Point2), TopologyError> {
        let wall = self.wall(id)?;
        Ok((self.position(wall.start)?, self.position(wall.end)?))
    }

    /// Persisted identity of a wall: `"start_id,end_id"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall or one of its corners is missing.
    pub fn wall_uuid(&self, id: WallId) -> Result<String, TopologyError> {
        let wall = self.wall(id)?;
        Ok(format!(
            "{},{}",
            self.corner(wall.start)?.id,
            self.corner(wall.end)?.id
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store_with_corners(n: usize) -> (TopologyStore, Vec<CornerId>) {
        let mut store = TopologyStore::new();
        let ids = (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let x = i as f64 * 100.0;
                store.add_corner(CornerData::new(format!("c{i}"), Point2::new(x, 0.0), 0.0))
            })
            .collect();
        (store, ids)
    }

    #[test]
    fn add_wall_attaches_corners() {
        let (mut store, c) = store_with_corners(3);
        let w = store.add_wall(WallData::new(c[0], c[1], 20.0, 300.0)).unwrap();
        assert!(store.is_wall_connected(c[0], w));
        assert!(store.is_wall_connected(c[1], w));
        assert_eq!(store.wall_to(c[0], c[1]), Some(w));
        assert_eq!(store.wall_from(c[1], c[0]), Some(w));
        assert_eq!(store.wall_to_or_from(c[1], c[0]), Some(w));
        assert_eq!(store.wall_to(c[1], c[0]), None);
        assert_eq!(store.wall_uuid(w).unwrap(), "c0,c1");
    }

    #[test]
    fn self_loop_rejected() {
        let (mut store, c) = store_with_corners(1);
        let err = store.add_wall(WallData::new(c[0], c[0], 20.0, 300.0));
        assert!(matches!(err, Err(TopologyError::SelfLoop)));
    }

    #[test]
    fn adjacency_and_removal() {
        let (mut store, c) = store_with_corners(3);
        let w01 = store.add_wall(WallData::new(c[0], c[1], 20.0, 300.0)).unwrap();
        store.add_wall(WallData::new(c[2], c[0], 20.0, 300.0)).unwrap();
        assert_eq!(store.adjacent_corners(c[0]), vec![c[1], c[2]]);

        assert!(store.remove_corner(c[0]).is_err());
        store.remove_wall(w01).unwrap();
        assert_eq!(store.adjacent_corners(c[0]), vec![c[2]]);
        assert!(store.corner(c[1]).unwrap().is_detached());
        store.remove_corner(c[1]).unwrap();
        assert_eq!(store.corner_ids(), &[c[0], c[2]]);
        assert!(store.corner(c[1]).is_err());
    }

    #[test]
    fn reattach_wall_end() {
        let (mut store, c) = store_with_corners(3);
        let w = store.add_wall(WallData::new(c[0], c[1], 20.0, 300.0)).unwrap();
        store.set_wall_end(w, c[2]).unwrap();
        assert_eq!(store.wall(w).unwrap().end, c[2]);
        assert!(store.corner(c[1]).unwrap().is_detached());
        assert!(matches!(store.set_wall_end(w, c[0]), Err(TopologyError::SelfLoop)));
    }

    #[test]
    fn insertion_order_survives_slot_reuse() {
        let (mut store, c) = store_with_corners(2);
        store.remove_corner(c[0]).unwrap();
        let d = store.add_corner(CornerData::new("late", Point2::new(5.0, 5.0), 0.0));
        assert_eq!(store.corner_ids(), &[c[1], d]);
        assert_eq!(store.find_corner("late"), Some(d));
    }
}
