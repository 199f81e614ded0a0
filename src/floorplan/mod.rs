//! The floor-plan aggregate.
//!
//! [`Floorplan`] owns the corner/wall arena, the derived rooms and
//! half-edges, the 2D annotations and the notification queue. Every
//! structural mutation funnels through [`Floorplan::update`].

pub mod annotations;
pub mod edit;
pub mod events;
pub mod persistence;
pub mod rooms;

use std::collections::{BTreeMap, HashSet};

use slotmap::SlotMap;

use crate::config::{Config, Unit};
use crate::error::{Result, TopologyError};
use crate::math::distance_2d::{distance, point_to_segment_dist};
use crate::math::{Point2, Point3, Vector3};
use crate::topology::room::sorted_corner_key;
use crate::topology::{
    compute_wedges, CornerData, CornerId, EdgeSegment, HalfEdge, HalfEdgeId, Room, RoomAttributes,
    Texture, TopologyStore, WallData, WallId, WallSide,
};

pub use annotations::{AlignType, Image2D, ImageSize, ImageSource, LabelStyle, Position, TextLabel};
pub use events::{DeletedItem, FloorplanEvent};
pub use persistence::FloorplanDocument;

/// A mutable planar graph of corners and walls with derived rooms.
#[derive(Debug, Clone)]
pub struct Floorplan {
    config: Config,
    store: TopologyStore,
    rooms: Vec<Room>,
    half_edges: SlotMap<HalfEdgeId, HalfEdge>,
    labels: Vec<TextLabel>,
    images: Vec<Image2D>,
    floor_textures: BTreeMap<String, Texture>,
    /// Room attributes by corner-cycle id, carried across rebuilds.
    saved_rooms: BTreeMap<String, RoomAttributes>,
    events: Vec<FloorplanEvent>,
}

impl Default for Floorplan {
    fn default() -> Self {
        Self::new()
    }
}

impl Floorplan {
    /// Creates an empty floor plan with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            store: TopologyStore::new(),
            rooms: Vec::new(),
            half_edges: SlotMap::with_key(),
            labels: Vec::new(),
            images: Vec::new(),
            floor_textures: BTreeMap::new(),
            saved_rooms: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Switches the display/persistence unit. Geometry is unaffected.
    pub fn set_unit(&mut self, unit: Unit) {
        self.config.unit = unit;
    }

    #[must_use]
    pub fn store(&self) -> &TopologyStore {
        &self.store
    }

    /// # Errors
    ///
    /// Returns an error if the corner is not in the plan.
    pub fn corner(&self, id: CornerId) -> Result<&CornerData> {
        Ok(self.store.corner(id)?)
    }

    /// # Errors
    ///
    /// Returns an error if the wall is not in the plan.
    pub fn wall(&self, id: WallId) -> Result<&WallData> {
        Ok(self.store.wall(id)?)
    }

    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    #[must_use]
    pub fn half_edge(&self, id: HalfEdgeId) -> Option<&HalfEdge> {
        self.half_edges.get(id)
    }

    #[must_use]
    pub fn half_edges(&self) -> &SlotMap<HalfEdgeId, HalfEdge> {
        &self.half_edges
    }

    /// Every half-edge, front before back, in wall order.
    #[must_use]
    pub fn wall_edges(&self) -> Vec<HalfEdgeId> {
        self.store
            .walls()
            .flat_map(|(_, w)| [w.front_edge, w.back_edge])
            .flatten()
            .collect()
    }

    /// Walls bounding a room, in ring order.
    #[must_use]
    pub fn room_walls(&self, room: usize) -> Vec<WallId> {
        self.rooms
            .get(room)
            .map(|r| r.walls(&self.half_edges))
            .unwrap_or_default()
    }

    /// The half-edge on the other side of the same wall.
    #[must_use]
    pub fn opposite_edge(&self, id: HalfEdgeId) -> Option<HalfEdgeId> {
        let edge = self.half_edges.get(id)?;
        self.store.wall(edge.wall).ok()?.edge(edge.opposite_side())
    }

    /// Texture of the wall face a half-edge belongs to.
    #[must_use]
    pub fn edge_texture(&self, id: HalfEdgeId) -> Option<&Texture> {
        let edge = self.half_edges.get(id)?;
        Some(self.store.wall(edge.wall).ok()?.texture(edge.side))
    }

    /// Takes all queued notifications.
    pub fn drain_events(&mut self) -> Vec<FloorplanEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn floor_texture(&self, uuid: &str) -> Option<&Texture> {
        self.floor_textures.get(uuid)
    }

    pub fn set_floor_texture(&mut self, uuid: impl Into<String>, texture: Texture) {
        self.floor_textures.insert(uuid.into(), texture);
    }

    // --- Queries ---

    #[must_use]
    pub fn wall_length(&self, wall: WallId) -> f64 {
        self.store
            .wall_points(wall)
            .map_or(0.0, |(a, b)| distance(&a, &b))
    }

    #[must_use]
    pub fn wall_center(&self, wall: WallId) -> Option<Point2> {
        let (a, b) = self.store.wall_points(wall).ok()?;
        Some(nalgebra::center(&a, &b))
    }

    /// Distance from `p` to the wall's centreline segment.
    #[must_use]
    pub fn distance_from_wall(&self, wall: WallId, p: &Point2) -> Option<f64> {
        let (a, b) = self.store.wall_points(wall).ok()?;
        Some(point_to_segment_dist(p, &a, &b))
    }

    #[must_use]
    pub fn distance_from_corner(&self, corner: CornerId, p: &Point2) -> Option<f64> {
        Some(distance(&self.store.position(corner).ok()?, p))
    }

    /// Wall endpoint within twice the wall thickness of `p`, start first.
    #[must_use]
    pub fn closest_corner(&self, wall: WallId, p: &Point2) -> Option<CornerId> {
        let data = self.store.wall(wall).ok()?;
        let reach = data.thickness * 2.0;
        [data.start, data.end]
            .into_iter()
            .find(|&c| self.distance_from_corner(c, p).is_some_and(|d| d <= reach))
    }

    #[must_use]
    pub fn overlapped_corner(&self, p: &Point2) -> Option<CornerId> {
        let tolerance = self.config.hit_tolerance;
        self.store
            .corners()
            .find(|(_, c)| distance(&c.position, p) < tolerance)
            .map(|(id, _)| id)
    }

    #[must_use]
    pub fn overlapped_wall(&self, p: &Point2) -> Option<WallId> {
        let tolerance = self.config.hit_tolerance;
        self.store
            .wall_ids()
            .iter()
            .copied()
            .find(|&w| self.distance_from_wall(w, p).is_some_and(|d| d < tolerance))
    }

    /// Index of the first room containing `p`.
    #[must_use]
    pub fn overlapped_room(&self, p: &Point2) -> Option<usize> {
        self.rooms.iter().position(|r| r.point_in_room(p))
    }

    /// `(min, max)` of all corner positions, `None` for an empty plan.
    fn dimensions(&self) -> Option<(Point2, Point2)> {
        let mut corners = self.store.corners().map(|(_, c)| c.position);
        let first = corners.next()?;
        Some(corners.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p))))
    }

    /// Scene-space centre of the corner bounding box.
    #[must_use]
    pub fn center(&self) -> Point3 {
        self.dimensions().map_or_else(Point3::origin, |(min, max)| {
            let c = nalgebra::center(&min, &max);
            Point3::new(c.x, 0.0, c.y)
        })
    }

    /// Scene-space extent of the corner bounding box.
    #[must_use]
    pub fn size(&self) -> Vector3 {
        self.dimensions().map_or_else(Vector3::zeros, |(min, max)| {
            Vector3::new(max.x - min.x, 0.0, max.y - min.y)
        })
    }

    /// `(center, size)` of the corner bounding box.
    #[must_use]
    pub fn bounds(&self) -> (Point3, Vector3) {
        (self.center(), self.size())
    }

    // --- Room attributes ---

    /// Sets the attributes of the room with the given cycle id or uuid.
    ///
    /// Returns whether a room matched. The attributes are remembered by
    /// cycle id and survive later rebuilds.
    pub fn set_room_attributes(&mut self, key: &str, attributes: RoomAttributes) -> bool {
        let Some(room) = self
            .rooms
            .iter_mut()
            .find(|r| r.cycle_id() == key || r.uuid() == key)
        else {
            return false;
        };
        room.attributes = attributes.clone();
        let cycle_id = room.cycle_id();
        self.saved_rooms.insert(cycle_id.clone(), attributes);
        self.events
            .push(FloorplanEvent::RoomAttributesChanged { cycle_id });
        true
    }

    /// Removes every corner and wall. Annotations are kept.
    pub fn reset(&mut self) {
        for (wall, _) in self.store.walls() {
            let uuid = self.store.wall_uuid(wall).unwrap_or_default();
            self.events
                .push(FloorplanEvent::Deleted(DeletedItem::Wall { wall, uuid }));
        }
        for (corner, data) in self.store.corners() {
            self.events.push(FloorplanEvent::Deleted(DeletedItem::Corner {
                corner,
                id: data.id.clone(),
            }));
        }
        self.store.clear();
        self.rooms.clear();
        self.half_edges.clear();
        self.saved_rooms.clear();
    }

    // --- Update ---

    /// Single choke point for topology recomputation.
    ///
    /// With `recompute_rooms` every room and half-edge is discarded and
    /// rediscovered. Without it, only the wedge caches and the miter
    /// geometry around `dirty_corners` are refreshed.
    pub fn update(&mut self, reason: &'static str, recompute_rooms: bool, dirty_corners: &[CornerId]) {
        if !recompute_rooms {
            let dirty: Vec<CornerId> = dirty_corners
                .iter()
                .copied()
                .filter(|&c| self.store.contains_corner(c))
                .collect();
            self.refresh_wedges(&dirty);
            self.refresh_geometry_around(&dirty);
            tracing::trace!(reason, corners = dirty.len(), "geometry refreshed");
            self.events.push(FloorplanEvent::GeometryUpdated {
                reason,
                corners: dirty,
            });
            return;
        }

        self.rebuild_rooms();
        let all: Vec<CornerId> = self.store.corner_ids().to_vec();
        self.refresh_wedges(&all);

        let orphans = self.store.walls().filter(|(_, w)| w.orphan).count();
        tracing::debug!(
            reason,
            rooms = self.rooms.len(),
            walls = self.store.num_walls(),
            orphans,
            "floor plan rebuilt"
        );
        if self.config.debug {
            for room in &self.rooms {
                tracing::info!(cycle = %room.cycle_id(), name = room.name(), area = room.area, "room");
            }
        }
        self.events.push(FloorplanEvent::StructureUpdated {
            reason,
            rooms: self.rooms.len(),
        });
    }

    /// Rediscovers rooms, carrying attributes over by cycle id.
    ///
    /// `saved_rooms` holds the attributes of the rooms alive after the
    /// previous rebuild (or of a loaded document), and is narrowed to the
    /// new room list afterwards.
    fn rebuild_rooms(&mut self) {
        for (_, wall) in self.store.walls_mut() {
            wall.reset_front_back();
        }
        self.half_edges.clear();

        let by_sorted_key: BTreeMap<String, RoomAttributes> = self
            .saved_rooms
            .iter()
            .map(|(cycle, attrs)| {
                let ids: Vec<&str> = cycle.split(',').collect();
                (sorted_corner_key(&ids), attrs.clone())
            })
            .collect();

        let cycles = rooms::find_rooms(&self.store);
        let mut rooms = Vec::with_capacity(cycles.len());
        for cycle in cycles {
            let Some(mut room) = self.room_from_cycle(cycle) else {
                continue;
            };
            let index = rooms.len();
            room.attributes = self
                .saved_rooms
                .get(&room.cycle_id())
                .or_else(|| by_sorted_key.get(&room.uuid()))
                .cloned()
                .unwrap_or_else(|| RoomAttributes::named(format!("My new room {index}")));
            room.edge_pointer = self.build_ring(&room, index);
            rooms.push(room);
        }
        self.rooms = rooms;
        self.saved_rooms = self
            .rooms
            .iter()
            .map(|r| (r.cycle_id(), r.attributes.clone()))
            .collect();

        self.assign_orphan_edges();

        let edges: Vec<HalfEdgeId> = self.half_edges.keys().collect();
        for id in edges {
            self.regenerate_edge(id);
        }
        for index in 0..self.rooms.len() {
            self.refresh_interior_corners(index);
        }
    }

    fn room_from_cycle(&self, cycle: Vec<CornerId>) -> Option<Room> {
        let mut ids = Vec::with_capacity(cycle.len());
        let mut polygon = Vec::with_capacity(cycle.len());
        for &c in &cycle {
            let data = self.store.corner(c).ok()?;
            ids.push(data.id.clone());
            polygon.push(data.position);
        }
        Some(Room::new(cycle, ids, polygon))
    }

    /// Creates the half-edge ring of a room and links it.
    fn build_ring(&mut self, room: &Room, index: usize) -> Option<HalfEdgeId> {
        let n = room.corners.len();
        let mut ring: Vec<HalfEdgeId> = Vec::with_capacity(n);

        for i in 0..n {
            let a = room.corners[i];
            let b = room.corners[(i + 1) % n];
            let (wall, side) = if let Some(w) = self.store.wall_to(a, b) {
                (w, WallSide::Front)
            } else if let Some(w) = self.store.wall_from(a, b) {
                (w, WallSide::Back)
            } else {
                tracing::warn!(room = %room.cycle_id(), "corners aren't connected by a wall");
                continue;
            };
            let Ok(data) = self.store.wall_mut(wall) else {
                continue;
            };
            let edge = HalfEdge::new(wall, Some(index), side, (a, b), data.thickness, data.height);
            let id = self.half_edges.insert(edge);
            data.set_edge(side, id);
            ring.push(id);
        }

        let len = ring.len();
        for (i, &id) in ring.iter().enumerate() {
            if let Some(edge) = self.half_edges.get_mut(id) {
                edge.next = Some(ring[(i + 1) % len]);
                edge.prev = Some(ring[(i + len - 1) % len]);
            }
        }
        ring.first().copied()
    }

    /// Gives every wall outside all rooms an unlinked front/back pair.
    fn assign_orphan_edges(&mut self) {
        let orphans: Vec<WallId> = self
            .store
            .walls()
            .filter(|(_, w)| w.front_edge.is_none() && w.back_edge.is_none())
            .map(|(id, _)| id)
            .collect();

        for wall in orphans {
            let Ok(data) = self.store.wall_mut(wall) else {
                continue;
            };
            data.orphan = true;
            let (start, end) = (data.start, data.end);
            let back = HalfEdge::new(wall, None, WallSide::Back, (end, start), data.thickness, data.height);
            let front = HalfEdge::new(wall, None, WallSide::Front, (start, end), data.thickness, data.height);
            let back = self.half_edges.insert(back);
            let front = self.half_edges.insert(front);
            data.set_edge(WallSide::Back, back);
            data.set_edge(WallSide::Front, front);
        }
    }

    fn edge_segment(&self, id: HalfEdgeId) -> Option<EdgeSegment> {
        let edge = self.half_edges.get(id)?;
        Some(EdgeSegment::new(
            self.store.position(edge.start).ok()?,
            self.store.position(edge.end).ok()?,
        ))
    }

    /// Recomputes one half-edge's miter points from the current corners.
    fn regenerate_edge(&mut self, id: HalfEdgeId) {
        let Some(edge) = self.half_edges.get(id) else {
            return;
        };
        let (prev, next, wall) = (edge.prev, edge.next, edge.wall);
        let Some(this) = self.edge_segment(id) else {
            return;
        };
        let prev = prev.and_then(|p| self.edge_segment(p));
        let next = next.and_then(|n| self.edge_segment(n));

        let Ok(data) = self.store.wall(wall) else {
            return;
        };
        let (thickness, height) = (data.thickness, data.height);
        let elevation = |c: CornerId| self.store.corner(c).map_or(0.0, |c| c.elevation);
        let elevations = (elevation(data.start), elevation(data.end));

        if let Some(edge) = self.half_edges.get_mut(id) {
            edge.offset = thickness * 0.5;
            edge.height = height;
            edge.generate(&this, prev.as_ref(), next.as_ref(), elevations);
        }
    }

    fn refresh_interior_corners(&mut self, index: usize) {
        let Some(room) = self.rooms.get(index) else {
            return;
        };
        let Some(first) = room.edge_pointer else {
            return;
        };
        let mut points = Vec::with_capacity(room.corners.len());
        let mut current = first;
        while let Some(edge) = self.half_edges.get(current) {
            points.push(edge.interior_start);
            match edge.next {
                Some(next) if next != first && points.len() < self.half_edges.len() => current = next,
                _ => break,
            }
        }
        if let Some(room) = self.rooms.get_mut(index) {
            room.set_interior_corners(points);
        }
    }

    fn refresh_wedges(&mut self, corners: &[CornerId]) {
        for &corner in corners {
            let Ok(origin) = self.store.position(corner) else {
                continue;
            };
            let neighbours: Vec<(CornerId, Point2)> = self
                .store
                .adjacent_corners(corner)
                .into_iter()
                .filter_map(|c| self.store.position(c).ok().map(|p| (c, p)))
                .collect();
            let wedges = compute_wedges(&origin, &neighbours);
            if let Ok(data) = self.store.corner_mut(corner) {
                data.wedges = wedges;
            }
        }
    }

    /// Drag-tier refresh of half-edges, room outlines and areas near `dirty`.
    fn refresh_geometry_around(&mut self, dirty: &[CornerId]) {
        if dirty.is_empty() {
            return;
        }
        let dirty: HashSet<CornerId> = dirty.iter().copied().collect();

        let edges: Vec<HalfEdgeId> = self
            .half_edges
            .iter()
            .filter(|(_, e)| dirty.contains(&e.start) || dirty.contains(&e.end))
            .map(|(id, _)| id)
            .collect();
        for id in edges {
            self.regenerate_edge(id);
        }

        for index in 0..self.rooms.len() {
            if !self.rooms[index].corners.iter().any(|c| dirty.contains(c)) {
                continue;
            }
            let polygon: Vec<Point2> = self.rooms[index]
                .corners
                .iter()
                .filter_map(|&c| self.store.position(c).ok())
                .collect();
            let room = &mut self.rooms[index];
            room.polygon = polygon;
            room.update_area();
            self.refresh_interior_corners(index);
        }
    }

    /// Collects `corner` and its neighbours, the set a move invalidates.
    pub(crate) fn with_neighbours(&self, corners: &[CornerId]) -> Vec<CornerId> {
        let mut out: Vec<CornerId> = Vec::new();
        for &c in corners {
            for n in std::iter::once(c).chain(self.store.adjacent_corners(c)) {
                if !out.contains(&n) {
                    out.push(n);
                }
            }
        }
        out
    }

    /// Fails with `EntityNotFound` when `corner` is stale.
    pub(crate) fn require_corner(&self, corner: CornerId) -> std::result::Result<(), TopologyError> {
        self.store.corner(corner).map(|_| ())
    }
}
