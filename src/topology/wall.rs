use serde::{Deserialize, Serialize};

use super::{CornerId, HalfEdgeId};

slotmap::new_key_type! {
    /// Unique identifier for a wall in the topology store.
    pub struct WallId;
}

pub const DEFAULT_WALL_TEXTURE: &str = "rooms/textures/default_wall_texture.png";

/// Surface finish applied to one side of a wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    /// Path to the texture image.
    pub url: String,
    /// Stretch over the face instead of repeating.
    pub stretch: bool,
    /// Repetition scale when not stretched.
    pub scale: f64,
}

impl Default for Texture {
    fn default() -> Self {
        Self {
            url: DEFAULT_WALL_TEXTURE.to_owned(),
            stretch: true,
            scale: 0.0,
        }
    }
}

/// Which face of a wall, relative to its `start → end` direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallSide {
    /// The left face, traversed `start → end` by a room ring.
    Front,
    /// The right face, traversed `end → start`.
    Back,
}

/// Data associated with a wall between two corners.
#[derive(Debug, Clone)]
pub struct WallData {
    pub start: CornerId,
    pub end: CornerId,
    pub thickness: f64,
    pub height: f64,
    pub front_texture: Texture,
    pub back_texture: Texture,
    /// Ids of furnishing items hung on this wall; owned elsewhere.
    pub items: Vec<String>,
    /// Half-edge on the front side, set by room discovery.
    pub front_edge: Option<HalfEdgeId>,
    /// Half-edge on the back side, set by room discovery.
    pub back_edge: Option<HalfEdgeId>,
    /// Set when no room ring uses this wall.
    pub orphan: bool,
}

impl WallData {
    /// Creates a wall with default textures and no half-edges.
    #[must_use]
    pub fn new(start: CornerId, end: CornerId, thickness: f64, height: f64) -> Self {
        Self {
            start,
            end,
            thickness,
            height,
            front_texture: Texture::default(),
            back_texture: Texture::default(),
            items: Vec::new(),
            front_edge: None,
            back_edge: None,
            orphan: false,
        }
    }

    /// Whether the wall connects `a` and `b`, in either direction.
    #[must_use]
    pub fn connects(&self, a: CornerId, b: CornerId) -> bool {
        (self.start == a && self.end == b) || (self.start == b && self.end == a)
    }

    /// Whether `corner` is one of the endpoints.
    #[must_use]
    pub fn touches(&self, corner: CornerId) -> bool {
        self.start == corner || self.end == corner
    }

    /// Returns the other endpoint, or `None` if `corner` is not on this wall.
    #[must_use]
    pub fn opposite_corner(&self, corner: CornerId) -> Option<CornerId> {
        if self.start == corner {
            Some(self.end)
        } else if self.end == corner {
            Some(self.start)
        } else {
            None
        }
    }

    #[must_use]
    pub fn texture(&self, side: WallSide) -> &Texture {
        match side {
            WallSide::Front => &self.front_texture,
            WallSide::Back => &self.back_texture,
        }
    }

    pub fn set_texture(&mut self, side: WallSide, texture: Texture) {
        match side {
            WallSide::Front => self.front_texture = texture,
            WallSide::Back => self.back_texture = texture,
        }
    }

    #[must_use]
    pub fn edge(&self, side: WallSide) -> Option<HalfEdgeId> {
        match side {
            WallSide::Front => self.front_edge,
            WallSide::Back => self.back_edge,
        }
    }

    pub(crate) fn set_edge(&mut self, side: WallSide, edge: HalfEdgeId) {
        match side {
            WallSide::Front => self.front_edge = Some(edge),
            WallSide::Back => self.back_edge = Some(edge),
        }
    }

    /// Clears the derived half-edge links before a rebuild.
    pub fn reset_front_back(&mut self) {
        self.front_edge = None;
        self.back_edge = None;
        self.orphan = false;
    }

    /// Attaches a furnishing item; repeated ids are ignored.
    pub fn attach_item(&mut self, item: impl Into<String>) {
        let item = item.into();
        if !self.items.contains(&item) {
            self.items.push(item);
        }
    }

    /// Detaches a furnishing item, returning whether it was attached.
    pub fn detach_item(&mut self, item: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i != item);
        self.items.len() != before
    }
}
