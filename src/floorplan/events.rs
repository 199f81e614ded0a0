use crate::math::Point2;
use crate::topology::{CornerId, WallId};

/// What a [`FloorplanEvent::Deleted`] refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum DeletedItem {
    Corner { corner: CornerId, id: String },
    Wall { wall: WallId, uuid: String },
    Label(String),
    Image(String),
}

/// Notification queued by the floor plan for the host to drain.
#[derive(Debug, Clone, PartialEq)]
pub enum FloorplanEvent {
    /// A full rebuild discarded and rediscovered all rooms.
    StructureUpdated { reason: &'static str, rooms: usize },
    /// Drag-tier refresh of the listed corners' angle caches.
    GeometryUpdated {
        reason: &'static str,
        corners: Vec<CornerId>,
    },
    CornerAdded(CornerId),
    WallAdded(WallId),
    CornerMoved { corner: CornerId, position: Point2 },
    CornerAttributesChanged(CornerId),
    /// Keyed by the room's corner-cycle id.
    RoomAttributesChanged { cycle_id: String },
    WallAttributesChanged(WallId),
    Deleted(DeletedItem),
    Loaded,
    LabelChanged { id: String },
    ImageChanged { id: String },
}
