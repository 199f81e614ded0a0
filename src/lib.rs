pub mod config;
pub mod editor;
pub mod error;
pub mod floorplan;
pub mod math;
pub mod tessellation;
pub mod topology;

pub use config::{Config, Unit};
pub use editor::{EditMode, Editor, PointerButton, Selection};
pub use error::{FloorplanError, Result};
pub use floorplan::{Floorplan, FloorplanDocument, FloorplanEvent};
