//! Free-floating 2D annotations: text labels and images.
//!
//! Annotations are not part of the wall graph but are persisted with it
//! and take part in hit testing.

use serde::{Deserialize, Serialize};

use crate::math::Point2;

use super::events::{DeletedItem, FloorplanEvent};
use super::Floorplan;

/// Plan position as persisted, `{ "x": .., "y": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl From<Point2> for Position {
    fn from(p: Point2) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<Position> for Point2 {
    fn from(p: Position) -> Self {
        Point2::new(p.x, p.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignType {
    #[default]
    Left,
    Center,
    Right,
}

/// Everything about a label except its identity and placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelStyle {
    pub text: String,
    #[serde(default)]
    pub align_type: AlignType,
    pub font_size: f64,
    #[serde(default)]
    pub font_family: String,
    #[serde(default)]
    pub font_color: String,
    #[serde(default)]
    pub font_bg_color: String,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub underline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub id: String,
    #[serde(flatten)]
    pub style: LabelStyle,
    pub position: Position,
}

impl TextLabel {
    /// Screen-space pick box `(x, y, width, height)`.
    ///
    /// The width assumes one `font_size` per character; the box is padded
    /// to the right and below.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        let width = self.style.text.chars().count() as f64 * self.style.font_size;
        let height = self.style.font_size * 2.0;
        let x = match self.style.align_type {
            AlignType::Left => self.position.x,
            AlignType::Center => self.position.x - width / 2.0,
            AlignType::Right => self.position.x - width,
        };
        (x, self.position.y - height, width + 50.0, height + 20.0)
    }

    #[must_use]
    pub fn contains(&self, p: &Point2) -> bool {
        let (x, y, w, h) = self.bounding_box();
        p.x >= x && p.x <= x + w && p.y >= y && p.y <= y + h
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    Url,
    Base64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image2D {
    pub id: String,
    pub src: String,
    #[serde(rename = "type")]
    pub source: ImageSource,
    pub position: Position,
    pub size: ImageSize,
}

impl Image2D {
    /// Pick box anchored at `position`, twice the stored size.
    #[must_use]
    pub fn contains(&self, p: &Point2) -> bool {
        let (x, y) = (self.position.x, self.position.y);
        let (w, h) = (self.size.width * 2.0, self.size.height * 2.0);
        p.x >= x && p.x <= x + w && p.y >= y && p.y <= y + h
    }
}

impl Floorplan {
    #[must_use]
    pub fn labels(&self) -> &[TextLabel] {
        &self.labels
    }

    #[must_use]
    pub fn images(&self) -> &[Image2D] {
        &self.images
    }

    #[must_use]
    pub fn label(&self, id: &str) -> Option<&TextLabel> {
        self.labels.iter().find(|l| l.id == id)
    }

    #[must_use]
    pub fn image(&self, id: &str) -> Option<&Image2D> {
        self.images.iter().find(|i| i.id == id)
    }

    pub fn add_label(&mut self, label: TextLabel) {
        self.events.push(FloorplanEvent::LabelChanged { id: label.id.clone() });
        self.labels.push(label);
    }

    /// Restyles a label, returning whether it exists.
    pub fn edit_label(&mut self, id: &str, style: LabelStyle) -> bool {
        let Some(label) = self.labels.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        label.style = style;
        self.events.push(FloorplanEvent::LabelChanged { id: id.to_owned() });
        true
    }

    /// Moves a label, returning whether it exists.
    pub fn move_label(&mut self, id: &str, position: Point2) -> bool {
        let Some(label) = self.labels.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        label.position = position.into();
        self.events.push(FloorplanEvent::LabelChanged { id: id.to_owned() });
        true
    }

    pub fn delete_label(&mut self, id: &str) {
        let before = self.labels.len();
        self.labels.retain(|l| l.id != id);
        if self.labels.len() != before {
            self.events
                .push(FloorplanEvent::Deleted(DeletedItem::Label(id.to_owned())));
        }
    }

    pub fn add_image(&mut self, image: Image2D) {
        self.events.push(FloorplanEvent::ImageChanged { id: image.id.clone() });
        self.images.push(image);
    }

    /// Replaces an image's content, keeping its id. Returns whether it exists.
    pub fn update_image(&mut self, id: &str, image: Image2D) -> bool {
        let Some(existing) = self.images.iter_mut().find(|i| i.id == id) else {
            return false;
        };
        *existing = Image2D {
            id: id.to_owned(),
            ..image
        };
        self.events.push(FloorplanEvent::ImageChanged { id: id.to_owned() });
        true
    }

    /// Moves an image, returning whether it exists.
    pub fn move_image(&mut self, id: &str, position: Point2) -> bool {
        let Some(image) = self.images.iter_mut().find(|i| i.id == id) else {
            return false;
        };
        image.position = position.into();
        self.events.push(FloorplanEvent::ImageChanged { id: id.to_owned() });
        true
    }

    pub fn delete_image(&mut self, id: &str) {
        let before = self.images.len();
        self.images.retain(|i| i.id != id);
        if self.images.len() != before {
            self.events
                .push(FloorplanEvent::Deleted(DeletedItem::Image(id.to_owned())));
        }
    }

    /// First label whose pick box contains `p`.
    #[must_use]
    pub fn overlapped_label(&self, p: &Point2) -> Option<&TextLabel> {
        self.labels.iter().find(|l| l.contains(p))
    }

    /// First image whose pick box contains `p`.
    #[must_use]
    pub fn overlapped_image(&self, p: &Point2) -> Option<&Image2D> {
        self.images.iter().find(|i| i.contains(p))
    }
}
