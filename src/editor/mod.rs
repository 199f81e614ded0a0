//! Edit-mode state machine over pointer gestures.
//!
//! The [`Editor`] decides which [`Floorplan`] mutation a gesture may
//! trigger. Drags use the light update; releases commit with a full
//! room rebuild.

use crate::error::Result;
use crate::floorplan::Floorplan;
use crate::math::{Point2, Vector2};
use crate::topology::{CornerId, WallId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EditMode {
    #[default]
    Move,
    Draw,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
}

/// What a pointer-down in move mode picked up.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Corner(CornerId),
    Wall(WallId),
    Label(String),
    Image(String),
    Room(usize),
}

/// Pointer-driven editing session over a floor plan.
#[derive(Debug, Clone)]
pub struct Editor {
    mode: EditMode,
    last_corner: Option<CornerId>,
    selection: Option<Selection>,
    target: Point2,
    last_pointer: Point2,
    pressed: bool,
    moved: bool,
    mode_events: Vec<EditMode>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: EditMode::Move,
            last_corner: None,
            selection: None,
            target: Point2::origin(),
            last_pointer: Point2::origin(),
            pressed: false,
            moved: false,
            mode_events: Vec::new(),
        }
    }

    #[must_use]
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Corner the next drawn wall starts from.
    #[must_use]
    pub fn last_corner(&self) -> Option<CornerId> {
        self.last_corner
    }

    #[must_use]
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Where a draw click would place its corner.
    #[must_use]
    pub fn target(&self) -> Point2 {
        self.target
    }

    /// Switches mode, forgetting the drawing chain.
    pub fn set_mode(&mut self, mode: EditMode) {
        self.last_corner = None;
        self.mode = mode;
        self.mode_events.push(mode);
    }

    /// Takes the queued mode-reset notifications.
    pub fn drain_mode_events(&mut self) -> Vec<EditMode> {
        std::mem::take(&mut self.mode_events)
    }

    /// Hit test in priority order: corner, wall, label, image, room.
    #[must_use]
    pub fn pick(plan: &Floorplan, p: &Point2) -> Option<Selection> {
        plan.overlapped_corner(p)
            .map(Selection::Corner)
            .or_else(|| plan.overlapped_wall(p).map(Selection::Wall))
            .or_else(|| plan.overlapped_label(p).map(|l| Selection::Label(l.id.clone())))
            .or_else(|| plan.overlapped_image(p).map(|i| Selection::Image(i.id.clone())))
            .or_else(|| plan.overlapped_room(p).map(Selection::Room))
    }

    fn update_target(&mut self, plan: &Floorplan, p: Point2) {
        self.target = match self.mode {
            EditMode::Draw => plan
                .overlapped_corner(&p)
                .and_then(|c| plan.corner(c).ok())
                .map_or(p, |c| c.position),
            EditMode::Move | EditMode::Delete => p,
        };
    }

    /// # Errors
    ///
    /// Propagates failures of the triggered delete.
    pub fn pointer_down(&mut self, plan: &mut Floorplan, p: Point2, button: PointerButton) -> Result<()> {
        self.pressed = true;
        self.moved = false;
        self.last_pointer = p;
        self.update_target(plan, p);

        match (self.mode, button) {
            (EditMode::Delete | EditMode::Draw, PointerButton::Right) => self.set_mode(EditMode::Move),
            (EditMode::Delete, PointerButton::Left) => {
                if let Some(corner) = plan.overlapped_corner(&p) {
                    plan.remove_corner(corner)?;
                } else if let Some(wall) = plan.overlapped_wall(&p) {
                    plan.remove_wall(wall)?;
                }
            }
            (EditMode::Move, _) => {
                self.selection = Self::pick(plan, &p);
                tracing::trace!(selection = ?self.selection, "pointer down");
            }
            (EditMode::Draw, PointerButton::Left) => {}
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the dragged element no longer exists.
    pub fn pointer_move(&mut self, plan: &mut Floorplan, p: Point2) -> Result<()> {
        self.moved = true;
        self.update_target(plan, p);
        let delta: Vector2 = p - self.last_pointer;
        self.last_pointer = p;

        if self.mode != EditMode::Move || !self.pressed {
            return Ok(());
        }
        match &self.selection {
            Some(Selection::Corner(corner)) => plan.move_corner(*corner, p)?,
            Some(Selection::Wall(wall)) => plan.relative_move_wall(*wall, delta)?,
            Some(Selection::Label(id)) => {
                if let Some(at) = plan.label(id).map(|l| Point2::from(l.position)) {
                    plan.move_label(id, at + delta);
                }
            }
            Some(Selection::Image(id)) => {
                if let Some(at) = plan.image(id).map(|i| Point2::from(i.position)) {
                    plan.move_image(id, at + delta);
                }
            }
            Some(Selection::Room(_)) | None => {}
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates failures of the committed edit.
    pub fn pointer_up(&mut self, plan: &mut Floorplan) -> Result<()> {
        self.pressed = false;
        match self.mode {
            EditMode::Draw if !self.moved => self.place_corner(plan),
            EditMode::Move if self.moved => self.commit_drag(plan),
            _ => Ok(()),
        }
    }

    fn place_corner(&mut self, plan: &mut Floorplan) -> Result<()> {
        let before = plan.store().num_corners();
        let corner = plan.new_corner(self.target, None);
        let reused = plan.store().num_corners() == before;

        let previous = self.last_corner;
        if let Some(last) = previous.filter(|&last| last != corner) {
            plan.new_wall(last, corner)?;
            plan.new_walls_for_intersections(last, corner)?;
        }
        let merged = plan.merge_with_intersected(corner, true)?;

        if previous.is_some() && (reused || merged) {
            self.set_mode(EditMode::Move);
        } else {
            self.last_corner = Some(corner);
        }
        Ok(())
    }

    fn commit_drag(&mut self, plan: &mut Floorplan) -> Result<()> {
        match self.selection {
            Some(Selection::Corner(corner)) => {
                plan.merge_with_intersected(corner, false)?;
                plan.update("corner drag committed", true, &[]);
            }
            Some(Selection::Wall(_)) => plan.update("wall drag committed", true, &[]),
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::floorplan::{LabelStyle, Position, TextLabel};

    fn click(editor: &mut Editor, plan: &mut Floorplan, x: f64, y: f64) {
        editor
            .pointer_down(plan, Point2::new(x, y), PointerButton::Left)
            .unwrap();
        editor.pointer_up(plan).unwrap();
    }

    fn drag(editor: &mut Editor, plan: &mut Floorplan, from: (f64, f64), to: (f64, f64)) {
        editor
            .pointer_down(plan, Point2::new(from.0, from.1), PointerButton::Left)
            .unwrap();
        editor.pointer_move(plan, Point2::new(to.0, to.1)).unwrap();
        editor.pointer_up(plan).unwrap();
    }

    #[test]
    fn drawing_a_closed_loop_creates_a_room_and_ends_the_chain() {
        let mut plan = Floorplan::new();
        let mut editor = Editor::new();
        editor.set_mode(EditMode::Draw);

        for (x, y) in [(0.0, 0.0), (400.0, 0.0), (400.0, 400.0), (0.0, 400.0)] {
            click(&mut editor, &mut plan, x, y);
            assert_eq!(editor.mode(), EditMode::Draw);
        }
        assert_eq!(plan.store().num_walls(), 3);
        assert!(plan.rooms().is_empty());

        click(&mut editor, &mut plan, 5.0, 5.0);
        assert_eq!(plan.store().num_walls(), 4);
        assert_eq!(plan.store().num_corners(), 4);
        assert_eq!(plan.rooms().len(), 1);
        assert_eq!(editor.mode(), EditMode::Move);
        assert_eq!(editor.last_corner(), None);
        assert_eq!(editor.drain_mode_events(), vec![EditMode::Draw, EditMode::Move]);
    }

    #[test]
    fn draw_target_snaps_to_existing_corner() {
        let mut plan = Floorplan::new();
        let corner = plan.new_corner(Point2::new(100.0, 100.0), None);
        let mut editor = Editor::new();
        editor.set_mode(EditMode::Draw);
        editor.pointer_move(&mut plan, Point2::new(110.0, 95.0)).unwrap();
        assert_eq!(editor.target(), plan.corner(corner).unwrap().position);
    }

    #[test]
    fn drawn_segment_splits_the_wall_it_crosses() {
        let mut plan = Floorplan::new();
        let top = plan.new_corner(Point2::new(200.0, -200.0), None);
        let bottom = plan.new_corner(Point2::new(200.0, 200.0), None);
        plan.new_wall(top, bottom).unwrap();

        let mut editor = Editor::new();
        editor.set_mode(EditMode::Draw);
        click(&mut editor, &mut plan, 0.0, 0.0);
        click(&mut editor, &mut plan, 400.0, 0.0);

        assert_eq!(plan.store().num_walls(), 4);
        assert_eq!(plan.store().num_corners(), 5);
        let crossing = plan.overlapped_corner(&Point2::new(200.0, 0.0)).unwrap();
        assert_eq!(plan.store().adjacent_corners(crossing).len(), 4);
        assert_eq!(editor.mode(), EditMode::Draw);
        let last = editor.last_corner().unwrap();
        assert_eq!(plan.corner(last).unwrap().position, Point2::new(400.0, 0.0));
    }

    #[test]
    fn dragged_draw_release_places_nothing() {
        let mut plan = Floorplan::new();
        let mut editor = Editor::new();
        editor.set_mode(EditMode::Draw);
        drag(&mut editor, &mut plan, (0.0, 0.0), (50.0, 0.0));
        assert_eq!(plan.store().num_corners(), 0);
    }

    #[test]
    fn right_click_reverts_to_move() {
        let mut plan = Floorplan::new();
        let mut editor = Editor::new();
        editor.set_mode(EditMode::Draw);
        click(&mut editor, &mut plan, 0.0, 0.0);
        assert!(editor.last_corner().is_some());
        editor
            .pointer_down(&mut plan, Point2::new(100.0, 0.0), PointerButton::Right)
            .unwrap();
        assert_eq!(editor.mode(), EditMode::Move);
        assert_eq!(editor.last_corner(), None);

        editor.set_mode(EditMode::Delete);
        editor
            .pointer_down(&mut plan, Point2::new(0.0, 0.0), PointerButton::Right)
            .unwrap();
        assert_eq!(editor.mode(), EditMode::Move);
        assert_eq!(plan.store().num_corners(), 1);
    }

    #[test]
    fn delete_prefers_corner_over_wall() {
        let mut plan = Floorplan::new();
        let a = plan.new_corner(Point2::new(0.0, 0.0), None);
        let b = plan.new_corner(Point2::new(400.0, 0.0), None);
        let c = plan.new_corner(Point2::new(400.0, 400.0), None);
        plan.new_wall(a, b).unwrap();
        plan.new_wall(b, c).unwrap();

        let mut editor = Editor::new();
        editor.set_mode(EditMode::Delete);
        click(&mut editor, &mut plan, 200.0, 3.0);
        assert_eq!(plan.store().num_walls(), 1);
        assert_eq!(plan.store().num_corners(), 3);

        click(&mut editor, &mut plan, 400.0, 400.0);
        assert_eq!(plan.store().num_walls(), 0);
        assert_eq!(plan.store().num_corners(), 2);
    }

    #[test]
    fn pick_priority() {
        let mut plan = Floorplan::new();
        let ids: Vec<CornerId> = [(0.0, 0.0), (400.0, 0.0), (400.0, 400.0), (0.0, 400.0)]
            .iter()
            .map(|&(x, y)| plan.new_corner(Point2::new(x, y), None))
            .collect();
        for i in 0..4 {
            plan.new_wall(ids[i], ids[(i + 1) % 4]).unwrap();
        }
        plan.add_label(TextLabel {
            id: "hall".into(),
            style: LabelStyle {
                text: "Hall".into(),
                align_type: crate::floorplan::AlignType::Left,
                font_size: 10.0,
                font_family: String::new(),
                font_color: String::new(),
                font_bg_color: String::new(),
                italic: false,
                bold: false,
                underline: false,
            },
            position: Position { x: 150.0, y: 150.0 },
        });

        assert_eq!(Editor::pick(&plan, &Point2::new(2.0, 2.0)), Some(Selection::Corner(ids[0])));
        assert!(matches!(Editor::pick(&plan, &Point2::new(200.0, 2.0)), Some(Selection::Wall(_))));
        assert_eq!(
            Editor::pick(&plan, &Point2::new(160.0, 140.0)),
            Some(Selection::Label("hall".into()))
        );
        assert_eq!(Editor::pick(&plan, &Point2::new(300.0, 300.0)), Some(Selection::Room(0)));
        assert_eq!(Editor::pick(&plan, &Point2::new(900.0, 900.0)), None);
    }

    #[test]
    fn corner_drag_commits_with_merge() {
        let mut plan = Floorplan::new();
        let a = plan.new_corner(Point2::new(0.0, 0.0), None);
        let b = plan.new_corner(Point2::new(400.0, 0.0), None);
        let c = plan.new_corner(Point2::new(0.0, 300.0), None);
        plan.new_wall(a, b).unwrap();
        plan.new_wall(a, c).unwrap();
        let d = plan.new_corner(Point2::new(200.0, 300.0), None);
        plan.new_wall(c, d).unwrap();

        let mut editor = Editor::new();
        drag(&mut editor, &mut plan, (200.0, 300.0), (200.0, 5.0));
        assert_eq!(editor.selection(), Some(&Selection::Corner(d)));
        assert_eq!(plan.corner(d).unwrap().position, Point2::new(200.0, 0.0));
        assert_eq!(plan.store().num_walls(), 4);
        assert_eq!(plan.rooms().len(), 1);
    }

    #[test]
    fn wall_drag_moves_both_corners() {
        let mut plan = Floorplan::new();
        let a = plan.new_corner(Point2::new(0.0, 0.0), None);
        let b = plan.new_corner(Point2::new(400.0, 0.0), None);
        plan.new_wall(a, b).unwrap();

        let mut editor = Editor::new();
        drag(&mut editor, &mut plan, (200.0, 0.0), (200.0, 100.0));
        assert_eq!(plan.corner(a).unwrap().position, Point2::new(0.0, 100.0));
        assert_eq!(plan.corner(b).unwrap().position, Point2::new(400.0, 100.0));
    }
}
