//! Input model: pointer events and the drag/selection state machine.
//!
//! The host (egui editor, tests, anything else) translates its own events into
//! [`InputEvent`]s in canvas coordinates and feeds them to
//! [`InteractionController::handle`], which mutates the [`Scene`] and answers
//! with [`Action`]s for the host to carry out.

use crate::geometry::Point;
use crate::hit::{HitScope, hit_test};
use crate::scene::{LayerRef, Scene, TextStyle};
use crate::text::TextMeasure;

/// A host-independent input event, in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    /// The pointer left the canvas; ends a drag like a release.
    PointerLeave,
    DoubleClick(Point),
    /// Enter pressed in the text field.
    KeyCommit(String),
}

/// Pointer affordance the host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Grab,
    Grabbing,
}

/// Actions returned from [`InteractionController::handle`].
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RenderNeeded,
    SetCursor(Cursor),
    /// Ask the user before deleting; on confirmation call [`Scene::remove`].
    ConfirmDelete(LayerRef),
    /// Input was rejected; show the message, nothing changed.
    Rejected(String),
}

/// Gesture being tracked between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging {
        target: LayerRef,
        /// Pointer position at the previous event.
        last: Point,
    },
}

#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: InteractionState,
    /// Style given to text committed with [`InputEvent::KeyCommit`].
    pub text_style: TextStyle,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, InteractionState::Dragging { .. })
    }

    /// Abandon any gesture, e.g. when the scene is replaced wholesale.
    pub fn cancel(&mut self) {
        self.state = InteractionState::Idle;
    }

    pub fn handle(
        &mut self,
        scene: &mut Scene,
        measure: &impl TextMeasure,
        event: InputEvent,
    ) -> Vec<Action> {
        match event {
            InputEvent::PointerDown(p) => self.on_pointer_down(scene, measure, p),
            InputEvent::PointerMove(p) => self.on_pointer_move(scene, measure, p),
            InputEvent::PointerUp | InputEvent::PointerLeave => self.on_pointer_up(),
            InputEvent::DoubleClick(p) => on_double_click(scene, measure, p),
            InputEvent::KeyCommit(content) => self.on_key_commit(scene, &content),
        }
    }

    fn on_pointer_down(
        &mut self,
        scene: &mut Scene,
        measure: &impl TextMeasure,
        p: Point,
    ) -> Vec<Action> {
        match hit_test(scene, p, measure, HitScope::All) {
            Some(target) => {
                scene.select(Some(target));
                self.state = InteractionState::Dragging { target, last: p };
                tracing::debug!(?target, "drag started");
                vec![Action::SetCursor(Cursor::Grabbing), Action::RenderNeeded]
            }
            None => {
                scene.clear_selection();
                self.state = InteractionState::Idle;
                vec![Action::RenderNeeded]
            }
        }
    }

    fn on_pointer_move(
        &mut self,
        scene: &mut Scene,
        measure: &impl TextMeasure,
        p: Point,
    ) -> Vec<Action> {
        match self.state {
            InteractionState::Dragging { target, last } => {
                // Screen-space translation; the element's own rotation is ignored.
                if scene.translate(target, p - last) {
                    self.state = InteractionState::Dragging { target, last: p };
                    vec![Action::RenderNeeded]
                } else {
                    // Target vanished mid-gesture.
                    self.state = InteractionState::Idle;
                    vec![Action::SetCursor(Cursor::Default)]
                }
            }
            InteractionState::Idle => {
                let cursor = if hit_test(scene, p, measure, HitScope::All).is_some() {
                    Cursor::Grab
                } else {
                    Cursor::Default
                };
                vec![Action::SetCursor(cursor)]
            }
        }
    }

    fn on_pointer_up(&mut self) -> Vec<Action> {
        // Selection is kept on release.
        if self.is_dragging() {
            self.state = InteractionState::Idle;
            vec![Action::SetCursor(Cursor::Default)]
        } else {
            Vec::new()
        }
    }

    fn on_key_commit(&mut self, scene: &mut Scene, content: &str) -> Vec<Action> {
        match scene.add_text(content, self.text_style) {
            Ok(_) => vec![Action::RenderNeeded],
            Err(e) => vec![Action::Rejected(e.to_string())],
        }
    }
}

fn on_double_click(scene: &Scene, measure: &impl TextMeasure, p: Point) -> Vec<Action> {
    match hit_test(scene, p, measure, HitScope::Deletable) {
        Some(target) => vec![Action::ConfirmDelete(target)],
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{EffectSymbol, LayerKind};
    use crate::text::Typeface;
    use image::RgbaImage;

    fn setup() -> (Scene, InteractionController, Typeface) {
        (Scene::new(), InteractionController::new(), Typeface::fallback())
    }

    #[test]
    fn test_default_state_idle() {
        assert_eq!(InteractionController::new().state(), InteractionState::Idle);
        assert_eq!(Cursor::default(), Cursor::Default);
    }

    #[test]
    fn test_drag_moves_effect_and_keeps_selection() {
        let (mut scene, mut ctl, face) = setup();
        let id = scene.add_effect_at(EffectSymbol::Star, Point::new(100.0, 100.0));
        scene.clear_selection();

        let actions = ctl.handle(&mut scene, &face, InputEvent::PointerDown(Point::new(105.0, 98.0)));
        assert!(actions.contains(&Action::SetCursor(Cursor::Grabbing)));
        assert!(ctl.is_dragging());

        ctl.handle(&mut scene, &face, InputEvent::PointerMove(Point::new(115.0, 108.0)));
        ctl.handle(&mut scene, &face, InputEvent::PointerMove(Point::new(125.0, 98.0)));
        assert_eq!(scene.effect(id).unwrap().position, Point::new(120.0, 100.0));

        ctl.handle(&mut scene, &face, InputEvent::PointerUp);
        assert_eq!(ctl.state(), InteractionState::Idle);
        assert_eq!(scene.selection(), Some(LayerRef::new(LayerKind::Effect, id)));
    }

    #[test]
    fn test_drag_ignores_rotation() {
        let (mut scene, mut ctl, face) = setup();
        let id = scene.add_effect_at(EffectSymbol::Star, Point::new(100.0, 100.0));
        scene.set_rotation(90.0);
        ctl.handle(&mut scene, &face, InputEvent::PointerDown(Point::new(100.0, 100.0)));
        ctl.handle(&mut scene, &face, InputEvent::PointerMove(Point::new(110.0, 100.0)));
        assert_eq!(scene.effect(id).unwrap().position, Point::new(110.0, 100.0));
    }

    #[test]
    fn test_miss_clears_selection() {
        let (mut scene, mut ctl, face) = setup();
        scene.add_effect_at(EffectSymbol::Star, Point::new(100.0, 100.0));
        assert!(scene.selection().is_some());
        ctl.handle(&mut scene, &face, InputEvent::PointerDown(Point::new(300.0, 300.0)));
        assert_eq!(scene.selection(), None);
        assert!(!ctl.is_dragging());
    }

    #[test]
    fn test_hover_cursor() {
        let (mut scene, mut ctl, face) = setup();
        scene.set_image(RgbaImage::new(100, 100));
        let over = ctl.handle(&mut scene, &face, InputEvent::PointerMove(Point::new(185.0, 160.0)));
        assert_eq!(over, vec![Action::SetCursor(Cursor::Grab)]);
        let off = ctl.handle(&mut scene, &face, InputEvent::PointerMove(Point::new(5.0, 5.0)));
        assert_eq!(off, vec![Action::SetCursor(Cursor::Default)]);
        assert_eq!(ctl.state(), InteractionState::Idle);
    }

    #[test]
    fn test_pointer_leave_ends_drag() {
        let (mut scene, mut ctl, face) = setup();
        scene.set_image(RgbaImage::new(100, 100));
        ctl.handle(&mut scene, &face, InputEvent::PointerDown(Point::new(185.0, 160.0)));
        assert!(ctl.is_dragging());
        ctl.handle(&mut scene, &face, InputEvent::PointerLeave);
        assert!(!ctl.is_dragging());
        assert_eq!(scene.selection().map(|s| s.kind), Some(LayerKind::Image));
    }

    #[test]
    fn test_double_click_requests_confirmation() {
        let (mut scene, mut ctl, face) = setup();
        scene.set_image(RgbaImage::new(100, 100));
        let center = crate::scene::canvas_center();
        assert!(ctl.handle(&mut scene, &face, InputEvent::DoubleClick(center)).is_empty());

        let id = scene.add_effect_at(EffectSymbol::Ng, center);
        let actions = ctl.handle(&mut scene, &face, InputEvent::DoubleClick(center));
        let target = LayerRef::new(LayerKind::Effect, id);
        assert_eq!(actions, vec![Action::ConfirmDelete(target)]);
        // Nothing is removed until the host confirms.
        assert!(scene.effect(id).is_some());
        assert!(scene.remove(target));
        assert_eq!(scene.selection(), None);
    }

    #[test]
    fn test_key_commit_adds_text() {
        let (mut scene, mut ctl, face) = setup();
        let actions = ctl.handle(&mut scene, &face, InputEvent::KeyCommit("Hi!".into()));
        assert_eq!(actions, vec![Action::RenderNeeded]);
        assert_eq!(scene.texts().len(), 1);

        let actions = ctl.handle(&mut scene, &face, InputEvent::KeyCommit("  ".into()));
        assert!(matches!(actions.as_slice(), [Action::Rejected(_)]));
        assert_eq!(scene.texts().len(), 1);
    }

    #[test]
    fn test_drag_target_removed_mid_gesture() {
        let (mut scene, mut ctl, face) = setup();
        let id = scene.add_effect_at(EffectSymbol::Bulb, Point::new(50.0, 50.0));
        ctl.handle(&mut scene, &face, InputEvent::PointerDown(Point::new(50.0, 50.0)));
        scene.remove(LayerRef::new(LayerKind::Effect, id));
        ctl.handle(&mut scene, &face, InputEvent::PointerMove(Point::new(60.0, 60.0)));
        assert!(!ctl.is_dragging());
    }
}
