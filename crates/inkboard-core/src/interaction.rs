//! Pointer and keyboard interaction state machine.
//!
//! [`Interaction::handle`] turns one input event into scene transitions and a
//! list of [`Effect`]s for the host (overlay management, redraws).

use crate::geometry::hit_test;
use crate::input::{InputEvent, Key, KeyEvent, MouseButton, PointerEvent};
use crate::scene::{Action, Scene};
use crate::shapes::{PageId, SerializableColor, Shape, ShapeBase, ShapeId, ShapePatch, Text};
use crate::text_edit::{PLACEHOLDER, TextEditResult, TextEditor};
use crate::text_measure::TextMeasure;
use crate::tools::{DrawGesture, ToolKind};
use kurbo::{Point, Vec2};
use std::mem;

/// Font used by the text overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFont {
    pub family: String,
    pub size: f64,
    pub color: SerializableColor,
}

/// Requests from the interaction layer to its host.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Close any open popover (e.g. the colour palette). Emitted on every press.
    ClosePopovers,
    /// Show the text overlay at `origin` holding `value`.
    OpenTextEditor {
        shape_id: ShapeId,
        origin: Point,
        value: String,
        font: OverlayFont,
    },
    /// Hide the text overlay.
    CloseTextEditor,
    /// A page was created from a shortcut.
    PageAdded(PageId),
    /// The scene or the transient shape changed.
    Redraw,
}

/// Current interaction state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    /// A draw gesture with its transient shape.
    Drawing(DrawGesture),
    /// Moving the selected shape; `grab_offset` is pointer minus anchor at press.
    Dragging {
        shape_id: ShapeId,
        page_id: PageId,
        grab_offset: Vec2,
    },
    /// Eraser held down.
    Erasing,
    /// Text overlay open.
    TextEditing(TextEditor),
}

/// Drives the scene from input events.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    state: InteractionState,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Shape being drawn, if any. Not part of the scene until committed.
    pub fn transient(&self) -> Option<&Shape> {
        match &self.state {
            InteractionState::Drawing(gesture) => Some(&gesture.preview),
            _ => None,
        }
    }

    /// Open text editor, if any.
    pub fn editor(&self) -> Option<&TextEditor> {
        match &self.state {
            InteractionState::TextEditing(editor) => Some(editor),
            _ => None,
        }
    }

    /// Handle one event.
    pub fn handle(
        &mut self,
        scene: &mut Scene,
        measure: &dyn TextMeasure,
        event: InputEvent,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            InputEvent::Pointer(PointerEvent::Down { position, button }) => {
                effects.push(Effect::ClosePopovers);
                if button == MouseButton::Left {
                    self.pointer_down(scene, measure, position, &mut effects);
                }
            }
            InputEvent::Pointer(PointerEvent::Move { position }) => {
                self.pointer_move(scene, position, &mut effects);
            }
            InputEvent::Pointer(PointerEvent::Up { button, .. }) => {
                if button == MouseButton::Left {
                    self.pointer_up(scene, &mut effects);
                }
            }
            InputEvent::DoubleClick { position } => {
                self.double_click(scene, measure, position, &mut effects);
            }
            InputEvent::Key(key) => self.key(scene, measure, &key, &mut effects),
            InputEvent::TextChanged(value) => {
                if let InteractionState::TextEditing(editor) = &mut self.state {
                    editor.set_value(value);
                    if let Some(action) = editor.live_update(scene, measure) {
                        scene.apply(action);
                        effects.push(Effect::Redraw);
                    }
                }
            }
            InputEvent::FocusLost => {
                self.commit_text(scene, measure, &mut effects);
            }
        }
        effects
    }

    /// Commit an open text edit and drop any gesture in progress.
    pub fn settle(&mut self, scene: &mut Scene, measure: &dyn TextMeasure) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.commit_text(scene, measure, &mut effects);
        if !matches!(self.state, InteractionState::Idle) {
            self.state = InteractionState::Idle;
            effects.push(Effect::Redraw);
        }
        effects
    }

    fn commit_text(&mut self, scene: &mut Scene, measure: &dyn TextMeasure, effects: &mut Vec<Effect>) {
        if !matches!(self.state, InteractionState::TextEditing(_)) {
            return;
        }
        if let InteractionState::TextEditing(editor) = mem::take(&mut self.state) {
            for action in editor.commit(scene, measure) {
                scene.apply(action);
            }
            effects.push(Effect::CloseTextEditor);
            effects.push(Effect::Redraw);
        }
    }

    fn revert_text(&mut self, scene: &mut Scene, effects: &mut Vec<Effect>) {
        if let InteractionState::TextEditing(editor) = mem::take(&mut self.state) {
            for action in editor.revert(scene) {
                scene.apply(action);
            }
            effects.push(Effect::CloseTextEditor);
            effects.push(Effect::Redraw);
        }
    }

    fn pointer_down(
        &mut self,
        scene: &mut Scene,
        measure: &dyn TextMeasure,
        point: Point,
        effects: &mut Vec<Effect>,
    ) {
        let Some(page_id) = scene.active_page_id() else {
            return;
        };

        // Pressing the canvas takes focus away from the overlay.
        self.commit_text(scene, measure, effects);
        if !matches!(self.state, InteractionState::Idle) {
            log::debug!("discarding unfinished gesture");
            self.state = InteractionState::Idle;
        }

        match scene.tool() {
            ToolKind::Text => self.text_down(scene, measure, page_id, point, effects),
            ToolKind::Select => {
                let hit = hit_test(point, scene.active_shapes()).map(|s| (s.id(), s.anchor()));
                scene.apply(Action::Select(hit.map(|(id, _)| id)));
                if let Some((shape_id, anchor)) = hit {
                    self.state = InteractionState::Dragging {
                        shape_id,
                        page_id,
                        grab_offset: point - anchor,
                    };
                }
                effects.push(Effect::Redraw);
            }
            ToolKind::Eraser => {
                self.state = InteractionState::Erasing;
                erase_at(scene, page_id, point, effects);
            }
            tool => {
                if let Some(gesture) = DrawGesture::begin(tool, page_id, point, scene.style()) {
                    self.state = InteractionState::Drawing(gesture);
                    effects.push(Effect::Redraw);
                }
            }
        }
    }

    fn text_down(
        &mut self,
        scene: &mut Scene,
        measure: &dyn TextMeasure,
        page_id: PageId,
        point: Point,
        effects: &mut Vec<Effect>,
    ) {
        if let Some(text) = hit_test(point, scene.active_shapes()).and_then(Shape::as_text) {
            let editor = TextEditor::for_existing(page_id, text);
            self.open_editor(scene, editor, effects);
            return;
        }

        let style = scene.style();
        let width = measure.measure(PLACEHOLDER, &style.font_family, style.font_size);
        let base = ShapeBase::new(page_id, Point::new(point.x, point.y + style.font_size))
            .with_color(style.color);
        let text = Text::new(base, PLACEHOLDER, style.font_family.clone(), style.font_size, width);
        let shape_id = text.base.id;
        scene.apply(Action::AddShape {
            page_id,
            shape: Shape::Text(text),
        });
        self.open_editor(scene, TextEditor::for_new(shape_id, page_id, point), effects);
    }

    fn open_editor(&mut self, scene: &mut Scene, editor: TextEditor, effects: &mut Vec<Effect>) {
        scene.apply(Action::Select(Some(editor.shape_id())));
        let style = scene.style();
        let font = match scene
            .shape(editor.page_id(), editor.shape_id())
            .and_then(Shape::as_text)
        {
            Some(text) => OverlayFont {
                family: text.font_family.clone(),
                size: text.font_size,
                color: text.base.color.unwrap_or(style.color),
            },
            None => OverlayFont {
                family: style.font_family.clone(),
                size: style.font_size,
                color: style.color,
            },
        };
        effects.push(Effect::OpenTextEditor {
            shape_id: editor.shape_id(),
            origin: editor.origin(),
            value: editor.value().to_string(),
            font,
        });
        effects.push(Effect::Redraw);
        self.state = InteractionState::TextEditing(editor);
    }

    fn pointer_move(&mut self, scene: &mut Scene, point: Point, effects: &mut Vec<Effect>) {
        match &mut self.state {
            InteractionState::Drawing(gesture) => {
                gesture.update(point);
                effects.push(Effect::Redraw);
            }
            InteractionState::Dragging {
                shape_id,
                page_id,
                grab_offset,
            } => {
                scene.apply(Action::UpdateShape {
                    page_id: *page_id,
                    shape_id: *shape_id,
                    patch: ShapePatch::position(point - *grab_offset),
                });
                effects.push(Effect::Redraw);
            }
            InteractionState::Erasing => {
                if let Some(page_id) = scene.active_page_id() {
                    erase_at(scene, page_id, point, effects);
                }
            }
            InteractionState::Idle | InteractionState::TextEditing(_) => {}
        }
    }

    fn pointer_up(&mut self, scene: &mut Scene, effects: &mut Vec<Effect>) {
        match mem::take(&mut self.state) {
            InteractionState::Drawing(gesture) => {
                let page_id = gesture.preview.page_id();
                scene.apply(Action::AddShape {
                    page_id,
                    shape: gesture.finish(),
                });
                effects.push(Effect::Redraw);
            }
            // The overlay outlives the click that opened it.
            editing @ InteractionState::TextEditing(_) => self.state = editing,
            InteractionState::Idle
            | InteractionState::Dragging { .. }
            | InteractionState::Erasing => {}
        }
    }

    fn double_click(
        &mut self,
        scene: &mut Scene,
        measure: &dyn TextMeasure,
        point: Point,
        effects: &mut Vec<Effect>,
    ) {
        let Some(page_id) = scene.active_page_id() else {
            return;
        };
        let Some(shape_id) = hit_test(point, scene.active_shapes())
            .and_then(Shape::as_text)
            .map(|t| t.base.id)
        else {
            return;
        };
        if self.editor().is_some_and(|e| e.shape_id() == shape_id) {
            return;
        }

        self.commit_text(scene, measure, effects);
        // The commit may have removed or changed the shape.
        if let Some(text) = scene.shape(page_id, shape_id).and_then(Shape::as_text) {
            let editor = TextEditor::for_existing(page_id, text);
            self.open_editor(scene, editor, effects);
        }
    }

    fn key(
        &mut self,
        scene: &mut Scene,
        measure: &dyn TextMeasure,
        key: &KeyEvent,
        effects: &mut Vec<Effect>,
    ) {
        if let InteractionState::TextEditing(editor) = &mut self.state {
            match editor.handle_key(key) {
                TextEditResult::Changed => {
                    if let Some(action) = editor.live_update(scene, measure) {
                        scene.apply(action);
                    }
                    effects.push(Effect::Redraw);
                    return;
                }
                TextEditResult::Handled => return,
                TextEditResult::Commit => {
                    self.commit_text(scene, measure, effects);
                    return;
                }
                TextEditResult::Revert => {
                    self.revert_text(scene, effects);
                    return;
                }
                TextEditResult::NotHandled => {}
            }
        }

        if key.key == Key::Delete {
            if let (Some(page_id), Some(shape_id)) = (scene.active_page_id(), scene.selection()) {
                scene.apply(Action::DeleteShape { page_id, shape_id });
                effects.push(Effect::Redraw);
            }
        } else if key.modifiers.action_mod() && key.is_char('t') {
            self.settle_into(scene, measure, effects);
            scene.apply(Action::AddPage {
                id: None,
                name: None,
            });
            if let Some(page_id) = scene.active_page_id() {
                effects.push(Effect::PageAdded(page_id));
            }
            effects.push(Effect::Redraw);
        }
    }

    fn settle_into(&mut self, scene: &mut Scene, measure: &dyn TextMeasure, effects: &mut Vec<Effect>) {
        effects.extend(self.settle(scene, measure));
    }
}

fn erase_at(scene: &mut Scene, page_id: PageId, point: Point, effects: &mut Vec<Effect>) {
    if let Some(shape_id) = hit_test(point, scene.shapes(page_id)).map(Shape::id) {
        scene.apply(Action::DeleteShape { page_id, shape_id });
        effects.push(Effect::Redraw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::shapes::Rectangle;
    use crate::text_measure::ApproximateMeasure;

    struct Rig {
        scene: Scene,
        interaction: Interaction,
        page: PageId,
    }

    impl Rig {
        fn new() -> Self {
            let mut scene = Scene::new();
            scene.apply(Action::AddPage {
                id: None,
                name: None,
            });
            let page = scene.active_page_id().unwrap();
            Self {
                scene,
                interaction: Interaction::new(),
                page,
            }
        }

        fn send(&mut self, event: impl Into<InputEvent>) -> Vec<Effect> {
            self.interaction
                .handle(&mut self.scene, &ApproximateMeasure, event.into())
        }

        fn down(&mut self, x: f64, y: f64) -> Vec<Effect> {
            self.send(PointerEvent::Down {
                position: Point::new(x, y),
                button: MouseButton::Left,
            })
        }

        fn drag(&mut self, x: f64, y: f64) -> Vec<Effect> {
            self.send(PointerEvent::Move {
                position: Point::new(x, y),
            })
        }

        fn up(&mut self, x: f64, y: f64) -> Vec<Effect> {
            self.send(PointerEvent::Up {
                position: Point::new(x, y),
                button: MouseButton::Left,
            })
        }

        fn tool(&mut self, tool: ToolKind) {
            self.scene.apply(Action::SetTool(tool));
        }

        fn add_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> ShapeId {
            let shape = Shape::Rectangle(Rectangle::new(
                ShapeBase::new(self.page, Point::new(x, y)),
                w,
                h,
            ));
            let id = shape.id();
            self.scene.apply(Action::AddShape {
                page_id: self.page,
                shape,
            });
            id
        }
    }

    #[test]
    fn test_close_popovers_precedes_everything() {
        let mut rig = Rig::new();
        let effects = rig.down(5.0, 5.0);
        assert_eq!(effects.first(), Some(&Effect::ClosePopovers));

        let right = rig.send(PointerEvent::Down {
            position: Point::ZERO,
            button: MouseButton::Right,
        });
        assert_eq!(right, vec![Effect::ClosePopovers]);
    }

    #[test]
    fn test_no_active_page_ignores_pointer() {
        let mut rig = Rig::new();
        rig.scene.apply(Action::DeletePage(rig.page));
        rig.tool(ToolKind::Rect);
        rig.down(0.0, 0.0);
        assert!(rig.interaction.transient().is_none());
        assert_eq!(rig.interaction.state(), &InteractionState::Idle);
    }

    #[test]
    fn test_transient_stays_out_of_scene_until_release() {
        let mut rig = Rig::new();
        rig.tool(ToolKind::Line);
        rig.down(0.0, 0.0);
        rig.drag(30.0, 40.0);
        assert!(rig.scene.shapes(rig.page).is_empty());
        assert!(rig.interaction.transient().is_some());

        rig.up(30.0, 40.0);
        assert!(rig.interaction.transient().is_none());
        let shapes = rig.scene.shapes(rig.page);
        assert_eq!(shapes.len(), 1);
        assert_eq!(rig.scene.selection(), Some(shapes[0].id()));
    }

    #[test]
    fn test_select_click_on_empty_clears_selection() {
        let mut rig = Rig::new();
        let id = rig.add_rect(0.0, 0.0, 10.0, 10.0);
        assert_eq!(rig.scene.selection(), Some(id));
        rig.down(100.0, 100.0);
        assert_eq!(rig.scene.selection(), None);
        assert_eq!(rig.interaction.state(), &InteractionState::Idle);
    }

    #[test]
    fn test_drag_keeps_grab_offset() {
        let mut rig = Rig::new();
        let id = rig.add_rect(10.0, 10.0, 20.0, 20.0);
        rig.down(15.0, 12.0);
        rig.drag(25.0, 32.0);
        rig.drag(40.0, 52.0);
        rig.up(40.0, 52.0);
        let shape = rig.scene.shape(rig.page, id).unwrap();
        assert_eq!(shape.anchor(), Point::new(35.0, 50.0));
        assert_eq!(rig.interaction.state(), &InteractionState::Idle);
    }

    #[test]
    fn test_text_tool_on_existing_text_edits_it() {
        let mut rig = Rig::new();
        rig.tool(ToolKind::Text);
        rig.down(20.0, 20.0);
        rig.send(InputEvent::TextChanged("Hello".into()));
        rig.send(KeyEvent::plain(Key::Enter));
        let id = rig.scene.shapes(rig.page)[0].id();

        rig.tool(ToolKind::Text);
        let effects = rig.down(22.0, 30.0);
        assert_eq!(rig.scene.shapes(rig.page).len(), 1);
        let opened = effects.iter().find_map(|e| match e {
            Effect::OpenTextEditor {
                shape_id,
                origin,
                value,
                ..
            } => Some((*shape_id, *origin, value.clone())),
            _ => None,
        });
        assert_eq!(opened, Some((id, Point::new(20.0, 20.0), "Hello".to_string())));
    }

    #[test]
    fn test_press_while_editing_commits_first() {
        let mut rig = Rig::new();
        rig.tool(ToolKind::Text);
        rig.down(20.0, 20.0);
        rig.send(InputEvent::TextChanged("  ".into()));
        let effects = rig.down(200.0, 200.0);
        assert!(effects.contains(&Effect::CloseTextEditor));
        // Blank text was dropped and the tool fell back to select.
        assert!(rig.scene.shapes(rig.page).is_empty());
        assert_eq!(rig.scene.tool(), ToolKind::Select);
        assert!(rig.interaction.editor().is_none());
    }

    #[test]
    fn test_escape_keeps_live_content() {
        let mut rig = Rig::new();
        rig.tool(ToolKind::Text);
        rig.down(0.0, 0.0);
        rig.send(InputEvent::TextChanged("draft ".into()));
        let effects = rig.send(KeyEvent::plain(Key::Escape));
        assert!(effects.contains(&Effect::CloseTextEditor));
        let text = rig.scene.shapes(rig.page)[0].as_text().unwrap().clone();
        assert_eq!(text.content, "draft ");
        assert_eq!(rig.scene.tool(), ToolKind::Select);
    }

    #[test]
    fn test_double_click_edits_text_with_any_tool() {
        let mut rig = Rig::new();
        rig.tool(ToolKind::Text);
        rig.down(50.0, 50.0);
        rig.send(InputEvent::TextChanged("note".into()));
        rig.send(InputEvent::FocusLost);
        rig.tool(ToolKind::Pencil);

        let effects = rig.send(InputEvent::DoubleClick {
            position: Point::new(52.0, 60.0),
        });
        assert!(effects.iter().any(|e| matches!(e, Effect::OpenTextEditor { .. })));
        assert!(rig.interaction.editor().is_some());
    }

    #[test]
    fn test_delete_key_removes_selection() {
        let mut rig = Rig::new();
        let keep = rig.add_rect(0.0, 0.0, 5.0, 5.0);
        rig.add_rect(20.0, 20.0, 5.0, 5.0);
        rig.send(KeyEvent::plain(Key::Delete));
        let ids: Vec<_> = rig.scene.shapes(rig.page).iter().map(Shape::id).collect();
        assert_eq!(ids, vec![keep]);
        assert_eq!(rig.scene.selection(), None);
    }

    #[test]
    fn test_shortcut_adds_page() {
        let mut rig = Rig::new();
        let event = KeyEvent {
            key: Key::Character("T".into()),
            modifiers: Modifiers {
                meta: true,
                ..Modifiers::NONE
            },
        };
        let effects = rig.send(event);
        let added = rig.scene.active_page_id().unwrap();
        assert_ne!(added, rig.page);
        assert!(effects.contains(&Effect::PageAdded(added)));
        assert_eq!(rig.scene.pages().len(), 2);
    }
}
