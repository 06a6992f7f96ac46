//! Text overlay controller.
//!
//! While a text shape is being edited its content lives in a single-line
//! buffer. Every change is measured and written back to the shape so the
//! selection box tracks the text as it grows.

use crate::input::{Key, KeyEvent};
use crate::scene::{Action, Scene};
use crate::shapes::{PageId, ShapeId, ShapePatch, Text};
use crate::text_measure::TextMeasure;
use crate::tools::ToolKind;
use kurbo::Point;

/// Content given to freshly placed text.
pub const PLACEHOLDER: &str = "Type here...";

/// Result of handling a key in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEditResult {
    /// The buffer changed.
    Changed,
    /// Cursor or selection moved; content unchanged.
    Handled,
    /// Finish editing and keep the content.
    Commit,
    /// Finish editing without applying the buffer.
    Revert,
    /// Not an editing key.
    NotHandled,
}

/// Edit session for one text shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEditor {
    shape_id: ShapeId,
    page_id: PageId,
    /// Top-left of the overlay in canvas coordinates.
    origin: Point,
    value: String,
    /// Cursor position in chars.
    cursor: usize,
    /// Whole buffer selected; the next insertion replaces it.
    select_all: bool,
}

impl TextEditor {
    /// Session for a just-placed text showing the placeholder, fully selected.
    pub fn for_new(shape_id: ShapeId, page_id: PageId, origin: Point) -> Self {
        Self {
            shape_id,
            page_id,
            origin,
            value: PLACEHOLDER.to_string(),
            cursor: PLACEHOLDER.chars().count(),
            select_all: true,
        }
    }

    /// Session for an existing text; the overlay sits over its visual box.
    pub fn for_existing(page_id: PageId, text: &Text) -> Self {
        Self {
            shape_id: text.base.id,
            page_id,
            origin: text.top_left(),
            value: text.content.clone(),
            cursor: text.content.chars().count(),
            select_all: false,
        }
    }

    pub fn shape_id(&self) -> ShapeId {
        self.shape_id
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_all_selected(&self) -> bool {
        self.select_all
    }

    /// Replace the buffer with the overlay's current value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
        self.select_all = false;
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    fn clear_selection(&mut self) -> bool {
        if self.select_all {
            self.value.clear();
            self.cursor = 0;
            self.select_all = false;
            true
        } else {
            false
        }
    }

    fn insert(&mut self, text: &str) {
        self.clear_selection();
        let at = self.byte_index(self.cursor);
        self.value.insert_str(at, text);
        self.cursor += text.chars().count();
    }

    /// Apply a key to the buffer.
    pub fn handle_key(&mut self, event: &KeyEvent) -> TextEditResult {
        let action_mod = event.modifiers.action_mod();
        match &event.key {
            Key::Enter => TextEditResult::Commit,
            Key::Escape => TextEditResult::Revert,
            Key::Backspace => {
                if self.clear_selection() {
                    return TextEditResult::Changed;
                }
                if self.cursor == 0 {
                    return TextEditResult::Handled;
                }
                let start = self.byte_index(self.cursor - 1);
                let end = self.byte_index(self.cursor);
                self.value.replace_range(start..end, "");
                self.cursor -= 1;
                TextEditResult::Changed
            }
            Key::Delete => {
                if self.clear_selection() {
                    return TextEditResult::Changed;
                }
                if self.cursor >= self.char_len() {
                    return TextEditResult::Handled;
                }
                let start = self.byte_index(self.cursor);
                let end = self.byte_index(self.cursor + 1);
                self.value.replace_range(start..end, "");
                TextEditResult::Changed
            }
            Key::Left => {
                self.cursor = if self.select_all {
                    0
                } else {
                    self.cursor.saturating_sub(1)
                };
                self.select_all = false;
                TextEditResult::Handled
            }
            Key::Right => {
                self.cursor = if self.select_all {
                    self.char_len()
                } else {
                    (self.cursor + 1).min(self.char_len())
                };
                self.select_all = false;
                TextEditResult::Handled
            }
            Key::Home => {
                self.cursor = 0;
                self.select_all = false;
                TextEditResult::Handled
            }
            Key::End => {
                self.cursor = self.char_len();
                self.select_all = false;
                TextEditResult::Handled
            }
            Key::Character(_) if action_mod => {
                if event.is_char('a') {
                    self.select_all = true;
                    self.cursor = self.char_len();
                    TextEditResult::Handled
                } else {
                    TextEditResult::NotHandled
                }
            }
            Key::Character(c) => {
                // Single-line overlay.
                let filtered: String = c.chars().filter(|ch| !ch.is_control()).collect();
                if filtered.is_empty() {
                    return TextEditResult::NotHandled;
                }
                self.insert(&filtered);
                TextEditResult::Changed
            }
        }
    }

    /// Write the live buffer and its width back to the shape.
    pub fn live_update(&self, scene: &Scene, measure: &dyn TextMeasure) -> Option<Action> {
        let text = scene.shape(self.page_id, self.shape_id)?.as_text()?;
        let width = measure.measure(&self.value, &text.font_family, text.font_size);
        Some(Action::UpdateShape {
            page_id: self.page_id,
            shape_id: self.shape_id,
            patch: ShapePatch::text(self.value.clone(), width),
        })
    }

    /// Finish editing keeping the trimmed buffer. Empty content deletes the shape.
    pub fn commit(self, scene: &Scene, measure: &dyn TextMeasure) -> Vec<Action> {
        let mut actions = Vec::with_capacity(2);
        let trimmed = self.value.trim();
        if trimmed.is_empty() {
            actions.push(Action::DeleteShape {
                page_id: self.page_id,
                shape_id: self.shape_id,
            });
        } else if let Some(text) = scene
            .shape(self.page_id, self.shape_id)
            .and_then(|s| s.as_text())
        {
            let width = measure.measure(trimmed, &text.font_family, text.font_size);
            actions.push(Action::UpdateShape {
                page_id: self.page_id,
                shape_id: self.shape_id,
                patch: ShapePatch::text(trimmed, width),
            });
        }
        actions.push(Action::SetTool(ToolKind::Select));
        actions
    }

    /// Finish editing without applying the buffer.
    ///
    /// The shape keeps whatever content was last written to it, and is removed
    /// if that content is blank.
    pub fn revert(self, scene: &Scene) -> Vec<Action> {
        let mut actions = Vec::with_capacity(2);
        let blank = scene
            .shape(self.page_id, self.shape_id)
            .and_then(|s| s.as_text())
            .is_some_and(|t| t.content.trim().is_empty());
        if blank {
            actions.push(Action::DeleteShape {
                page_id: self.page_id,
                shape_id: self.shape_id,
            });
        }
        actions.push(Action::SetTool(ToolKind::Select));
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Shape, ShapeBase};
    use crate::text_measure::ApproximateMeasure;
    use uuid::Uuid;

    fn key(k: Key) -> KeyEvent {
        KeyEvent::plain(k)
    }

    fn typed(s: &str) -> KeyEvent {
        key(Key::Character(s.into()))
    }

    fn scene_with_text(content: &str) -> (Scene, PageId, Text) {
        let mut scene = Scene::new();
        scene.apply(Action::AddPage {
            id: None,
            name: None,
        });
        let page = scene.active_page_id().unwrap();
        let text = Text::new(
            ShapeBase::new(page, Point::new(20.0, 36.0)),
            content,
            "Arial",
            16.0,
            ApproximateMeasure.measure(content, "Arial", 16.0),
        );
        scene.apply(Action::AddShape {
            page_id: page,
            shape: Shape::Text(text.clone()),
        });
        (scene, page, text)
    }

    #[test]
    fn test_first_keystroke_replaces_placeholder() {
        let mut editor = TextEditor::for_new(Uuid::new_v4(), Uuid::new_v4(), Point::ZERO);
        assert_eq!(editor.value(), PLACEHOLDER);
        assert_eq!(editor.handle_key(&typed("H")), TextEditResult::Changed);
        assert_eq!(editor.handle_key(&typed("i")), TextEditResult::Changed);
        assert_eq!(editor.value(), "Hi");
    }

    #[test]
    fn test_cursor_editing() {
        let (_, page, text) = scene_with_text("abc");
        let mut editor = TextEditor::for_existing(page, &text);
        editor.handle_key(&key(Key::Left));
        editor.handle_key(&key(Key::Backspace));
        assert_eq!(editor.value(), "ac");
        editor.handle_key(&key(Key::Home));
        editor.handle_key(&key(Key::Delete));
        assert_eq!(editor.value(), "c");
        editor.handle_key(&typed("é"));
        assert_eq!(editor.value(), "éc");
        assert_eq!(editor.cursor(), 1);
    }

    #[test]
    fn test_select_all_then_backspace_clears() {
        let (_, page, text) = scene_with_text("hello");
        let mut editor = TextEditor::for_existing(page, &text);
        let select_all = KeyEvent::with_action_mod(Key::Character("a".into()));
        assert_eq!(editor.handle_key(&select_all), TextEditResult::Handled);
        assert_eq!(editor.handle_key(&key(Key::Backspace)), TextEditResult::Changed);
        assert_eq!(editor.value(), "");
    }

    #[test]
    fn test_shortcuts_pass_through() {
        let (_, page, text) = scene_with_text("x");
        let mut editor = TextEditor::for_existing(page, &text);
        let new_page = KeyEvent::with_action_mod(Key::Character("t".into()));
        assert_eq!(editor.handle_key(&new_page), TextEditResult::NotHandled);
        assert_eq!(editor.value(), "x");
    }

    #[test]
    fn test_overlay_origin_is_visual_top_left() {
        let (_, page, text) = scene_with_text("x");
        let editor = TextEditor::for_existing(page, &text);
        assert_eq!(editor.origin(), Point::new(20.0, 20.0));
    }

    #[test]
    fn test_commit_trims_and_measures() {
        let (mut scene, page, text) = scene_with_text("old");
        let mut editor = TextEditor::for_existing(page, &text);
        editor.set_value("  Hi  ");
        for action in editor.commit(&scene, &ApproximateMeasure) {
            scene.apply(action);
        }
        let stored = scene.shape(page, text.base.id).unwrap().as_text().unwrap();
        assert_eq!(stored.content, "Hi");
        assert!((stored.width - ApproximateMeasure.measure("Hi", "Arial", 16.0)).abs() < 1e-9);
        assert_eq!(scene.tool(), ToolKind::Select);
    }

    #[test]
    fn test_commit_blank_deletes() {
        let (mut scene, page, text) = scene_with_text("old");
        let mut editor = TextEditor::for_existing(page, &text);
        editor.set_value("   ");
        for action in editor.commit(&scene, &ApproximateMeasure) {
            scene.apply(action);
        }
        assert!(scene.shape(page, text.base.id).is_none());
        assert_eq!(scene.selection(), None);
    }

    #[test]
    fn test_revert_keeps_last_applied_content() {
        let (mut scene, page, text) = scene_with_text("old");
        let mut editor = TextEditor::for_existing(page, &text);
        editor.set_value("new");
        let live = editor.live_update(&scene, &ApproximateMeasure).unwrap();
        scene.apply(live);
        for action in editor.revert(&scene) {
            scene.apply(action);
        }
        let stored = scene.shape(page, text.base.id).unwrap().as_text().unwrap();
        assert_eq!(stored.content, "new");
    }

    #[test]
    fn test_revert_deletes_blank_shape() {
        let (mut scene, page, text) = scene_with_text("");
        let editor = TextEditor::for_existing(page, &text);
        for action in editor.revert(&scene) {
            scene.apply(action);
        }
        assert!(scene.shape(page, text.base.id).is_none());
    }
}
