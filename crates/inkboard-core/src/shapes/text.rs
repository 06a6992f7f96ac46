//! Text shape.

use super::{ShapeBase, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A single line of text anchored at its baseline origin.
///
/// The visual box spans `(x, y - font_size)` to `(x + width, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    #[serde(flatten)]
    pub base: ShapeBase,
    pub content: String,
    pub font_size: f64,
    pub font_family: String,
    /// Measured width of `content`.
    pub width: f64,
    /// Always equal to `font_size`.
    pub height: f64,
}

impl Text {
    /// Create a new text shape. `width` is the measured width of `content`.
    pub fn new(
        base: ShapeBase,
        content: impl Into<String>,
        font_family: impl Into<String>,
        font_size: f64,
        width: f64,
    ) -> Self {
        Self {
            base,
            content: content.into(),
            font_size,
            font_family: font_family.into(),
            width,
            height: font_size,
        }
    }

    /// Top-left corner of the visual box.
    pub fn top_left(&self) -> Point {
        Point::new(self.base.x, self.base.y - self.font_size)
    }

    pub fn baseline_origin(&self) -> Point {
        self.base.anchor()
    }
}

impl ShapeTrait for Text {
    fn base(&self) -> &ShapeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.base.x,
            self.base.y - self.font_size,
            self.base.x + self.width,
            self.base.y,
        )
    }

    fn hit_test(&self, point: Point) -> bool {
        point.x >= self.base.x
            && point.x <= self.base.x + self.width
            && point.y >= self.base.y - self.font_size
            && point.y <= self.base.y
    }
}
