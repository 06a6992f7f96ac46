//! Tool system for the whiteboard.

use crate::shapes::{
    Arrow, Circle, Line, PageId, Pencil, Rectangle, SerializableColor, Shape, ShapeBase,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Pencil,
    Line,
    Circle,
    Rect,
    Arrow,
    Text,
    Eraser,
}

impl ToolKind {
    pub const ALL: [ToolKind; 8] = [
        ToolKind::Select,
        ToolKind::Pencil,
        ToolKind::Line,
        ToolKind::Circle,
        ToolKind::Rect,
        ToolKind::Arrow,
        ToolKind::Text,
        ToolKind::Eraser,
    ];

    /// Tools that create a shape through a press-drag-release gesture.
    pub fn is_drawing(self) -> bool {
        matches!(
            self,
            ToolKind::Pencil | ToolKind::Line | ToolKind::Circle | ToolKind::Rect | ToolKind::Arrow
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Pencil => "pencil",
            ToolKind::Line => "line",
            ToolKind::Circle => "circle",
            ToolKind::Rect => "rect",
            ToolKind::Arrow => "arrow",
            ToolKind::Text => "text",
            ToolKind::Eraser => "eraser",
        }
    }
}

/// Style settings applied to newly created shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolStyle {
    pub color: SerializableColor,
    pub font_family: String,
    pub font_size: f64,
    pub stroke_width: f64,
}

impl ToolStyle {
    pub const DEFAULT_COLOR: SerializableColor = SerializableColor::rgb(0x60, 0xa5, 0xfa);
    pub const DEFAULT_FONT: &'static str = "Arial";
    pub const DEFAULT_FONT_SIZE: f64 = 16.0;
    pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

    /// Shape base carrying this style's color and stroke width.
    pub fn shape_base(&self, page_id: PageId, anchor: Point) -> ShapeBase {
        ShapeBase::new(page_id, anchor)
            .with_color(self.color)
            .with_stroke_width(self.stroke_width)
    }
}

impl Default for ToolStyle {
    fn default() -> Self {
        Self {
            color: Self::DEFAULT_COLOR,
            font_family: Self::DEFAULT_FONT.to_string(),
            font_size: Self::DEFAULT_FONT_SIZE,
            stroke_width: Self::DEFAULT_STROKE_WIDTH,
        }
    }
}

/// An in-progress draw gesture and its transient shape.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawGesture {
    /// Tool that started the gesture.
    pub tool: ToolKind,
    /// Pointer position at press.
    pub start: Point,
    /// Shape as it would be committed right now.
    pub preview: Shape,
}

impl DrawGesture {
    /// Start a gesture. Returns `None` for tools that do not draw.
    pub fn begin(tool: ToolKind, page_id: PageId, point: Point, style: &ToolStyle) -> Option<Self> {
        let base = style.shape_base(page_id, point);
        let preview = match tool {
            ToolKind::Pencil => Shape::Pencil(Pencil::new(base, vec![point])),
            ToolKind::Line => Shape::Line(Line::new(base, 0.0, 0.0)),
            ToolKind::Arrow => Shape::Arrow(Arrow::new(base, 0.0, 0.0)),
            ToolKind::Rect => Shape::Rectangle(Rectangle::new(base, 0.0, 0.0)),
            ToolKind::Circle => Shape::Circle(Circle::new(base, 1.0)),
            ToolKind::Select | ToolKind::Text | ToolKind::Eraser => return None,
        };
        Some(Self {
            tool,
            start: point,
            preview,
        })
    }

    /// Replace the transient shape with one extended to `point`.
    pub fn update(&mut self, point: Point) {
        let dx = point.x - self.start.x;
        let dy = point.y - self.start.y;
        let base = self.preview.base().clone();
        self.preview = match &self.preview {
            Shape::Pencil(p) => Shape::Pencil(p.with_point(point)),
            Shape::Line(_) => Shape::Line(Line::new(base, dx, dy)),
            Shape::Arrow(_) => Shape::Arrow(Arrow::new(base, dx, dy)),
            Shape::Rectangle(_) => Shape::Rectangle(Rectangle::new(base, dx, dy)),
            Shape::Circle(_) => Shape::Circle(Circle::new(base, dx.hypot(dy))),
            Shape::Text(_) => return,
        };
    }

    /// Finish the gesture and return the shape to commit.
    pub fn finish(self) -> Shape {
        match self.preview {
            Shape::Rectangle(r) => Shape::Rectangle(r.normalized()),
            other => other,
        }
    }
}
