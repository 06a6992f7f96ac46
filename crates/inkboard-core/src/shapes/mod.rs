//! Shape definitions for the whiteboard.

mod arrow;
mod circle;
mod line;
mod pencil;
mod rectangle;
mod text;

pub use arrow::Arrow;
pub use circle::Circle;
pub use line::Line;
pub use pencil::Pencil;
pub use rectangle::Rectangle;
pub use text::Text;

use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Unique identifier for pages.
pub type PageId = Uuid;

/// Serializable color representation (RGBA8).
///
/// Serialized as a CSS hex string (`#rrggbb`, or `#rrggbbaa` when not opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => {
                let r = channel(0..1)?;
                let g = channel(1..2)?;
                let b = channel(2..3)?;
                Some(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 => Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Format as a CSS hex string.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

impl Serialize for SerializableColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SerializableColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color: {raw}")))
    }
}

/// Fields shared by every shape variant.
///
/// The meaning of the anchor `(x, y)` depends on the variant: top-left corner
/// for rectangles, center for circles, start point for lines and arrows,
/// baseline origin for text and first point for pencil strokes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeBase {
    pub id: ShapeId,
    pub page_id: PageId,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<SerializableColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// Rotation in radians. Reserved; geometry ignores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl ShapeBase {
    /// Create a base with a fresh id at the given anchor.
    pub fn new(page_id: PageId, anchor: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            page_id,
            x: anchor.x,
            y: anchor.y,
            color: None,
            stroke_width: None,
            rotation: None,
        }
    }

    /// Set the stroke color.
    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Set the stroke width.
    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Shared fields.
    fn base(&self) -> &ShapeBase;

    /// Mutable shared fields.
    fn base_mut(&mut self) -> &mut ShapeBase;

    /// Axis-aligned bounding box.
    fn bounds(&self) -> Rect;

    /// Check if a point hits this shape, using the variant's fixed tolerance.
    fn hit_test(&self, point: Point) -> bool;

    /// Move the shape by `delta`.
    fn translate(&mut self, delta: Vec2) {
        let base = self.base_mut();
        base.x += delta.x;
        base.y += delta.y;
    }

    fn id(&self) -> ShapeId {
        self.base().id
    }
}

/// Enum wrapper for all shape types.
///
/// Serialized with a `type` discriminator so records stay compatible with the
/// persistence API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rectangle(Rectangle),
    Circle(Circle),
    Line(Line),
    Arrow(Arrow),
    Text(Text),
    Pencil(Pencil),
}

impl Shape {
    fn as_trait(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Rectangle(s) => s,
            Shape::Circle(s) => s,
            Shape::Line(s) => s,
            Shape::Arrow(s) => s,
            Shape::Text(s) => s,
            Shape::Pencil(s) => s,
        }
    }

    fn as_trait_mut(&mut self) -> &mut dyn ShapeTrait {
        match self {
            Shape::Rectangle(s) => s,
            Shape::Circle(s) => s,
            Shape::Line(s) => s,
            Shape::Arrow(s) => s,
            Shape::Text(s) => s,
            Shape::Pencil(s) => s,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.base().id
    }

    pub fn page_id(&self) -> PageId {
        self.base().page_id
    }

    pub fn base(&self) -> &ShapeBase {
        self.as_trait().base()
    }

    pub fn base_mut(&mut self) -> &mut ShapeBase {
        self.as_trait_mut().base_mut()
    }

    pub fn anchor(&self) -> Point {
        self.base().anchor()
    }

    pub fn bounds(&self) -> Rect {
        self.as_trait().bounds()
    }

    pub fn hit_test(&self, point: Point) -> bool {
        self.as_trait().hit_test(point)
    }

    /// Move the anchor to `anchor`, keeping the shape's geometry relative to it.
    pub fn move_anchor_to(&mut self, anchor: Point) {
        let delta = anchor - self.anchor();
        self.as_trait_mut().translate(delta);
    }

    pub fn color(&self) -> Option<SerializableColor> {
        self.base().color
    }

    pub fn stroke_width(&self) -> Option<f64> {
        self.base().stroke_width
    }

    /// Lowercase discriminator, as used on the wire.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Rectangle(_) => "rectangle",
            Shape::Circle(_) => "circle",
            Shape::Line(_) => "line",
            Shape::Arrow(_) => "arrow",
            Shape::Text(_) => "text",
            Shape::Pencil(_) => "pencil",
        }
    }

    /// Get the text if this shape is a text.
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Merge a partial record into this shape.
    ///
    /// Fields the variant does not carry are ignored.
    pub fn apply_patch(&mut self, patch: &ShapePatch) {
        {
            let base = self.base_mut();
            if let Some(color) = patch.color {
                base.color = Some(color);
            }
            if let Some(width) = patch.stroke_width {
                base.stroke_width = Some(width);
            }
            if let Some(rotation) = patch.rotation {
                base.rotation = Some(rotation);
            }
        }

        match self {
            Shape::Rectangle(r) => {
                patch_extent(&mut r.width, &mut r.height, patch);
            }
            Shape::Line(l) => {
                patch_extent(&mut l.width, &mut l.height, patch);
            }
            Shape::Arrow(a) => {
                patch_extent(&mut a.width, &mut a.height, patch);
            }
            Shape::Circle(c) => {
                if let Some(radius) = patch.radius {
                    c.radius = radius;
                }
            }
            Shape::Text(t) => {
                if let Some(content) = &patch.content {
                    t.content = content.clone();
                }
                if let Some(size) = patch.font_size {
                    t.font_size = size;
                    t.height = size;
                }
                if let Some(family) = &patch.font_family {
                    t.font_family = family.clone();
                }
                if let Some(width) = patch.width {
                    t.width = width;
                }
            }
            Shape::Pencil(p) => {
                if let Some(points) = &patch.points {
                    if points.is_empty() {
                        log::debug!("ignoring empty point list for pencil {}", p.base.id);
                    } else {
                        p.set_points(points.clone());
                    }
                }
            }
        }

        if patch.x.is_some() || patch.y.is_some() {
            let current = self.anchor();
            let target = Point::new(patch.x.unwrap_or(current.x), patch.y.unwrap_or(current.y));
            self.move_anchor_to(target);
        }
    }
}

fn patch_extent(width: &mut f64, height: &mut f64, patch: &ShapePatch) {
    if let Some(w) = patch.width {
        *width = w;
    }
    if let Some(h) = patch.height {
        *height = h;
    }
}

/// A partial shape record. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<SerializableColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl ShapePatch {
    /// Patch that moves the anchor.
    pub fn position(anchor: Point) -> Self {
        Self {
            x: Some(anchor.x),
            y: Some(anchor.y),
            ..Self::default()
        }
    }

    /// Patch that replaces text content together with its measured width.
    pub fn text(content: impl Into<String>, width: f64) -> Self {
        Self {
            content: Some(content.into()),
            width: Some(width),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> PageId {
        Uuid::new_v4()
    }

    #[test]
    fn test_color_hex_roundtrip() {
        let color = SerializableColor::from_hex("#60a5fa").unwrap();
        assert_eq!(color, SerializableColor::rgb(0x60, 0xa5, 0xfa));
        assert_eq!(color.to_hex(), "#60a5fa");
        assert_eq!(
            SerializableColor::from_hex("#fff"),
            Some(SerializableColor::white())
        );
        assert_eq!(SerializableColor::from_hex("60a5fa"), None);
        assert_eq!(SerializableColor::from_hex("#12345"), None);
    }

    #[test]
    fn test_shape_json_uses_type_tag_and_camel_case() {
        let base = ShapeBase::new(page(), Point::new(1.0, 2.0)).with_stroke_width(3.0);
        let shape = Shape::Rectangle(Rectangle::new(base, 10.0, 20.0));
        let json = serde_json::to_value(&shape).unwrap();

        assert_eq!(json["type"], "rectangle");
        assert_eq!(json["strokeWidth"], 3.0);
        assert!(json.get("pageId").is_some());
        assert!(json.get("color").is_none());

        let back: Shape = serde_json::from_value(json).unwrap();
        assert_eq!(back, shape);
    }

    #[test]
    fn test_text_record_parses() {
        let id = Uuid::new_v4();
        let page_id = page();
        let json = serde_json::json!({
            "id": id,
            "type": "text",
            "pageId": page_id,
            "x": 20.0,
            "y": 36.0,
            "content": "Hi",
            "fontSize": 16.0,
            "fontFamily": "Arial",
            "color": "#0f172a",
            "width": 14.0,
            "height": 16.0
        });
        let shape: Shape = serde_json::from_value(json).unwrap();
        let text = shape.as_text().unwrap();
        assert_eq!(text.content, "Hi");
        assert_eq!(text.font_family, "Arial");
        assert_eq!(shape.color(), SerializableColor::from_hex("#0f172a"));
    }

    #[test]
    fn test_patch_ignores_fields_of_other_variants() {
        let base = ShapeBase::new(page(), Point::new(0.0, 0.0));
        let mut shape = Shape::Circle(Circle::new(base, 5.0));
        shape.apply_patch(&ShapePatch {
            width: Some(100.0),
            radius: Some(8.0),
            ..ShapePatch::default()
        });
        match &shape {
            Shape::Circle(c) => assert_eq!(c.radius, 8.0),
            other => panic!("expected circle, got {other:?}"),
        }
    }

    #[test]
    fn test_patch_position_moves_pencil_points() {
        let base = ShapeBase::new(page(), Point::new(10.0, 10.0));
        let mut shape = Shape::Pencil(Pencil::new(
            base,
            vec![Point::new(10.0, 10.0), Point::new(20.0, 15.0)],
        ));
        shape.apply_patch(&ShapePatch::position(Point::new(15.0, 5.0)));

        let Shape::Pencil(p) = &shape else {
            panic!("expected pencil");
        };
        assert_eq!(p.points, vec![Point::new(15.0, 5.0), Point::new(25.0, 10.0)]);
        assert_eq!(shape.anchor(), Point::new(15.0, 5.0));
    }

    #[test]
    fn test_patch_partial_position_keeps_other_axis() {
        let base = ShapeBase::new(page(), Point::new(3.0, 4.0));
        let mut shape = Shape::Line(Line::new(base, 10.0, 0.0));
        shape.apply_patch(&ShapePatch {
            x: Some(7.0),
            ..ShapePatch::default()
        });
        assert_eq!(shape.anchor(), Point::new(7.0, 4.0));
    }
}
