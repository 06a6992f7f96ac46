//! Backend-independent draw commands for one frame.
//!
//! Geometry stays in logical pixels; backends apply the device pixel ratio.

use crate::renderer::{DEFAULT_STROKE_WIDTH, Palette, RenderContext, SELECTION_DASH};
use inkboard_core::shapes::Shape;
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use peniko::Color;

/// A single drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Stroke an open or closed path.
    Stroke {
        path: BezPath,
        color: Color,
        width: f64,
        dash: Option<[f64; 2]>,
    },
    /// Fill a single line of text with its baseline starting at `origin`.
    Text {
        content: String,
        font_family: String,
        font_size: f64,
        origin: Point,
        color: Color,
    },
}

/// Draw commands for `ctx`: every shape in paint order, each followed by its
/// selection outline when selected.
pub fn build_display_list(ctx: &RenderContext) -> Vec<DrawOp> {
    let mut ops = Vec::with_capacity(ctx.shapes.len() + 2);
    for shape in ctx.paint_order() {
        push_shape(&mut ops, shape, &ctx.palette);
        if ctx.selection == Some(shape.id()) {
            ops.push(selection_outline(shape.bounds(), &ctx.palette));
        }
    }
    ops
}

fn push_shape(ops: &mut Vec<DrawOp>, shape: &Shape, palette: &Palette) {
    let color = shape.color().map(Color::from);
    let stroke = |path: BezPath| DrawOp::Stroke {
        path,
        color: color.unwrap_or(palette.accent),
        width: shape.stroke_width().unwrap_or(DEFAULT_STROKE_WIDTH),
        dash: None,
    };

    match shape {
        Shape::Rectangle(rect) => {
            // Unnormalized while being drawn.
            let outline = Rect::new(
                rect.base.x,
                rect.base.y,
                rect.base.x + rect.width,
                rect.base.y + rect.height,
            );
            ops.push(stroke(outline.to_path(0.1)));
        }
        Shape::Circle(circle) => {
            ops.push(stroke(circle.as_kurbo().to_path(0.1)));
        }
        Shape::Line(line) => {
            ops.push(stroke(segment(line.start(), line.end())));
        }
        Shape::Arrow(arrow) => {
            ops.push(stroke(segment(arrow.start(), arrow.end())));
            let mut head = BezPath::new();
            for (tip, wing) in arrow.head() {
                head.move_to(tip);
                head.line_to(wing);
            }
            ops.push(stroke(head));
        }
        Shape::Pencil(pencil) => {
            ops.push(stroke(pencil.to_path()));
        }
        Shape::Text(text) => {
            ops.push(DrawOp::Text {
                content: text.content.clone(),
                font_family: text.font_family.clone(),
                font_size: text.font_size,
                origin: text.baseline_origin(),
                color: color.unwrap_or(palette.text),
            });
        }
    }
}

fn segment(from: Point, to: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(from);
    path.line_to(to);
    path
}

fn selection_outline(bounds: Rect, palette: &Palette) -> DrawOp {
    DrawOp::Stroke {
        path: bounds.to_path(0.1),
        color: palette.selection,
        width: 1.0,
        dash: Some(SELECTION_DASH),
    }
}
