//! Geometry helpers shared by shapes, the interaction layer and renderers.

use crate::shapes::Shape;
use kurbo::{Point, Rect};
use std::f64::consts::PI;

/// Hit radius added around circles, lines and arrows.
pub const SHAPE_HIT_TOLERANCE: f64 = 6.0;

/// Hit radius around freehand strokes.
pub const PENCIL_HIT_TOLERANCE: f64 = 4.0;

/// Length of each arrow-head stroke.
pub const ARROW_HEAD_LENGTH: f64 = 10.0;

/// Angle between the shaft and each arrow-head stroke.
pub const ARROW_HEAD_ANGLE: f64 = PI / 6.0;

/// Axis-aligned bounding box of a shape.
pub fn bounds_of(shape: &Shape) -> Rect {
    shape.bounds()
}

/// Distance from `p` to the segment `a`-`b`.
///
/// A zero-length segment degrades to the distance between `p` and `a`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Topmost shape under `point`.
///
/// `shapes` is in draw order, so the walk runs back to front.
pub fn hit_test(point: Point, shapes: &[Shape]) -> Option<&Shape> {
    shapes.iter().rev().find(|shape| shape.hit_test(point))
}

/// Two head strokes for an arrow pointing from `from` to `to`.
///
/// Each pair runs from the tip back along `angle ± 30°`.
pub fn arrow_head(from: Point, to: Point) -> [(Point, Point); 2] {
    let angle = (to.y - from.y).atan2(to.x - from.x);
    let stroke = |theta: f64| {
        Point::new(
            to.x - ARROW_HEAD_LENGTH * theta.cos(),
            to.y - ARROW_HEAD_LENGTH * theta.sin(),
        )
    };
    [
        (to, stroke(angle - ARROW_HEAD_ANGLE)),
        (to, stroke(angle + ARROW_HEAD_ANGLE)),
    ]
}
