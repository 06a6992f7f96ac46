//! Line shape.

use super::{ShapeBase, ShapeTrait};
use crate::geometry::{SHAPE_HIT_TOLERANCE, distance_to_segment};
use kurbo::{Line as KurboLine, Point, Rect};
use serde::{Deserialize, Serialize};

/// A straight segment from the anchor to `(x + width, y + height)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    #[serde(flatten)]
    pub base: ShapeBase,
    /// Horizontal component of the anchor-to-endpoint vector.
    pub width: f64,
    /// Vertical component of the anchor-to-endpoint vector.
    pub height: f64,
}

impl Line {
    /// Create a new line.
    pub fn new(base: ShapeBase, width: f64, height: f64) -> Self {
        Self {
            base,
            width,
            height,
        }
    }

    pub fn start(&self) -> Point {
        self.base.anchor()
    }

    pub fn end(&self) -> Point {
        Point::new(self.base.x + self.width, self.base.y + self.height)
    }

    /// Get as a kurbo Line.
    pub fn as_kurbo(&self) -> KurboLine {
        KurboLine::new(self.start(), self.end())
    }
}

/// Box spanning both endpoints of a segment.
pub(crate) fn segment_bounds(start: Point, end: Point) -> Rect {
    Rect::from_points(start, end)
}

impl ShapeTrait for Line {
    fn base(&self) -> &ShapeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }

    fn bounds(&self) -> Rect {
        segment_bounds(self.start(), self.end())
    }

    fn hit_test(&self, point: Point) -> bool {
        distance_to_segment(point, self.start(), self.end()) < SHAPE_HIT_TOLERANCE
    }
}
