//! Arrow shape.

use super::line::segment_bounds;
use super::{ShapeBase, ShapeTrait};
use crate::geometry::{SHAPE_HIT_TOLERANCE, arrow_head, distance_to_segment};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A line with a two-stroke head drawn at its endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    #[serde(flatten)]
    pub base: ShapeBase,
    pub width: f64,
    pub height: f64,
}

impl Arrow {
    /// Create a new arrow.
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

    /// The two head strokes, each running from the tip back along the shaft.
    pub fn head(&self) -> [(Point, Point); 2] {
        arrow_head(self.start(), self.end())
    }
}

impl ShapeTrait for Arrow {
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
