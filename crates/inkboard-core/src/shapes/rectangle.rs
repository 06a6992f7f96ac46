//! Rectangle shape.

use super::{ShapeBase, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle anchored at its top-left corner.
///
/// While a draw gesture is in progress `width` and `height` may be negative;
/// [`Rectangle::normalized`] reflects the anchor so both become non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    #[serde(flatten)]
    pub base: ShapeBase,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(base: ShapeBase, width: f64, height: f64) -> Self {
        Self {
            base,
            width,
            height,
        }
    }

    /// Copy with the anchor moved to the top-left corner and a non-negative extent.
    pub fn normalized(&self) -> Self {
        let mut base = self.base.clone();
        base.x = self.base.x.min(self.base.x + self.width);
        base.y = self.base.y.min(self.base.y + self.height);
        Self {
            base,
            width: self.width.abs(),
            height: self.height.abs(),
        }
    }
}

impl ShapeTrait for Rectangle {
    fn base(&self) -> &ShapeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.base.x,
            self.base.y,
            self.base.x + self.width,
            self.base.y + self.height,
        )
    }

    fn hit_test(&self, point: Point) -> bool {
        // Inclusive on every edge.
        point.x >= self.base.x
            && point.x <= self.base.x + self.width
            && point.y >= self.base.y
            && point.y <= self.base.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rectangle {
        Rectangle::new(ShapeBase::new(Uuid::new_v4(), Point::new(x, y)), w, h)
    }

    #[test]
    fn test_normalized_reflects_anchor() {
        let r = rect(50.0, 50.0, -40.0, -40.0).normalized();
        assert!((r.base.x - 10.0).abs() < f64::EPSILON);
        assert!((r.base.y - 10.0).abs() < f64::EPSILON);
        assert!((r.width - 40.0).abs() < f64::EPSILON);
        assert!((r.height - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalized_keeps_id() {
        let r = rect(0.0, 0.0, -5.0, 5.0);
        assert_eq!(r.normalized().base.id, r.base.id);
    }

    #[test]
    fn test_hit_test_inclusive_edges() {
        let r = rect(10.0, 10.0, 20.0, 20.0);
        assert!(r.hit_test(Point::new(15.0, 15.0)));
        assert!(r.hit_test(Point::new(10.0, 10.0)));
        assert!(r.hit_test(Point::new(30.0, 30.0)));
        assert!(!r.hit_test(Point::new(30.5, 15.0)));
    }

    #[test]
    fn test_bounds() {
        let bounds = rect(10.0, 20.0, 100.0, 50.0).bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 110.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 70.0).abs() < f64::EPSILON);
    }
}
