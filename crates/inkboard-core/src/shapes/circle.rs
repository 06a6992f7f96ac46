//! Circle shape.

use super::{ShapeBase, ShapeTrait};
use crate::geometry::SHAPE_HIT_TOLERANCE;
use kurbo::{Circle as KurboCircle, Point, Rect};
use serde::{Deserialize, Serialize};

/// A circle anchored at its center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    #[serde(flatten)]
    pub base: ShapeBase,
    pub radius: f64,
}

impl Circle {
    /// Create a new circle.
    pub fn new(base: ShapeBase, radius: f64) -> Self {
        Self { base, radius }
    }

    pub fn center(&self) -> Point {
        self.base.anchor()
    }

    /// Get as a kurbo Circle.
    pub fn as_kurbo(&self) -> KurboCircle {
        KurboCircle::new(self.center(), self.radius)
    }
}

impl ShapeTrait for Circle {
    fn base(&self) -> &ShapeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }

    fn bounds(&self) -> Rect {
        let r = self.radius;
        Rect::new(
            self.base.x - r,
            self.base.y - r,
            self.base.x + r,
            self.base.y + r,
        )
    }

    fn hit_test(&self, point: Point) -> bool {
        point.distance(self.center()) <= self.radius + SHAPE_HIT_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn circle(r: f64) -> Circle {
        Circle::new(ShapeBase::new(Uuid::new_v4(), Point::new(100.0, 100.0)), r)
    }

    #[test]
    fn test_hit_within_tolerance_ring() {
        let c = circle(10.0);
        assert!(c.hit_test(Point::new(100.0, 100.0)));
        assert!(c.hit_test(Point::new(116.0, 100.0)));
        assert!(!c.hit_test(Point::new(116.1, 100.0)));
    }

    #[test]
    fn test_bounds() {
        assert_eq!(circle(5.0).bounds(), Rect::new(95.0, 95.0, 105.0, 105.0));
    }
}
