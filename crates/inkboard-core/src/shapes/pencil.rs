//! Pencil (freehand) shape.

use super::{ShapeBase, ShapeTrait};
use crate::geometry::{PENCIL_HIT_TOLERANCE, distance_to_segment};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A freehand stroke. The anchor always equals the first point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pencil {
    #[serde(flatten)]
    pub base: ShapeBase,
    pub points: Vec<Point>,
}

impl Pencil {
    /// Create a stroke from its points. An empty list is replaced by the anchor.
    pub fn new(mut base: ShapeBase, points: Vec<Point>) -> Self {
        let points = if points.is_empty() {
            vec![base.anchor()]
        } else {
            points
        };
        base.x = points[0].x;
        base.y = points[0].y;
        Self { base, points }
    }

    /// Replace the points, moving the anchor to the new first point.
    pub fn set_points(&mut self, points: Vec<Point>) {
        if let Some(first) = points.first() {
            self.base.x = first.x;
            self.base.y = first.y;
            self.points = points;
        }
    }

    /// Copy with one more point appended.
    pub fn with_point(&self, point: Point) -> Self {
        let mut points = self.points.clone();
        points.push(point);
        Self {
            base: self.base.clone(),
            points,
        }
    }

    /// Polyline through all points.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut iter = self.points.iter();
        if let Some(first) = iter.next() {
            path.move_to(*first);
            for p in iter {
                path.line_to(*p);
            }
        }
        path
    }
}

impl ShapeTrait for Pencil {
    fn base(&self) -> &ShapeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }

    /// Degenerate box at the anchor.
    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.base.anchor(), (0.0, 0.0))
    }

    fn hit_test(&self, point: Point) -> bool {
        self.points
            .windows(2)
            .any(|seg| distance_to_segment(point, seg[0], seg[1]) < PENCIL_HIT_TOLERANCE)
    }

    fn translate(&mut self, delta: Vec2) {
        self.base.x += delta.x;
        self.base.y += delta.y;
        for p in &mut self.points {
            *p += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn stroke(points: Vec<Point>) -> Pencil {
        Pencil::new(ShapeBase::new(Uuid::new_v4(), Point::ZERO), points)
    }

    #[test]
    fn test_anchor_follows_first_point() {
        let p = stroke(vec![Point::new(3.0, 4.0), Point::new(5.0, 6.0)]);
        assert_eq!(p.base.anchor(), Point::new(3.0, 4.0));
    }

    #[test]
    fn test_single_point_never_hits() {
        let p = stroke(vec![Point::new(3.0, 4.0)]);
        assert!(!p.hit_test(Point::new(3.0, 4.0)));
    }

    #[test]
    fn test_hit_near_segment() {
        let p = stroke(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ]);
        assert!(p.hit_test(Point::new(5.0, 3.9)));
        assert!(p.hit_test(Point::new(13.0, 5.0)));
        assert!(!p.hit_test(Point::new(5.0, 4.0)));
    }

    #[test]
    fn test_translate_moves_all_points() {
        let mut p = stroke(vec![Point::new(1.0, 1.0), Point::new(2.0, 3.0)]);
        p.translate(Vec2::new(10.0, -1.0));
        assert_eq!(p.points, vec![Point::new(11.0, 0.0), Point::new(12.0, 2.0)]);
        assert_eq!(p.base.anchor(), Point::new(11.0, 0.0));
    }
}
