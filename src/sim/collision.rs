//! Axis-aligned bounding boxes
//!
//! Every collision in the runner is a box overlap test: player against
//! tokens, player against obstacles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned box, `pos` is the top-left corner (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap test (touching edges do not intersect)
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        intersects(self, other)
    }
}

/// Standard AABB overlap
#[inline]
pub fn intersects(a: &Aabb, b: &Aabb) -> bool {
    a.pos.x < b.right() && a.right() > b.pos.x && a.pos.y < b.bottom() && a.bottom() > b.pos.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlapping_boxes() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::new(5.0, 5.0, 10.0, 10.0);
        assert!(intersects(&a, &b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let right = Aabb::new(10.0, 0.0, 10.0, 10.0);
        let below = Aabb::new(0.0, 10.0, 10.0, 10.0);
        assert!(!intersects(&a, &right));
        assert!(!intersects(&a, &below));
    }

    #[test]
    fn test_contained_box_intersects() {
        let outer = Aabb::new(0.0, 0.0, 100.0, 100.0);
        let inner = Aabb::new(40.0, 40.0, 5.0, 5.0);
        assert!(intersects(&outer, &inner));
        assert!(intersects(&inner, &outer));
    }

    #[test]
    fn test_center() {
        let a = Aabb::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(a.center(), Vec2::new(25.0, 40.0));
    }

    fn arb_box() -> impl Strategy<Value = Aabb> {
        (-500.0f32..500.0, -500.0f32..500.0, 0.5f32..200.0, 0.5f32..200.0)
            .prop_map(|(x, y, w, h)| Aabb::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_symmetric(a in arb_box(), b in arb_box()) {
            prop_assert_eq!(intersects(&a, &b), intersects(&b, &a));
        }

        #[test]
        fn prop_identical_boxes_intersect(a in arb_box()) {
            prop_assert!(intersects(&a, &a));
        }

        #[test]
        fn prop_separated_on_x_never_intersect(
            a in arb_box(),
            b in arb_box(),
            gap in 0.0f32..50.0
        ) {
            let shifted = Aabb { pos: Vec2::new(a.right() + gap, b.pos.y), size: b.size };
            prop_assert!(!intersects(&a, &shifted));
        }

        #[test]
        fn prop_separated_on_y_never_intersect(
            a in arb_box(),
            b in arb_box(),
            gap in 0.0f32..50.0
        ) {
            let shifted = Aabb { pos: Vec2::new(b.pos.x, a.bottom() + gap), size: b.size };
            prop_assert!(!intersects(&a, &shifted));
        }
    }
}
