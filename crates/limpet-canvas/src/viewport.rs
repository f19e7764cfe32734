use limpet_geom::{IntPoint, IntRect, IntSize, IntVector, int_vector};
use serde::Serialize;

/// The visible window onto the canvas, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub position: IntPoint,
    pub size: IntSize,
}

impl Viewport {
    pub fn new(size: IntSize) -> Self {
        Self {
            position: IntPoint::origin(),
            size,
        }
    }

    pub fn rect(&self) -> IntRect {
        IntRect::new(self.position, self.size)
    }

    /// Covers the `size.width` by `size.height` pixels starting at `position`; the far edges
    /// belong to the next pixel outside.
    pub fn contains(&self, p: IntPoint) -> bool {
        let r = self.rect();
        p.x >= r.min_x() && p.x < r.max_x() && p.y >= r.min_y() && p.y < r.max_y()
    }

    /// How far `p` lies outside the viewport on each axis, counted from the nearest pixel
    /// inside it (zero when inside, nonzero exactly when `contains` is false).
    pub fn overshoot(&self, p: IntPoint) -> IntVector {
        let r = self.rect();
        let axis = |v: i32, lo: i32, hi: i32| {
            if v < lo {
                v - lo
            } else if v >= hi {
                v - (hi - 1)
            } else {
                0
            }
        };
        int_vector(
            axis(p.x, r.min_x(), r.max_x()),
            axis(p.y, r.min_y(), r.max_y()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use limpet_geom::int_point;

    #[test]
    fn overshoot_is_signed_distance_past_each_edge() {
        let mut vp = Viewport::new(euclid::size2(100, 50));
        vp.position = int_point(10, 10);
        assert_eq!(vp.overshoot(int_point(50, 30)), int_vector(0, 0));
        assert_eq!(vp.overshoot(int_point(0, 30)), int_vector(-10, 0));
        assert_eq!(vp.overshoot(int_point(125, 70)), int_vector(16, 11));
        assert!(vp.contains(int_point(10, 10)));
        assert!(vp.contains(int_point(109, 59)));
        assert!(!vp.contains(int_point(110, 59)));
        assert!(!vp.contains(int_point(109, 60)));
    }

    #[test]
    fn points_on_the_far_edge_are_outside_and_overshoot() {
        let vp = Viewport::new(euclid::size2(200, 100));
        for p in [int_point(200, 50), int_point(50, 100), int_point(200, 100)] {
            assert!(!vp.contains(p), "{p:?}");
            assert_ne!(vp.overshoot(p), int_vector(0, 0), "{p:?}");
        }
        assert_eq!(vp.overshoot(int_point(200, 50)), int_vector(1, 0));
        assert_eq!(vp.overshoot(int_point(199, 99)), int_vector(0, 0));
        for x in -5..205 {
            let p = int_point(x, 50);
            assert_eq!(vp.contains(p), vp.overshoot(p) == int_vector(0, 0), "{p:?}");
        }
    }
}
