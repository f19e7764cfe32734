use crate::roots::cubic_roots;
use crate::{Parametric, Segment2, Vector2};
use serde::{Deserialize, Serialize};

/// Cubic Bézier curve with start `p0`, controls `p1`/`p2`, end `p3`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spline {
    pub p0: Vector2,
    pub p1: Vector2,
    pub p2: Vector2,
    pub p3: Vector2,
}

/// Power-basis form `a·t³ + b·t² + c·t + d`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub a: Vector2,
    pub b: Vector2,
    pub c: Vector2,
    pub d: Vector2,
}

impl Spline {
    pub const fn new(p0: Vector2, p1: Vector2, p2: Vector2, p3: Vector2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    pub fn coefficients(&self) -> Coefficients {
        let Self { p0, p1, p2, p3 } = *self;
        Coefficients {
            a: -p0 + p1 * 3.0 - p2 * 3.0 + p3,
            b: p0 * 3.0 - p1 * 6.0 + p2 * 3.0,
            c: (p1 - p0) * 3.0,
            d: p0,
        }
    }

    /// De Casteljau split; returns the piece of the curve between `t0` and `t1`.
    pub fn subdivide(&self, t0: f64, t1: f64) -> Spline {
        let t0 = t0.max(0.0);
        let tail = if t0 == 0.0 { *self } else { self.split_at(t0).1 };
        if t0 >= 1.0 || t1 >= 1.0 {
            return tail;
        }
        let local = (t1 - t0) / (1.0 - t0);
        tail.split_at(local).0
    }

    pub fn split_at(&self, t: f64) -> (Spline, Spline) {
        let Self { p0, p1, p2, p3 } = *self;
        let lerp = |a: Vector2, b: Vector2| a + (b - a) * t;
        let p01 = lerp(p0, p1);
        let p12 = lerp(p1, p2);
        let p23 = lerp(p2, p3);
        let p012 = lerp(p01, p12);
        let p123 = lerp(p12, p23);
        let mid = lerp(p012, p123);
        (
            Spline::new(p0, p01, p012, mid),
            Spline::new(mid, p123, p23, p3),
        )
    }

    pub fn control_points(&self) -> [Vector2; 4] {
        [self.p0, self.p1, self.p2, self.p3]
    }

    pub fn translate(&self, delta: Vector2) -> Spline {
        Spline::new(
            self.p0 + delta,
            self.p1 + delta,
            self.p2 + delta,
            self.p3 + delta,
        )
    }
}

impl Parametric for Spline {
    fn point_at(&self, t: f64) -> Vector2 {
        let k = self.coefficients();
        ((k.a * t + k.b) * t + k.c) * t + k.d
    }

    fn tangent_at(&self, t: f64) -> Vector2 {
        let k = self.coefficients();
        (k.a * (3.0 * t) + k.b * 2.0) * t + k.c
    }

    /// Substitutes the curve into the implicit line `A·x + B·y = C` through `segment`, solves
    /// the resulting cubic in `t`, and keeps roots whose point also lies within the segment.
    fn intersection(&self, segment: &Segment2) -> f64 {
        let la = segment.b.y - segment.a.y;
        let lb = segment.a.x - segment.b.x;
        let lc = la * segment.a.x + lb * segment.a.y;

        let k = self.coefficients();
        let roots = cubic_roots(
            la * k.a.x + lb * k.a.y,
            la * k.b.x + lb * k.b.y,
            la * k.c.x + lb * k.c.y,
            la * k.d.x + lb * k.d.y - lc,
        );

        let mut best = f64::INFINITY;
        for t in roots {
            if !(0.0..=1.0).contains(&t) || t >= best {
                continue;
            }
            let p = self.point_at(t);
            let s = segment.parameter_of(p);
            if (0.0..=1.0).contains(&s) {
                best = t;
            }
        }
        best
    }
}
