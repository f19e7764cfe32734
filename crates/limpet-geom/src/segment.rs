use crate::Vector2;
use serde::{Deserialize, Serialize};

/// A parametric path that can be clipped against straight segments.
///
/// Parameters run over `[0, 1]`; `f64::INFINITY` means "no crossing".
pub trait Parametric {
    fn point_at(&self, t: f64) -> Vector2;

    /// First derivative at `t` (not normalized).
    fn tangent_at(&self, t: f64) -> Vector2;

    /// Smallest parameter on `self` where it crosses `segment`, or `f64::INFINITY`.
    fn intersection(&self, segment: &Segment2) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment2 {
    pub a: Vector2,
    pub b: Vector2,
}

impl Segment2 {
    pub const fn new(a: Vector2, b: Vector2) -> Self {
        Self { a, b }
    }

    pub fn direction(&self) -> Vector2 {
        self.b - self.a
    }

    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    pub fn reversed(&self) -> Self {
        Self {
            a: self.b,
            b: self.a,
        }
    }

    /// Goldman's cross-product test. Returns the parameter on `self` where it meets `other`,
    /// or `f64::INFINITY` when the segments are parallel or miss each other.
    pub fn intersection_with(&self, other: &Segment2) -> f64 {
        let r = self.direction();
        let s = other.direction();
        let denom = r.cross(s);
        if denom == 0.0 {
            return f64::INFINITY;
        }

        let qp = other.a - self.a;
        let u = qp.cross(r) / denom;
        if !(0.0..=1.0).contains(&u) {
            return f64::INFINITY;
        }
        let t = qp.cross(s) / denom;
        if !(0.0..=1.0).contains(&t) {
            return f64::INFINITY;
        }
        t
    }

    /// Parameter of the projection of `p` onto the infinite line through `self`, measured
    /// along the dominant axis to stay well conditioned for axis-aligned segments.
    pub fn parameter_of(&self, p: Vector2) -> f64 {
        let d = self.direction();
        if d.x.abs() >= d.y.abs() {
            if d.x == 0.0 {
                return f64::NAN;
            }
            (p.x - self.a.x) / d.x
        } else {
            (p.y - self.a.y) / d.y
        }
    }
}

impl Parametric for Segment2 {
    fn point_at(&self, t: f64) -> Vector2 {
        self.a + self.direction() * t
    }

    fn tangent_at(&self, _t: f64) -> Vector2 {
        self.direction()
    }

    fn intersection(&self, segment: &Segment2) -> f64 {
        self.intersection_with(segment)
    }
}
