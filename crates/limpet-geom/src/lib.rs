#![forbid(unsafe_code)]

//! 2-D geometry for limpet edge routing: vectors, segments, cubic splines, and clipping of those
//! paths against axis-aligned node boxes.
//!
//! Floating-point shapes use [`Vector2`] and [`Rect`]; component bounds and the canvas offset
//! live on the integer pixel grid ([`IntRect`], [`IntVector`]) so that translating by a settled
//! delta lands exactly on the origin.

mod rect;
pub mod roots;
mod segment;
mod spline;
mod vector;

pub use rect::{
    bounds_of, rectangle_intersection, rectangle_intersection_t, rectangle_sides, round_out,
    to_float_rect,
};
pub use segment::{Parametric, Segment2};
pub use spline::{Coefficients, Spline};
pub use vector::Vector2;

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Rect = euclid::Rect<f64, Unit>;

pub type IntPoint = euclid::Point2D<i32, Unit>;
pub type IntVector = euclid::Vector2D<i32, Unit>;
pub type IntSize = euclid::Size2D<i32, Unit>;
pub type IntRect = euclid::Rect<i32, Unit>;

pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Rect {
    euclid::rect(x, y, width, height)
}

pub fn int_rect(x: i32, y: i32, width: i32, height: i32) -> IntRect {
    euclid::rect(x, y, width, height)
}

pub fn int_point(x: i32, y: i32) -> IntPoint {
    euclid::point2(x, y)
}

pub fn int_vector(x: i32, y: i32) -> IntVector {
    euclid::vec2(x, y)
}

/// Center of a pixel rectangle in floating coordinates.
pub fn center_of(rect: &IntRect) -> Vector2 {
    let r = rect.to_f64();
    Vector2::new(r.center().x, r.center().y)
}

/// Angle of the rectangle's diagonal, `atan(height / width)`.
pub fn diagonal_angle(width: f64, height: f64) -> f64 {
    if width == 0.0 && height == 0.0 {
        return 0.0;
    }
    (height / width).atan()
}
