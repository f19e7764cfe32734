use crate::{Parametric, Segment2, Vector2};

/// The four sides of `rect` as segments: top, right, bottom, left.
pub fn rectangle_sides(rect: &crate::Rect) -> [Segment2; 4] {
    let x0 = rect.min_x();
    let y0 = rect.min_y();
    let x1 = rect.max_x();
    let y1 = rect.max_y();
    let nw = Vector2::new(x0, y0);
    let ne = Vector2::new(x1, y0);
    let se = Vector2::new(x1, y1);
    let sw = Vector2::new(x0, y1);
    [
        Segment2::new(nw, ne),
        Segment2::new(ne, se),
        Segment2::new(se, sw),
        Segment2::new(sw, nw),
    ]
}

/// Smallest parameter at which `path` crosses the perimeter of `rect`, or `f64::INFINITY`.
pub fn rectangle_intersection_t<P: Parametric + ?Sized>(path: &P, rect: &crate::Rect) -> f64 {
    rectangle_sides(rect)
        .iter()
        .map(|side| path.intersection(side))
        .fold(f64::INFINITY, f64::min)
}

/// Nearest perimeter crossing of `path` with `rect`.
///
/// `None` when no side is crossed, e.g. both ends lie inside the rectangle.
pub fn rectangle_intersection<P: Parametric + ?Sized>(
    path: &P,
    rect: &crate::Rect,
) -> Option<Vector2> {
    let t = rectangle_intersection_t(path, rect);
    t.is_finite().then(|| path.point_at(t))
}

/// Rounds a floating rectangle outward to whole pixels.
pub fn round_out(rect: &crate::Rect) -> crate::IntRect {
    let x0 = rect.min_x().floor();
    let y0 = rect.min_y().floor();
    let x1 = rect.max_x().ceil();
    let y1 = rect.max_y().ceil();
    crate::int_rect(x0 as i32, y0 as i32, (x1 - x0) as i32, (y1 - y0) as i32)
}

pub fn to_float_rect(rect: &crate::IntRect) -> crate::Rect {
    rect.to_f64()
}

/// Bounding box of a non-empty set of points.
pub fn bounds_of(points: impl IntoIterator<Item = Vector2>) -> Option<crate::Rect> {
    let mut it = points.into_iter();
    let first = it.next()?;
    let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
    for p in it {
        x0 = x0.min(p.x);
        y0 = y0.min(p.y);
        x1 = x1.max(p.x);
        y1 = y1.max(p.y);
    }
    Some(crate::rect(x0, y0, x1 - x0, y1 - y0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Spline, rect};

    #[test]
    fn clip_from_center_lands_on_the_right_side() {
        let r = rect(0.0, 0.0, 100.0, 50.0);
        let s = Segment2::new(Vector2::new(50.0, 25.0), Vector2::new(350.0, 25.0));
        let p = rectangle_intersection(&s, &r).expect("crossing");
        assert_eq!(p, Vector2::new(100.0, 25.0));
    }

    #[test]
    fn both_ends_inside_yields_none() {
        let r = rect(0.0, 0.0, 100.0, 50.0);
        let s = Segment2::new(Vector2::new(10.0, 10.0), Vector2::new(90.0, 40.0));
        assert!(rectangle_intersection(&s, &r).is_none());
    }

    #[test]
    fn spline_clip_uses_the_curve_parameter() {
        let r = rect(-10.0, -10.0, 20.0, 20.0);
        let c = Spline::new(
            Vector2::new(0.0, 0.0),
            Vector2::new(0.0, 40.0),
            Vector2::new(40.0, 40.0),
            Vector2::new(40.0, 0.0),
        );
        let t = rectangle_intersection_t(&c, &r);
        assert!(t > 0.0 && t < 0.5);
        let p = c.point_at(t);
        assert!((p.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn round_out_covers_fractional_edges() {
        let r = round_out(&rect(-0.5, 1.2, 10.0, 3.0));
        assert_eq!((r.origin.x, r.origin.y), (-1, 1));
        assert_eq!((r.size.width, r.size.height), (11, 4));
    }
}
