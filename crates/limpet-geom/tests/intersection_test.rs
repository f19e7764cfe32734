use limpet_geom::{
    Parametric, Segment2, Spline, Vector2, rect, rectangle_intersection, rectangle_intersection_t,
};

const EPS: f64 = 1e-9;

fn v(x: f64, y: f64) -> Vector2 {
    Vector2::new(x, y)
}

fn on_perimeter(p: Vector2, r: &limpet_geom::Rect) -> bool {
    let within_x = p.x >= r.min_x() - EPS && p.x <= r.max_x() + EPS;
    let within_y = p.y >= r.min_y() - EPS && p.y <= r.max_y() + EPS;
    let on_vertical = (p.x - r.min_x()).abs() < EPS || (p.x - r.max_x()).abs() < EPS;
    let on_horizontal = (p.y - r.min_y()).abs() < EPS || (p.y - r.max_y()).abs() < EPS;
    within_x && within_y && (on_vertical || on_horizontal)
}

#[test]
fn segment_intersection_points_agree_from_both_sides() {
    let pairs = [
        (
            Segment2::new(v(-3.0, 1.0), v(7.0, 4.0)),
            Segment2::new(v(0.0, 6.0), v(2.0, -4.0)),
        ),
        (
            Segment2::new(v(10.0, 10.0), v(-10.0, -5.0)),
            Segment2::new(v(-8.0, 9.0), v(6.0, -9.0)),
        ),
        (
            Segment2::new(v(0.0, 0.0), v(0.0, 100.0)),
            Segment2::new(v(-50.0, 37.5), v(50.0, 37.5)),
        ),
    ];

    for (a, b) in pairs {
        let t = a.intersection(&b);
        let u = b.intersection(&a);
        assert!((0.0..=1.0).contains(&t), "t={t}");
        assert!((0.0..=1.0).contains(&u), "u={u}");
        assert!(a.point_at(t).distance(b.point_at(u)) < 1e-9);
    }
}

#[test]
fn clipping_a_segment_leaving_the_rectangle_lands_on_the_perimeter() {
    let r = rect(10.0, 20.0, 80.0, 40.0);
    let inside = v(37.0, 41.0);
    for step in 0..36 {
        let angle = step as f64 * std::f64::consts::TAU / 36.0;
        let outside = inside + Vector2::from_angle(angle) * 200.0;
        let s = Segment2::new(inside, outside);

        let t = rectangle_intersection_t(&s, &r);
        assert!((0.0..=1.0).contains(&t), "angle step {step}: t={t}");
        let p = rectangle_intersection(&s, &r).expect("segment leaves the rectangle");
        assert!(on_perimeter(p, &r), "angle step {step}: {p:?} not on perimeter");
        assert!(s.point_at(t).distance(p) < EPS);
    }
}

#[test]
fn segment_fully_inside_has_no_clip_point() {
    let r = rect(0.0, 0.0, 100.0, 100.0);
    let s = Segment2::new(v(1.0, 1.0), v(99.0, 99.0));
    assert!(rectangle_intersection(&s, &r).is_none());
    assert_eq!(rectangle_intersection_t(&s, &r), f64::INFINITY);
}

#[test]
fn collinear_spline_crosses_where_the_straight_line_does() {
    let line = Segment2::new(v(0.0, 0.0), v(90.0, 30.0));
    let even = Spline::new(line.a, v(30.0, 10.0), v(60.0, 20.0), line.b);
    let uneven = Spline::new(line.a, v(15.0, 5.0), v(75.0, 25.0), line.b);
    let cross = Segment2::new(v(40.0, 40.0), v(60.0, -20.0));

    let t_line = line.intersection(&cross);
    assert!(t_line.is_finite());
    let expected = line.point_at(t_line);

    for spline in [even, uneven] {
        let t = spline.intersection(&cross);
        assert!(t.is_finite(), "spline {spline:?} should cross");
        assert!(spline.point_at(t).distance(expected) < 1e-6);
    }
}

#[test]
fn spline_clipped_against_node_box_leaves_through_the_right_face() {
    let node = rect(0.0, 0.0, 100.0, 50.0);
    let c = v(50.0, 25.0);
    let a = v(350.0, 25.0);
    let s = Spline::new(c, v(150.0, 0.0), v(250.0, 50.0), a);
    let p = rectangle_intersection(&s, &node).expect("curve leaves node");
    assert!((p.x - 100.0).abs() < EPS);
    assert!(p.y >= 0.0 && p.y <= 50.0);
}
