//! Edge routing state machine.
//!
//! Every recomputation classifies the edge into exactly one case (external reference, pin
//! link, pin self-loop, unconnected, straight, or curved through a connector), builds the
//! path from node centers or pin anchors, clips it at both node borders, and finishes with the
//! head, the root label and the bounds. Missing or degenerate geometry yields an empty shape.

use crate::arrowhead::arrowhead;
use crate::label::place_root_label;
use crate::shape::{Blend, EdgeLabel, EdgeShape, PathSegment, RouteKind};
use limpet_core::{
    EdgeId, EdgeSpec, EdgeTarget, NodeBox, NodeId, PinAnchor, PinKey, RenderConfig, Scene,
    TextMeasurer,
};
use limpet_geom::{
    Parametric, Rect, Segment2, Spline, Vector2, center_of, diagonal_angle, rect,
    rectangle_intersection_t,
};
use std::f64::consts::PI;

/// Read access to the geometry an edge depends on.
pub trait GeometryLookup {
    fn node(&self, id: NodeId) -> Option<&NodeBox>;
    fn edge(&self, id: EdgeId) -> Option<&EdgeSpec>;
    /// `(index, count)` among the unconnected siblings of `edge`.
    fn unconnected_slot(&self, edge: EdgeId, max: usize) -> Option<(usize, usize)>;
    /// External-reference edges leaving `node`, in binding order.
    fn external_edges(&self, node: NodeId) -> Vec<EdgeId>;
}

impl GeometryLookup for Scene {
    fn node(&self, id: NodeId) -> Option<&NodeBox> {
        Scene::node(self, id)
    }

    fn edge(&self, id: EdgeId) -> Option<&EdgeSpec> {
        Scene::edge(self, id)
    }

    fn unconnected_slot(&self, edge: EdgeId, max: usize) -> Option<(usize, usize)> {
        Scene::unconnected_slot(self, edge, max)
    }

    fn external_edges(&self, node: NodeId) -> Vec<EdgeId> {
        Scene::external_edges(self, node)
    }
}

/// Routes one edge against the current geometry.
pub fn route_edge(
    edge: &EdgeSpec,
    geometry: &dyn GeometryLookup,
    cfg: &RenderConfig,
    measurer: &dyn TextMeasurer,
) -> EdgeShape {
    Router::new(cfg, measurer).route(edge, geometry)
}

struct Route {
    kind: RouteKind,
    segments: Vec<PathSegment>,
    labels: Vec<EdgeLabel>,
    root_label: bool,
}

impl Route {
    fn new(kind: RouteKind, segments: Vec<PathSegment>) -> Self {
        Self {
            kind,
            segments,
            labels: Vec::new(),
            root_label: true,
        }
    }
}

#[derive(Clone, Copy)]
pub struct Router<'a> {
    cfg: &'a RenderConfig,
    measurer: &'a dyn TextMeasurer,
}

impl<'a> Router<'a> {
    pub fn new(cfg: &'a RenderConfig, measurer: &'a dyn TextMeasurer) -> Self {
        Self { cfg, measurer }
    }

    pub fn route(&self, edge: &EdgeSpec, geometry: &dyn GeometryLookup) -> EdgeShape {
        let route = self.classify(edge, geometry);
        self.finish(edge, geometry, route)
    }

    /// Straight segment from the clipped root to a temporary anchor under the pointer.
    pub fn route_dragging(
        &self,
        edge: &EdgeSpec,
        geometry: &dyn GeometryLookup,
        tip: Vector2,
    ) -> EdgeShape {
        let route = geometry.node(edge.from).and_then(|from| {
            let root = match &edge.from_pin {
                Some(key) => from.pin_anchor(key, self.cfg)?.point,
                None => clip_toward(from, tip)?.point,
            };
            (root != tip).then(|| {
                Route::new(
                    RouteKind::Dragging,
                    vec![PathSegment::Line(Segment2::new(root, tip))],
                )
            })
        });
        self.finish(edge, geometry, route)
    }

    fn classify(&self, edge: &EdgeSpec, g: &dyn GeometryLookup) -> Option<Route> {
        let from = g.node(edge.from)?;
        if from.bounds().is_empty() {
            return None;
        }
        match &edge.target {
            EdgeTarget::External { name, .. } => self.external(edge, name, from, g),
            EdgeTarget::Unconnected => self.unconnected(edge, from, g),
            EdgeTarget::Node { node, .. } => {
                let to = g.node(*node)?;
                if edge.is_pin_link() {
                    if to.id == from.id {
                        self.self_pin(edge, from)
                    } else {
                        self.pin_link(edge, from, to)
                    }
                } else if edge.straight {
                    straight(from, to)
                } else {
                    match partner_target(edge, g) {
                        Some(far) => self.curved(edge, from, to, far),
                        None => straight(from, to),
                    }
                }
            }
        }
    }

    fn finish(&self, edge: &EdgeSpec, g: &dyn GeometryLookup, route: Option<Route>) -> EdgeShape {
        let Some(route) = route else {
            tracing::trace!(edge = %edge.id, "edge shape left empty");
            return EdgeShape::empty(edge.id);
        };
        let (Some(first), Some(last)) = (route.segments.first(), route.segments.last()) else {
            return EdgeShape::empty(edge.id);
        };
        let root = first.start();
        let tip = last.end();

        let mut shape = EdgeShape::empty(edge.id);
        shape.kind = route.kind;
        shape.head = arrowhead(edge.head, tip, end_heading(last), self.cfg);
        shape.labels = route.labels;
        if route.root_label {
            if let Some(from) = g.node(edge.from) {
                let node_rect = from.bounds().to_f64();
                shape.labels.extend(place_root_label(
                    &edge.label_text(),
                    root,
                    start_heading(first),
                    &node_rect,
                    self.cfg,
                    self.measurer,
                ));
            }
        }
        shape.root = Some(root);
        shape.tip = Some(tip);
        shape.segments = route.segments;
        shape.update_bounds(self.cfg.px(self.cfg.stroke_thickness));
        tracing::trace!(edge = %edge.id, kind = ?shape.kind, bounds = ?shape.bounds, "routed edge");
        shape
    }

    /// Curve from the connector `from` to `to`, bent so that it runs smoothly through the
    /// connector together with the partner edge ending at `far`.
    fn curved(&self, edge: &EdgeSpec, from: &NodeBox, to: &NodeBox, far: &NodeBox) -> Option<Route> {
        let c = center_of(&from.bounds());
        let a = center_of(&to.bounds());
        let b = center_of(&far.bounds());
        let ac = a - c;
        if ac.length() == 0.0 {
            return None;
        }

        let ba = a - b;
        let ba_len = ba.length();
        let mid = a.midpoint(b);
        let c2c = mid - c;
        let c2c_len = c2c.length();

        // First-added edge bends right, its partner left.
        let first = edge.partner.is_none_or(|p| edge.id < p);
        let default_side = if first { 1.0 } else { -1.0 };

        let (blend, direction) = if ba_len == 0.0 {
            (Blend::Coincident, ac.normalize().perpendicular() * default_side)
        } else if c2c_len > ba_len {
            let c2c_n = c2c / c2c_len;
            let cross = c2c.cross(ba);
            let side = if cross > 0.0 {
                1.0
            } else if cross < 0.0 {
                -1.0
            } else {
                default_side
            };
            let d = c2c_n + c2c_n.perpendicular() * (side * self.cfg.offside_bias);
            (Blend::OffToSide, d.normalize())
        } else {
            let ba_n = ba / ba_len;
            if c2c_len == 0.0 {
                (Blend::Blended, ba_n)
            } else {
                let ratio = c2c_len / ba_len;
                let d = ba_n * (1.0 - ratio) + (c2c / c2c_len) * ratio;
                (Blend::Blended, d.normalize())
            }
        };
        if !direction.is_finite() {
            return None;
        }

        let p1 = c + direction * (ac.length() * self.cfg.curve_reach);
        let p2 = a + (p1 - a) * self.cfg.curve_tip_pull;
        let spline = Spline::new(c, p1, p2, a);
        let clipped = clip_spline(&spline, &from.bounds().to_f64(), &to.bounds().to_f64())?;
        Some(Route::new(
            RouteKind::Curved(blend),
            vec![PathSegment::Curve(clipped)],
        ))
    }

    /// Ray out of the node, one of up to `unconnected_max` evenly spread directions.
    fn unconnected(&self, edge: &EdgeSpec, from: &NodeBox, g: &dyn GeometryLookup) -> Option<Route> {
        let (index, count) = g.unconnected_slot(edge.id, self.cfg.unconnected_max)?;
        let angle = PI + index as f64 * 2.0 * PI / count as f64;
        let dir = Vector2::from_angle(angle);

        let r = from.bounds().to_f64();
        let (w, h) = (r.width(), r.height());
        let c = center_of(&from.bounds());
        let label = self.measurer.measure(&edge.label_text(), self.cfg);
        let arrow = self.cfg.arrowhead_px();

        let (border, clearance) = if dir.abs_angle() > diagonal_angle(w, h) {
            (h / 2.0 / dir.y.abs(), label.height)
        } else {
            (w / 2.0 / dir.x.abs(), label.width)
        };
        let root = c + dir * border;
        let tip = c + dir * (border + clearance + arrow);
        Some(Route::new(
            RouteKind::Unconnected,
            vec![PathSegment::Line(Segment2::new(root, tip))],
        ))
    }

    /// Curve from the node center up to a floating name label; labels of all external
    /// references on the node are laid out left to right as a group centered over it.
    fn external(
        &self,
        edge: &EdgeSpec,
        name: &str,
        from: &NodeBox,
        g: &dyn GeometryLookup,
    ) -> Option<Route> {
        let ids = g.external_edges(from.id);
        let index = ids.iter().position(|id| *id == edge.id)?;
        let sizes = ids
            .iter()
            .map(|id| {
                let text = g.edge(*id).map(external_name).unwrap_or_default();
                let m = self.measurer.measure(&text, self.cfg);
                (m.width, m.height)
            })
            .collect::<Vec<_>>();

        let r = from.bounds().to_f64();
        let c = center_of(&from.bounds());
        let gap = self.cfg.ems(self.cfg.external_gap);
        let total = sizes.iter().map(|s| s.0).sum::<f64>() + gap * (sizes.len() - 1) as f64;
        let x = c.x - total / 2.0 + sizes[..index].iter().map(|s| s.0 + gap).sum::<f64>();
        let (w, h) = sizes[index];
        let bottom = r.min_y() - self.cfg.ems(self.cfg.external_rise);

        let lx = x + w / 2.0;
        let ly = bottom;
        let spline = Spline::new(
            c,
            Vector2::new(lx, c.y),
            Vector2::new(lx, ly + (c.y - ly) / 2.0),
            Vector2::new(lx, ly),
        );
        let t0 = rectangle_intersection_t(&spline, &r);
        if !t0.is_finite() {
            return None;
        }
        let mut route = Route::new(
            RouteKind::External,
            vec![PathSegment::Curve(spline.subdivide(t0, 1.0))],
        );
        route.root_label = false;
        route.labels.push(EdgeLabel {
            text: name.to_string(),
            rect: rect(x, bottom - h, w, h),
        });
        Some(route)
    }

    /// Single cubic between two pin anchors, leaving each along its exit normal.
    fn pin_link(&self, edge: &EdgeSpec, from: &NodeBox, to: &NodeBox) -> Option<Route> {
        let start = self.anchor(from, edge.from_pin.as_ref())?;
        let end = self.anchor(to, edge.target.pin())?;
        let (start, end) = match (start, end) {
            (Some(s), Some(e)) => (s, e),
            (Some(s), None) => (s, clip_toward(to, s.point)?),
            (None, Some(e)) => (clip_toward(from, e.point)?, e),
            (None, None) => return None,
        };

        let dist = start.point.distance(end.point);
        let reach = (dist * self.cfg.pin_reach).max(self.cfg.ems(self.cfg.pin_reach_min));
        let spline = Spline::new(
            start.point,
            start.point + start.normal * reach,
            end.point + end.normal * reach,
            end.point,
        );
        Some(Route::new(RouteKind::Pin, vec![PathSegment::Curve(spline)]))
    }

    /// Pin loop back onto the same node: two cubics meeting above it. Higher pin orders wrap
    /// higher and wider so stacked loops do not overlap.
    fn self_pin(&self, edge: &EdgeSpec, node: &NodeBox) -> Option<Route> {
        let r = node.bounds().to_f64();
        let c = center_of(&node.bounds());
        let start = self
            .anchor(node, edge.from_pin.as_ref())?
            .unwrap_or_else(|| side_anchor(&r, c.y, 1.0));
        let end = self
            .anchor(node, edge.target.pin())?
            .unwrap_or_else(|| side_anchor(&r, c.y, -1.0));

        let cfg = self.cfg;
        let order = start.order.max(end.order) as f64;
        let lift = cfg.ems(cfg.self_loop_lift + order * cfg.self_loop_step);
        let reach = cfg.ems(cfg.self_loop_reach + order * cfg.self_loop_reach_step);
        let m = Vector2::new(c.x, r.min_y() - lift);
        let heading = if end.point.x >= start.point.x {
            Vector2::new(1.0, 0.0)
        } else {
            Vector2::new(-1.0, 0.0)
        };

        let out = Spline::new(
            start.point,
            start.point + start.normal * reach,
            m - heading * reach,
            m,
        );
        let back = Spline::new(
            m,
            m + heading * reach,
            end.point + end.normal * reach,
            end.point,
        );
        Some(Route::new(
            RouteKind::SelfPin,
            vec![PathSegment::Curve(out), PathSegment::Curve(back)],
        ))
    }

    /// `Some(None)` when the edge names no pin on this end; `None` when the named pin is gone.
    fn anchor(&self, node: &NodeBox, key: Option<&PinKey>) -> Option<Option<PinAnchor>> {
        match key {
            None => Some(None),
            Some(key) => node.pin_anchor(key, self.cfg).map(Some),
        }
    }
}

fn partner_target<'g>(edge: &EdgeSpec, g: &'g dyn GeometryLookup) -> Option<&'g NodeBox> {
    let partner = g.edge(edge.partner?);
    debug_assert!(
        partner.is_some_and(|p| p.partner == Some(edge.id)),
        "partner of {} is not symmetric",
        edge.id
    );
    let far = partner?.target.node()?;
    g.node(far).filter(|n| !n.bounds().is_empty())
}

fn external_name(edge: &EdgeSpec) -> String {
    match &edge.target {
        EdgeTarget::External { name, .. } => name.clone(),
        _ => String::new(),
    }
}

/// Center-to-center segment clipped at both borders.
fn straight(from: &NodeBox, to: &NodeBox) -> Option<Route> {
    let line = Segment2::new(center_of(&from.bounds()), center_of(&to.bounds()));
    let t0 = rectangle_intersection_t(&line, &from.bounds().to_f64());
    let reversed = line.reversed();
    let t_rev = rectangle_intersection_t(&reversed, &to.bounds().to_f64());
    if !(t0.is_finite() && t_rev.is_finite() && t0 < 1.0 - t_rev) {
        return None;
    }
    Some(Route::new(
        RouteKind::Straight,
        vec![PathSegment::Line(Segment2::new(
            line.point_at(t0),
            reversed.point_at(t_rev),
        ))],
    ))
}

/// The visible span of `spline` between leaving `from` and entering `to`.
fn clip_spline(spline: &Spline, from: &Rect, to: &Rect) -> Option<Spline> {
    let t0 = rectangle_intersection_t(spline, from);
    let [p0, p1, p2, p3] = spline.control_points();
    let t_rev = rectangle_intersection_t(&Spline::new(p3, p2, p1, p0), to);
    let t1 = 1.0 - t_rev;
    (t0.is_finite() && t_rev.is_finite() && t0 < t1).then(|| spline.subdivide(t0, t1))
}

/// Border point of `node` on the way from its center to `toward`, facing `toward`.
fn clip_toward(node: &NodeBox, toward: Vector2) -> Option<PinAnchor> {
    let c = center_of(&node.bounds());
    let ray = Segment2::new(c, toward);
    let t = rectangle_intersection_t(&ray, &node.bounds().to_f64());
    if !t.is_finite() {
        return None;
    }
    Some(PinAnchor {
        point: ray.point_at(t),
        normal: (toward - c).normalize(),
        order: 0,
    })
}

fn side_anchor(r: &Rect, y: f64, normal_x: f64) -> PinAnchor {
    let x = if normal_x > 0.0 { r.max_x() } else { r.min_x() };
    PinAnchor {
        point: Vector2::new(x, y),
        normal: Vector2::new(normal_x, 0.0),
        order: 0,
    }
}

fn start_heading(segment: &PathSegment) -> Vector2 {
    match segment {
        PathSegment::Line(s) => s.direction(),
        PathSegment::Curve(c) => first_nonzero([c.p1 - c.p0, c.p2 - c.p0, c.p3 - c.p0]),
    }
}

fn end_heading(segment: &PathSegment) -> Vector2 {
    match segment {
        PathSegment::Line(s) => s.direction(),
        PathSegment::Curve(c) => first_nonzero([c.p3 - c.p2, c.p3 - c.p1, c.p3 - c.p0]),
    }
}

fn first_nonzero(candidates: [Vector2; 3]) -> Vector2 {
    candidates
        .into_iter()
        .find(|v| v.length_squared() > 1e-18)
        .unwrap_or(Vector2::ZERO)
}
