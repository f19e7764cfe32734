//! The routed shape of one edge, in screen pixels.

use limpet_core::EdgeId;
use limpet_geom::{
    IntRect, IntVector, Parametric, Rect, Segment2, Spline, Vector2, bounds_of, round_out,
};
use serde::Serialize;

/// How the exit direction of a partnered curve was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Blend {
    /// Weighted mix of the far-endpoint axis and the connector-to-midpoint direction.
    Blended,
    /// Both far endpoints coincide; perpendicular fallback.
    Coincident,
    /// The connector sits farther from the midpoint than the endpoints are apart.
    OffToSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteKind {
    External,
    Pin,
    SelfPin,
    Unconnected,
    Dragging,
    Straight,
    Curved(Blend),
    /// Nothing to draw: missing geometry or a failed clip.
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum PathSegment {
    Line(Segment2),
    Curve(Spline),
}

impl PathSegment {
    pub fn start(&self) -> Vector2 {
        match self {
            PathSegment::Line(s) => s.a,
            PathSegment::Curve(c) => c.p0,
        }
    }

    pub fn end(&self) -> Vector2 {
        match self {
            PathSegment::Line(s) => s.b,
            PathSegment::Curve(c) => c.p3,
        }
    }

    pub fn tangent_at(&self, t: f64) -> Vector2 {
        match self {
            PathSegment::Line(s) => s.tangent_at(t),
            PathSegment::Curve(c) => c.tangent_at(t),
        }
    }

    fn hull(&self) -> Vec<Vector2> {
        match self {
            PathSegment::Line(s) => vec![s.a, s.b],
            PathSegment::Curve(c) => c.control_points().to_vec(),
        }
    }

    fn translate(&mut self, d: Vector2) {
        match self {
            PathSegment::Line(s) => *s = Segment2::new(s.a + d, s.b + d),
            PathSegment::Curve(c) => *c = c.translate(d),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum HeadShape {
    None,
    /// Open arrow: two barbs meeting at `tip`.
    Arrow {
        tip: Vector2,
        left: Vector2,
        right: Vector2,
    },
    Circle {
        center: Vector2,
        radius: f64,
        filled: bool,
    },
}

impl HeadShape {
    fn points(&self) -> Vec<Vector2> {
        match *self {
            HeadShape::None => Vec::new(),
            HeadShape::Arrow { tip, left, right } => vec![tip, left, right],
            HeadShape::Circle { center, radius, .. } => vec![
                center - Vector2::new(radius, radius),
                center + Vector2::new(radius, radius),
            ],
        }
    }

    fn translate(&mut self, d: Vector2) {
        match self {
            HeadShape::None => {}
            HeadShape::Arrow { tip, left, right } => {
                *tip += d;
                *left += d;
                *right += d;
            }
            HeadShape::Circle { center, .. } => *center += d,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeLabel {
    pub text: String,
    /// Text box, top-left plus size.
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeShape {
    pub edge: EdgeId,
    pub kind: RouteKind,
    pub segments: Vec<PathSegment>,
    /// Visible start, on the border of the from-node.
    pub root: Option<Vector2>,
    /// Visible end, where the head is drawn.
    pub tip: Option<Vector2>,
    pub head: HeadShape,
    pub labels: Vec<EdgeLabel>,
    pub bounds: IntRect,
}

impl EdgeShape {
    pub fn empty(edge: EdgeId) -> Self {
        Self {
            edge,
            kind: RouteKind::Empty,
            segments: Vec::new(),
            root: None,
            tip: None,
            head: HeadShape::None,
            labels: Vec::new(),
            bounds: IntRect::zero(),
        }
    }

    /// Painters draw nothing for an empty shape.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() || self.bounds.is_empty()
    }

    /// Recomputes `bounds` from the path hull, head and labels, inflated by `stroke`.
    pub fn update_bounds(&mut self, stroke: f64) {
        let mut points = self
            .segments
            .iter()
            .flat_map(PathSegment::hull)
            .collect::<Vec<_>>();
        points.extend(self.head.points());
        for label in &self.labels {
            let r = label.rect;
            points.push(Vector2::new(r.min_x(), r.min_y()));
            points.push(Vector2::new(r.max_x(), r.max_y()));
        }
        self.bounds = match bounds_of(points) {
            Some(r) if r.origin.x.is_finite() && r.origin.y.is_finite() => {
                let half = stroke / 2.0;
                round_out(&r.inflate(half.max(0.5), half.max(0.5)))
            }
            _ => IntRect::zero(),
        };
    }

    /// Raw translation used while shifting the canvas.
    pub fn translate(&mut self, delta: IntVector) {
        if self.kind == RouteKind::Empty {
            return;
        }
        let d = Vector2::new(delta.x as f64, delta.y as f64);
        for segment in &mut self.segments {
            segment.translate(d);
        }
        self.root = self.root.map(|p| p + d);
        self.tip = self.tip.map(|p| p + d);
        self.head.translate(d);
        for label in &mut self.labels {
            label.rect = label.rect.translate(euclid::vec2(d.x, d.y));
        }
        self.bounds = self.bounds.translate(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_moves_bounds_by_whole_pixels() {
        let mut shape = EdgeShape::empty(EdgeId(0));
        shape.kind = RouteKind::Straight;
        shape.segments.push(PathSegment::Line(Segment2::new(
            Vector2::new(10.2, 5.0),
            Vector2::new(40.0, 5.0),
        )));
        shape.update_bounds(1.0);
        let before = shape.bounds;
        assert_eq!(before.origin.x, 9);
        shape.translate(euclid::vec2(-9, 3));
        assert_eq!(shape.bounds.origin.x, 0);
        assert_eq!(shape.bounds.origin.y, before.origin.y + 3);
        assert_eq!(shape.bounds.size, before.size);
    }

    #[test]
    fn empty_shapes_report_empty() {
        let mut shape = EdgeShape::empty(EdgeId(3));
        shape.update_bounds(1.0);
        assert!(shape.is_empty());
        assert_eq!(shape.bounds, IntRect::zero());
    }
}
