//! Standalone SVG for inspecting a routed scene.

use crate::shape::{EdgeShape, HeadShape, PathSegment};
use limpet_core::{NodeBox, NodeKind, PinSide, RenderConfig, Scene, TextMeasurer};
use limpet_geom::{IntRect, Vector2};
use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    pub padding: f64,
    pub include_pins: bool,
    pub include_labels: bool,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            padding: 8.0,
            include_pins: true,
            include_labels: true,
        }
    }
}

/// Union of node bounds and non-empty edge bounds.
pub fn scene_extent<'a>(scene: &Scene, shapes: impl IntoIterator<Item = &'a EdgeShape>) -> IntRect {
    let mut extent: Option<IntRect> = None;
    let boxes = scene
        .nodes()
        .map(NodeBox::bounds)
        .chain(shapes.into_iter().filter(|s| !s.is_empty()).map(|s| s.bounds));
    for b in boxes {
        extent = Some(match extent {
            Some(e) => e.union(&b),
            None => b,
        });
    }
    extent.unwrap_or_else(IntRect::zero)
}

pub fn render_svg<'a>(
    scene: &Scene,
    shapes: impl IntoIterator<Item = &'a EdgeShape> + Clone,
    cfg: &RenderConfig,
    measurer: &dyn TextMeasurer,
    options: &SvgRenderOptions,
) -> String {
    let extent = scene_extent(scene, shapes.clone());
    let pad = options.padding.max(0.0);
    let font_px = cfg.em_px();

    let mut out = String::new();
    let _ = writeln!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
        fmt(extent.min_x() as f64 - pad),
        fmt(extent.min_y() as f64 - pad),
        fmt((extent.width() as f64 + pad * 2.0).max(1.0)),
        fmt((extent.height() as f64 + pad * 2.0).max(1.0)),
    );
    let _ = writeln!(
        &mut out,
        r#"<style>
.node {{ fill: #f9fafb; stroke: #374151; stroke-width: 1; }}
.node.connection {{ fill: #eef2ff; }}
.node-title {{ fill: #111827; font-family: ui-sans-serif, system-ui, sans-serif; font-size: {font}px; text-anchor: middle; dominant-baseline: hanging; }}
.pin {{ fill: none; stroke: #6b7280; stroke-width: 1; }}
.pin.bound {{ fill: #6b7280; }}
.edge {{ fill: none; stroke: #111827; stroke-width: {stroke}; }}
.head {{ fill: none; stroke: #111827; stroke-width: {stroke}; }}
.head.filled {{ fill: #111827; }}
.edge-label {{ fill: #1f2937; font-family: ui-sans-serif, system-ui, sans-serif; font-size: {font}px; dominant-baseline: hanging; }}
</style>"#,
        font = fmt(font_px),
        stroke = fmt(cfg.px(cfg.stroke_thickness)),
    );

    out.push_str(r#"<g class="nodes">"#);
    for node in scene.nodes() {
        render_node(&mut out, node, cfg, measurer, options);
    }
    out.push_str("</g>\n");

    out.push_str(r#"<g class="edges">"#);
    for shape in shapes {
        if shape.is_empty() {
            continue;
        }
        render_edge(&mut out, shape, options);
    }
    out.push_str("</g>\n");

    out.push_str("</svg>\n");
    out
}

fn render_node(
    out: &mut String,
    node: &NodeBox,
    cfg: &RenderConfig,
    measurer: &dyn TextMeasurer,
    options: &SvgRenderOptions,
) {
    let r = node.bounds().to_f64();
    if r.is_empty() {
        return;
    }
    let class = match node.kind {
        NodeKind::Connection => "node connection",
        NodeKind::Part | NodeKind::IoBlock => "node",
    };
    let _ = write!(
        out,
        r#"<rect class="{class}" data-name="{}" x="{}" y="{}" width="{}" height="{}" />"#,
        escape_xml(&node.name),
        fmt(r.min_x()),
        fmt(r.min_y()),
        fmt(r.width()),
        fmt(r.height()),
    );
    if node.is_minimized() {
        return;
    }

    let title_y = r.min_y() + cfg.ems(cfg.node_padding);
    let _ = write!(
        out,
        r#"<text class="node-title" x="{}" y="{}">{}</text>"#,
        fmt(r.center().x),
        fmt(title_y),
        escape_xml(&node.name)
    );

    if !options.include_pins {
        return;
    }
    let side = cfg.ems(cfg.pin_slot_height) * 0.5;
    for pin_side in [PinSide::In, PinSide::Out] {
        for pin in node.pins.side(pin_side) {
            let key = limpet_core::PinKey {
                side: pin_side,
                name: pin.name.clone(),
            };
            let Some(anchor) = node.pin_anchor(&key, cfg) else {
                continue;
            };
            let inner = anchor.point - anchor.normal * side;
            let x = inner.x.min(anchor.point.x);
            let class = if pin.bound { "pin bound" } else { "pin" };
            let _ = write!(
                out,
                r#"<rect class="{class}" x="{}" y="{}" width="{}" height="{}" />"#,
                fmt(x),
                fmt(anchor.point.y - side / 2.0),
                fmt(side),
                fmt(side),
            );
            if options.include_labels {
                let w = measurer.measure(&pin.name, cfg).width;
                let label_x = if anchor.normal.x < 0.0 {
                    inner.x + side / 2.0
                } else {
                    inner.x - side / 2.0 - w
                };
                let _ = write!(
                    out,
                    r#"<text class="edge-label" x="{}" y="{}">{}</text>"#,
                    fmt(label_x),
                    fmt(anchor.point.y - side),
                    escape_xml(&pin.name)
                );
            }
        }
    }
}

fn render_edge(out: &mut String, shape: &EdgeShape, options: &SvgRenderOptions) {
    let _ = write!(
        out,
        r#"<path class="edge" data-edge="{}" d=""#,
        shape.edge
    );
    let mut pen: Option<Vector2> = None;
    for segment in &shape.segments {
        let start = segment.start();
        if pen != Some(start) {
            let _ = write!(out, "M{},{}", fmt_path(start.x), fmt_path(start.y));
        }
        match segment {
            PathSegment::Line(s) => {
                let _ = write!(out, "L{},{}", fmt_path(s.b.x), fmt_path(s.b.y));
            }
            PathSegment::Curve(c) => {
                let _ = write!(
                    out,
                    "C{},{} {},{} {},{}",
                    fmt_path(c.p1.x),
                    fmt_path(c.p1.y),
                    fmt_path(c.p2.x),
                    fmt_path(c.p2.y),
                    fmt_path(c.p3.x),
                    fmt_path(c.p3.y)
                );
            }
        }
        pen = Some(segment.end());
    }
    out.push_str(r#"" />"#);

    match shape.head {
        HeadShape::None => {}
        HeadShape::Arrow { tip, left, right } => {
            let _ = write!(
                out,
                r#"<polyline class="head" points="{},{} {},{} {},{}" />"#,
                fmt(left.x),
                fmt(left.y),
                fmt(tip.x),
                fmt(tip.y),
                fmt(right.x),
                fmt(right.y)
            );
        }
        HeadShape::Circle {
            center,
            radius,
            filled,
        } => {
            let class = if filled { "head filled" } else { "head" };
            let _ = write!(
                out,
                r#"<circle class="{class}" cx="{}" cy="{}" r="{}" />"#,
                fmt(center.x),
                fmt(center.y),
                fmt(radius)
            );
        }
    }

    if options.include_labels {
        for label in &shape.labels {
            let _ = write!(
                out,
                r#"<text class="edge-label" x="{}" y="{}">{}</text>"#,
                fmt(label.rect.min_x()),
                fmt(label.rect.min_y()),
                escape_xml(&label.text)
            );
        }
    }
}

fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    let s = v.to_string();
    if s == "-0" { "0".to_string() } else { s }
}

/// Three fractional digits, trailing zeros dropped.
fn fmt_path(v: f64) -> String {
    if !v.is_finite() || v.abs() < 0.0005 {
        return "0".to_string();
    }
    let mut s = format!("{v:.3}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" { "0".to_string() } else { s }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_formatting() {
        assert_eq!(fmt(-0.0), "0");
        assert_eq!(fmt(12.0000000001), "12");
        assert_eq!(fmt(1.5), "1.5");
        assert_eq!(fmt_path(1.23456), "1.235");
        assert_eq!(fmt_path(2.0), "2");
        assert_eq!(fmt_path(-0.0001), "0");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml(r#"a<b & "c""#), "a&lt;b &amp; &quot;c&quot;");
    }
}
