use super::SceneConfig;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::time::Duration;

/// Explicit theme passed into every routing and layout call.
///
/// Lengths documented as "em" scale with `em * zoom`; lengths documented as "px" scale with
/// `zoom` only. The curve-shaping factors (`curve_*`, `pin_reach`, `self_loop_*`,
/// `offside_bias`) are visual tuning knobs, not geometric invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// Pixels per em at zoom 1.
    pub em: f64,
    pub zoom: f64,

    /// Half-angle between an open arrowhead's barbs and the shaft, radians.
    pub arrowhead_angle: f64,
    /// px
    pub arrowhead_length: f64,
    /// px
    pub name_top_pad: f64,
    /// px
    pub name_side_pad: f64,
    /// px
    pub stroke_thickness: f64,

    /// em per character column.
    pub char_width: f64,
    /// em per text line.
    pub line_height: f64,
    /// em
    pub node_padding: f64,
    /// em
    pub pin_slot_height: f64,
    /// em
    pub pin_width: f64,
    /// em, side of the square a minimized node collapses to.
    pub minimized_size: f64,
    /// em, default size of an open node without persisted width/height.
    pub open_width: f64,
    pub open_height: f64,
    /// em, gap between nodes placed without a stored position.
    pub placement_gap: f64,

    /// em, distance from a node's top edge to the bottom of its external-reference labels.
    pub external_rise: f64,
    /// em, horizontal gap between neighbouring external-reference labels.
    pub external_gap: f64,
    /// Unconnected edges are spread over at most this many directions.
    pub unconnected_max: usize,

    /// Fraction of the connector-to-target distance used as the first control arm.
    pub curve_reach: f64,
    /// Fraction of the way from the target back towards the first control point.
    pub curve_tip_pull: f64,
    /// Fraction of the anchor distance used as pin tangent arms.
    pub pin_reach: f64,
    /// em, lower bound of a pin tangent arm.
    pub pin_reach_min: f64,
    /// em, height of the self-loop apex above the node for pin order 0.
    pub self_loop_lift: f64,
    /// em, extra apex height per pin order.
    pub self_loop_step: f64,
    /// em, self-loop tangent arm for pin order 0.
    pub self_loop_reach: f64,
    /// em, extra tangent arm per pin order.
    pub self_loop_reach_step: f64,
    /// Weight of the sideways component when the connector sits off to the side.
    pub offside_bias: f64,

    pub autoscroll_interval_ms: u64,
    /// Fraction of the viewport extent one auto-scroll step may move.
    pub autoscroll_max_step: f64,
    /// Scaled icons are generated only when `|zoom - 1|` reaches this value.
    pub icon_regen_threshold: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            em: 13.0,
            zoom: 1.0,
            arrowhead_angle: PI / 5.0,
            arrowhead_length: 10.0,
            name_top_pad: 1.0,
            name_side_pad: 2.0,
            stroke_thickness: 1.0,
            char_width: 0.6,
            line_height: 1.2,
            node_padding: 0.5,
            pin_slot_height: 1.2,
            pin_width: 0.8,
            minimized_size: 2.0,
            open_width: 16.0,
            open_height: 10.0,
            placement_gap: 2.0,
            external_rise: 3.0,
            external_gap: 0.5,
            unconnected_max: 8,
            curve_reach: 0.5,
            curve_tip_pull: 1.0 / 3.0,
            pin_reach: 0.4,
            pin_reach_min: 2.0,
            self_loop_lift: 2.0,
            self_loop_step: 1.5,
            self_loop_reach: 2.0,
            self_loop_reach_step: 1.0,
            offside_bias: 0.5,
            autoscroll_interval_ms: 100,
            autoscroll_max_step: 0.5,
            icon_regen_threshold: 0.05,
        }
    }
}

impl RenderConfig {
    /// Reads every known key from `config`, falling back to defaults for anything missing or
    /// malformed.
    pub fn from_config(config: &SceneConfig) -> Self {
        let mut out = Self::default();
        let f = |key: &str, slot: &mut f64| {
            if let Some(v) = config.get_f64(key) {
                *slot = v;
            }
        };

        f("em", &mut out.em);
        f("zoom", &mut out.zoom);
        f("arrowhead.angle", &mut out.arrowhead_angle);
        f("arrowhead.length", &mut out.arrowhead_length);
        f("name.topPad", &mut out.name_top_pad);
        f("name.sidePad", &mut out.name_side_pad);
        f("strokeThickness", &mut out.stroke_thickness);
        f("text.charWidth", &mut out.char_width);
        f("text.lineHeight", &mut out.line_height);
        f("node.padding", &mut out.node_padding);
        f("node.minimizedSize", &mut out.minimized_size);
        f("node.openWidth", &mut out.open_width);
        f("node.openHeight", &mut out.open_height);
        f("node.placementGap", &mut out.placement_gap);
        f("pin.slotHeight", &mut out.pin_slot_height);
        f("pin.width", &mut out.pin_width);
        f("pin.reach", &mut out.pin_reach);
        f("pin.reachMin", &mut out.pin_reach_min);
        f("external.rise", &mut out.external_rise);
        f("external.gap", &mut out.external_gap);
        f("curve.reach", &mut out.curve_reach);
        f("curve.tipPull", &mut out.curve_tip_pull);
        f("curve.offsideBias", &mut out.offside_bias);
        f("selfLoop.lift", &mut out.self_loop_lift);
        f("selfLoop.step", &mut out.self_loop_step);
        f("selfLoop.reach", &mut out.self_loop_reach);
        f("selfLoop.reachStep", &mut out.self_loop_reach_step);
        f("autoscroll.maxStep", &mut out.autoscroll_max_step);
        f("iconRegenThreshold", &mut out.icon_regen_threshold);

        if let Some(v) = config.get_u64("unconnected.max") {
            out.unconnected_max = (v as usize).max(1);
        }
        if let Some(v) = config.get_u64("autoscroll.intervalMs") {
            out.autoscroll_interval_ms = v.max(1);
        }
        if !(out.zoom.is_finite() && out.zoom > 0.0) {
            out.zoom = 1.0;
        }
        if !(out.em.is_finite() && out.em > 0.0) {
            out.em = Self::default().em;
        }
        out
    }

    /// Pixels per em at the current zoom.
    pub fn em_px(&self) -> f64 {
        self.em * self.zoom
    }

    /// Converts an em length to screen pixels.
    pub fn ems(&self, value: f64) -> f64 {
        value * self.em_px()
    }

    /// Scales a px length by the zoom factor.
    pub fn px(&self, value: f64) -> f64 {
        value * self.zoom
    }

    pub fn arrowhead_px(&self) -> f64 {
        self.px(self.arrowhead_length)
    }

    pub fn autoscroll_interval(&self) -> Duration {
        Duration::from_millis(self.autoscroll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_keys_keep_defaults() {
        let cfg = RenderConfig::from_config(&SceneConfig::empty_object());
        assert_eq!(cfg, RenderConfig::default());
    }

    #[test]
    fn nested_keys_override_defaults() {
        let scene = SceneConfig::from_value(json!({
            "zoom": 2,
            "arrowhead": {"length": 14},
            "selfLoop": {"step": 3},
            "unconnected": {"max": 0}
        }));
        let cfg = RenderConfig::from_config(&scene);
        assert_eq!(cfg.zoom, 2.0);
        assert_eq!(cfg.arrowhead_px(), 28.0);
        assert_eq!(cfg.self_loop_step, 3.0);
        assert_eq!(cfg.unconnected_max, 1);
        assert_eq!(cfg.ems(1.0), 26.0);
    }

    #[test]
    fn non_positive_zoom_is_ignored() {
        let scene = SceneConfig::from_value(json!({"zoom": -1}));
        assert_eq!(RenderConfig::from_config(&scene).zoom, 1.0);
    }
}
