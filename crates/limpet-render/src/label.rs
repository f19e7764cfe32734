//! Alias/topic label placement at the root end of an edge.

use crate::shape::EdgeLabel;
use limpet_core::{RenderConfig, TextMeasurer};
use limpet_geom::{Rect, Vector2, diagonal_angle, rect};

/// Places `text` next to `root`, clear of the node the edge leaves.
///
/// `direction` is the path's heading at the root. Edges leaving through the top or bottom face
/// (heading steeper than the node's diagonal) get the label beside the line; edges leaving
/// through a side face get it above the line, on the outward side.
pub fn place_root_label(
    text: &str,
    root: Vector2,
    direction: Vector2,
    node: &Rect,
    cfg: &RenderConfig,
    measurer: &dyn TextMeasurer,
) -> Option<EdgeLabel> {
    if text.is_empty() {
        return None;
    }
    let metrics = measurer.measure(text, cfg);
    let (w, h) = (metrics.width, metrics.height);
    let top_pad = cfg.px(cfg.name_top_pad);
    let side_pad = cfg.px(cfg.name_side_pad);

    let steep = direction.abs_angle() > diagonal_angle(node.width(), node.height());
    let (x, y) = if steep {
        let y = if direction.y < 0.0 {
            root.y - top_pad - h
        } else {
            root.y + top_pad
        };
        (root.x + side_pad, y)
    } else {
        let x = if direction.x >= 0.0 {
            root.x + side_pad
        } else {
            root.x - side_pad - w
        };
        (x, root.y - top_pad - h)
    };
    Some(EdgeLabel {
        text: text.to_string(),
        rect: rect(x, y, w, h),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use limpet_core::DeterministicTextMeasurer;

    #[test]
    fn horizontal_exit_puts_the_label_above_on_the_outward_side() {
        let cfg = RenderConfig::default();
        let node = rect(0.0, 0.0, 100.0, 50.0);
        let left = place_root_label(
            "v",
            Vector2::new(0.0, 25.0),
            Vector2::new(-1.0, 0.0),
            &node,
            &cfg,
            &DeterministicTextMeasurer,
        )
        .expect("label");
        assert!(left.rect.max_x() <= 0.0);
        assert!(left.rect.max_y() <= 25.0);

        let up = place_root_label(
            "v",
            Vector2::new(50.0, 0.0),
            Vector2::new(0.1, -1.0),
            &node,
            &cfg,
            &DeterministicTextMeasurer,
        )
        .expect("label");
        assert!(up.rect.max_y() <= 0.0);
        assert!(up.rect.min_x() >= 50.0);
    }

    #[test]
    fn empty_text_has_no_label() {
        let cfg = RenderConfig::default();
        let node = rect(0.0, 0.0, 10.0, 10.0);
        assert!(
            place_root_label(
                "",
                Vector2::ZERO,
                Vector2::new(1.0, 0.0),
                &node,
                &cfg,
                &DeterministicTextMeasurer
            )
            .is_none()
        );
    }
}
