use crate::shape::HeadShape;
use limpet_core::{HeadKind, RenderConfig};
use limpet_geom::Vector2;

/// Head geometry at `tip`, oriented along the path's forward `tangent`.
pub fn arrowhead(kind: HeadKind, tip: Vector2, tangent: Vector2, cfg: &RenderConfig) -> HeadShape {
    let dir = tangent.normalize();
    if !dir.is_finite() {
        return HeadShape::None;
    }
    let length = cfg.arrowhead_px();
    match kind {
        HeadKind::None => HeadShape::None,
        HeadKind::Arrow => {
            let back = -dir * length;
            HeadShape::Arrow {
                tip,
                left: tip + back.rotate(cfg.arrowhead_angle),
                right: tip + back.rotate(-cfg.arrowhead_angle),
            }
        }
        HeadKind::Circle | HeadKind::FilledCircle => HeadShape::Circle {
            center: tip - dir * (length / 2.0),
            radius: length / 2.0,
            filled: kind == HeadKind::FilledCircle,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barbs_are_symmetric_about_the_shaft() {
        let cfg = RenderConfig::default();
        let head = arrowhead(
            HeadKind::Arrow,
            Vector2::new(100.0, 0.0),
            Vector2::new(3.0, 0.0),
            &cfg,
        );
        let HeadShape::Arrow { tip, left, right } = head else {
            panic!("expected arrow, got {head:?}");
        };
        assert_eq!(tip, Vector2::new(100.0, 0.0));
        assert!((left.x - right.x).abs() < 1e-9);
        assert!((left.y + right.y).abs() < 1e-9);
        assert!((tip.distance(left) - cfg.arrowhead_px()).abs() < 1e-9);
        assert!(left.x < tip.x);
    }

    #[test]
    fn circle_sits_behind_the_tip() {
        let cfg = RenderConfig::default();
        let head = arrowhead(
            HeadKind::FilledCircle,
            Vector2::new(0.0, 50.0),
            Vector2::new(0.0, -1.0),
            &cfg,
        );
        assert_eq!(
            head,
            HeadShape::Circle {
                center: Vector2::new(0.0, 55.0),
                radius: 5.0,
                filled: true,
            }
        );
    }

    #[test]
    fn degenerate_tangent_draws_no_head() {
        let cfg = RenderConfig::default();
        let head = arrowhead(HeadKind::Arrow, Vector2::ZERO, Vector2::ZERO, &cfg);
        assert_eq!(head, HeadShape::None);
    }
}
