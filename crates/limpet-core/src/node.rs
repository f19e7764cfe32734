//! Node boxes: preferred geometry from metadata, pin slots, minimization.

use crate::metadata::NodeMetadata;
use crate::pin::{PinKey, PinSet, PinSide};
use crate::text::TextMeasurer;
use crate::{NodeId, RenderConfig};
use limpet_geom::{IntPoint, IntRect, IntSize, IntVector, Vector2, int_point, int_vector};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// Ordinary part.
    #[default]
    Part,
    /// Connection-bearing part; the "from" end of binding edges.
    Connection,
    /// The enclosing part's exported pins. Its pin columns are mirrored: inputs feed the
    /// graph from the right edge, outputs collect on the left edge.
    IoBlock,
}

/// Where an edge attaches to a pin, and which way it leaves the node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinAnchor {
    pub point: Vector2,
    pub normal: Vector2,
    pub order: usize,
}

#[derive(Debug, Clone)]
pub struct NodeBox {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub pins: PinSet,
    bounds: IntRect,
    open: bool,
    minimized: bool,
    /// Logical top-left of the full-size box, em.
    location_em: Option<(f64, f64)>,
    /// User-chosen size, em.
    size_em: Option<(f64, f64)>,
}

impl NodeBox {
    pub fn new(id: NodeId, name: impl Into<String>, kind: NodeKind, meta: &NodeMetadata) -> Self {
        let open = meta.open;
        Self {
            id,
            name: name.into(),
            kind,
            pins: PinSet::from_metadata(&meta.pins),
            bounds: IntRect::zero(),
            open,
            minimized: kind == NodeKind::Connection && !open,
            location_em: meta.position(),
            size_em: meta.size(),
        }
    }

    pub fn bounds(&self) -> IntRect {
        self.bounds
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    pub fn has_stored_location(&self) -> bool {
        self.location_em.is_some()
    }

    /// Raw position/size write. Does not notify anyone; the canvas uses this while shifting.
    pub fn set_bounds_raw(&mut self, bounds: IntRect) {
        self.bounds = bounds;
    }

    pub fn translate(&mut self, delta: IntVector) {
        self.bounds = self.bounds.translate(delta);
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    pub fn title_height(&self, cfg: &RenderConfig) -> f64 {
        cfg.ems(cfg.line_height + 2.0 * cfg.node_padding)
    }

    /// Size of the box when not minimized.
    pub fn full_size(&self, cfg: &RenderConfig, measurer: &dyn TextMeasurer) -> IntSize {
        let title = measurer.measure(&self.name, cfg);
        let pad = cfg.ems(cfg.node_padding);
        let pin_columns = if self.pins.is_empty() {
            0.0
        } else {
            2.0 * cfg.ems(cfg.pin_width)
        };
        let mut width = title.width + 2.0 * pad + pin_columns;
        let mut height =
            self.title_height(cfg) + self.pins.rows() as f64 * cfg.ems(cfg.pin_slot_height);

        let requested = match (self.size_em, self.open) {
            (Some(size), _) => Some(size),
            (None, true) => Some((cfg.open_width, cfg.open_height)),
            (None, false) => None,
        };
        // Requested sizes come back from px / em, so snap them to the pixel they were.
        if let Some((w, h)) = requested {
            width = width.max(cfg.ems(w).round());
            height = height.max(cfg.ems(h).round());
        }
        euclid::size2(width.ceil() as i32, height.ceil() as i32)
    }

    pub fn icon_size(&self, cfg: &RenderConfig) -> i32 {
        cfg.ems(cfg.minimized_size).ceil() as i32
    }

    pub fn preferred_size(&self, cfg: &RenderConfig, measurer: &dyn TextMeasurer) -> IntSize {
        if self.minimized {
            let side = self.icon_size(cfg);
            return euclid::size2(side, side);
        }
        self.full_size(cfg, measurer)
    }

    /// Shift from the full box's top-left to the top-left of the centered icon.
    pub fn minimized_offset(&self, cfg: &RenderConfig, measurer: &dyn TextMeasurer) -> IntVector {
        let icon = self.icon_size(cfg);
        half(self.full_size(cfg, measurer)) - half(euclid::size2(icon, icon))
    }

    /// Screen location derived from the stored logical position, or `None` when the node has
    /// never been placed.
    pub fn preferred_location(
        &self,
        cfg: &RenderConfig,
        measurer: &dyn TextMeasurer,
        offset: IntVector,
    ) -> Option<IntPoint> {
        let (x, y) = self.location_em?;
        let mut p = int_point(cfg.ems(x).round() as i32, cfg.ems(y).round() as i32) + offset;
        if self.minimized {
            p += self.minimized_offset(cfg, measurer);
        }
        Some(p)
    }

    /// Re-derives the size, keeping the current top-left (or the centered icon position when
    /// minimized).
    pub fn refresh_size(&mut self, cfg: &RenderConfig, measurer: &dyn TextMeasurer) {
        let size = self.preferred_size(cfg, measurer);
        self.bounds = IntRect::new(self.bounds.origin, size);
    }

    /// Collapses to (or restores from) the icon, keeping the visual center fixed.
    pub fn set_minimized(
        &mut self,
        minimized: bool,
        cfg: &RenderConfig,
        measurer: &dyn TextMeasurer,
    ) {
        if self.minimized == minimized {
            return;
        }
        let center = self.bounds.origin + half(self.bounds.size);
        self.minimized = minimized;
        let size = self.preferred_size(cfg, measurer);
        self.bounds = IntRect::new(center - half(size), size);
    }

    /// Logical metadata for the current screen bounds.
    pub fn to_metadata(
        &self,
        cfg: &RenderConfig,
        measurer: &dyn TextMeasurer,
        offset: IntVector,
    ) -> NodeMetadata {
        let mut origin = self.bounds.origin - offset;
        if self.minimized {
            origin -= self.minimized_offset(cfg, measurer);
        }
        let em = cfg.em_px();
        NodeMetadata {
            x: Some(origin.x as f64 / em),
            y: Some(origin.y as f64 / em),
            width: self.size_em.map(|s| s.0),
            height: self.size_em.map(|s| s.1),
            open: self.open,
            pins: self.pins.to_metadata(),
        }
    }

    /// Records the current bounds as the persisted logical position.
    pub fn commit_location(
        &mut self,
        cfg: &RenderConfig,
        measurer: &dyn TextMeasurer,
        offset: IntVector,
    ) {
        let meta = self.to_metadata(cfg, measurer, offset);
        self.location_em = meta.position();
    }

    /// Records the current size as the user-chosen size.
    pub fn commit_size(&mut self, cfg: &RenderConfig) {
        if self.minimized {
            return;
        }
        let em = cfg.em_px();
        self.size_em = Some((
            self.bounds.size.width as f64 / em,
            self.bounds.size.height as f64 / em,
        ));
    }

    /// Anchor of a pin slot on the node's border.
    pub fn pin_anchor(&self, key: &PinKey, cfg: &RenderConfig) -> Option<PinAnchor> {
        let pin = self.pins.get(key)?;
        let r = self.bounds.to_f64();
        let on_left = match (self.kind, key.side) {
            (NodeKind::IoBlock, PinSide::In) => false,
            (NodeKind::IoBlock, PinSide::Out) => true,
            (_, PinSide::In) => true,
            (_, PinSide::Out) => false,
        };
        let y = if self.minimized {
            r.center().y
        } else {
            let slot = cfg.ems(cfg.pin_slot_height);
            r.min_y() + self.title_height(cfg) + (pin.order as f64 + 0.5) * slot
        };
        let (x, normal) = if on_left {
            (r.min_x(), Vector2::new(-1.0, 0.0))
        } else {
            (r.max_x(), Vector2::new(1.0, 0.0))
        };
        Some(PinAnchor {
            point: Vector2::new(x, y),
            normal,
            order: pin.order,
        })
    }
}

fn half(size: IntSize) -> IntVector {
    int_vector(size.width / 2, size.height / 2)
}

/// Tracks whether cached scaled icons match the zoom factor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IconCache {
    /// Scale of the cached icons; `None` means the unscaled originals are in use.
    scale: Option<f64>,
}

impl IconCache {
    pub fn scale(&self) -> Option<f64> {
        self.scale
    }

    /// Returns `true` when icons must be regenerated for `zoom`.
    pub fn update(&mut self, zoom: f64, threshold: f64) -> bool {
        let wanted = ((zoom - 1.0).abs() >= threshold).then_some(zoom);
        if wanted == self.scale {
            return false;
        }
        tracing::debug!(?wanted, previous = ?self.scale, "icon cache scale changed");
        self.scale = wanted;
        wanted.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeterministicTextMeasurer;
    use crate::metadata::{PinMetadata, PinsMetadata};

    fn cfg() -> RenderConfig {
        RenderConfig::default()
    }

    #[test]
    fn open_node_uses_persisted_size() {
        let meta = NodeMetadata {
            x: Some(1.0),
            y: Some(2.0),
            width: Some(20.0),
            height: Some(10.0),
            open: true,
            ..Default::default()
        };
        let node = NodeBox::new(NodeId(0), "Soma", NodeKind::Part, &meta);
        let size = node.preferred_size(&cfg(), &DeterministicTextMeasurer);
        assert_eq!((size.width, size.height), (260, 130));
        let loc = node
            .preferred_location(&cfg(), &DeterministicTextMeasurer, int_vector(5, 0))
            .expect("placed");
        assert_eq!((loc.x, loc.y), (18, 26));
    }

    #[test]
    fn minimizing_keeps_the_center() {
        let mut node = NodeBox::new(
            NodeId(0),
            "Synapse",
            NodeKind::Part,
            &NodeMetadata::default(),
        );
        let m = DeterministicTextMeasurer;
        node.refresh_size(&cfg(), &m);
        node.translate(int_vector(100, 100));
        let before = node.bounds();

        node.set_minimized(true, &cfg(), &m);
        let icon = node.bounds();
        assert_eq!(icon.size.width, 26);
        let correction = node.minimized_offset(&cfg(), &m);
        assert_eq!(icon.origin, before.origin + correction);

        node.set_minimized(false, &cfg(), &m);
        assert_eq!(node.bounds(), before);
    }

    #[test]
    fn opening_and_closing_a_connection_returns_to_the_same_icon() {
        let meta = NodeMetadata {
            x: Some(10.0),
            y: Some(10.0),
            ..Default::default()
        };
        let mut node = NodeBox::new(NodeId(0), "syn", NodeKind::Connection, &meta);
        let m = DeterministicTextMeasurer;
        let origin = node
            .preferred_location(&cfg(), &m, IntVector::zero())
            .expect("placed");
        node.set_bounds_raw(IntRect::new(origin, node.preferred_size(&cfg(), &m)));
        let icon = node.bounds();

        for _ in 0..3 {
            node.set_open(true);
            node.set_minimized(false, &cfg(), &m);
            let full = node.bounds();
            assert_eq!(full.size, node.full_size(&cfg(), &m));
            assert_eq!(full.origin + half(full.size), icon.origin + half(icon.size));

            node.set_open(false);
            node.set_minimized(true, &cfg(), &m);
            assert_eq!(node.bounds(), icon);
        }
        let back = node.to_metadata(&cfg(), &m, IntVector::zero());
        assert_eq!(back.position(), Some((10.0, 10.0)));
    }

    #[test]
    fn committed_sizes_come_back_to_the_same_pixel() {
        let mut node = NodeBox::new(NodeId(0), "A", NodeKind::Part, &NodeMetadata::default());
        let m = DeterministicTextMeasurer;
        for width in 60..400 {
            node.set_bounds_raw(IntRect::new(IntPoint::origin(), euclid::size2(width, 65)));
            node.commit_size(&cfg());
            assert_eq!(node.full_size(&cfg(), &m), euclid::size2(width, 65), "width {width}");
        }
    }

    #[test]
    fn pin_slots_stack_below_the_title() {
        let mut pins = PinsMetadata::default();
        pins.inputs.insert("a".into(), PinMetadata::default());
        pins.inputs.insert(
            "b".into(),
            PinMetadata {
                order: 1,
                ..Default::default()
            },
        );
        pins.outputs.insert("y".into(), PinMetadata::default());
        let meta = NodeMetadata {
            pins,
            ..Default::default()
        };
        let c = cfg();
        let m = DeterministicTextMeasurer;
        let mut node = NodeBox::new(NodeId(1), "Neuron", NodeKind::Part, &meta);
        node.refresh_size(&c, &m);

        let a = node.pin_anchor(&PinKey::input("a"), &c).expect("a");
        let b = node.pin_anchor(&PinKey::input("b"), &c).expect("b");
        let y = node.pin_anchor(&PinKey::output("y"), &c).expect("y");
        assert_eq!(a.point.x, 0.0);
        assert_eq!(a.normal, Vector2::new(-1.0, 0.0));
        assert!((b.point.y - a.point.y - c.ems(c.pin_slot_height)).abs() < 1e-9);
        assert_eq!(y.point.x, node.bounds().size.width as f64);
        assert_eq!(y.normal, Vector2::new(1.0, 0.0));
        assert!(node.pin_anchor(&PinKey::output("missing"), &c).is_none());
    }

    #[test]
    fn io_block_mirrors_pin_sides() {
        let mut node = NodeBox::new(NodeId(2), "io", NodeKind::IoBlock, &NodeMetadata::default());
        node.pins.insert(&PinKey::input("x"), None);
        node.refresh_size(&cfg(), &DeterministicTextMeasurer);
        let x = node.pin_anchor(&PinKey::input("x"), &cfg()).expect("x");
        assert_eq!(x.normal, Vector2::new(1.0, 0.0));
    }

    #[test]
    fn icon_regeneration_threshold() {
        let mut cache = IconCache::default();
        assert!(!cache.update(1.04, 0.05));
        assert_eq!(cache.scale(), None);
        assert!(cache.update(1.05, 0.05));
        assert!(!cache.update(1.05, 0.05));
        assert!(cache.update(0.5, 0.05));
        assert!(!cache.update(1.0, 0.05));
        assert_eq!(cache.scale(), None);
    }
}
