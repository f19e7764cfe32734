//! The virtual canvas: node placement, shape cache, and the shifting coordinate frame.

use crate::autoscroll::AutoScroll;
use crate::error::{Error, Result};
use crate::event::{CanvasEvent, Update};
use crate::layout::LayoutEngine;
use crate::viewport::Viewport;
use limpet_core::{
    ConnectionModel, DeterministicTextMeasurer, EdgeId, IconCache, NodeId, NodeMetadata,
    RenderConfig, Scene, TextMeasurer,
};
use limpet_geom::{IntPoint, IntRect, IntSize, IntVector, Vector2, int_point};
use limpet_render::{EdgeShape, Router};
use rustc_hash::FxHashMap;
use std::sync::Arc;

pub struct Canvas {
    scene: Scene,
    shapes: FxHashMap<EdgeId, EdgeShape>,
    config: RenderConfig,
    measurer: Arc<dyn TextMeasurer + Send + Sync>,
    layout: LayoutEngine,
    viewport: Viewport,
    /// Translation from logical (persisted) coordinates to canvas pixels.
    offset: IntVector,
    icons: IconCache,
    /// Next free spot for nodes that were never placed.
    cascade: Option<IntPoint>,
    pub(crate) autoscroll: AutoScroll,
    pub(crate) drag_active: bool,
    /// Edge whose tip follows the pointer, and where the tip is.
    pub(crate) edge_drag: Option<(EdgeId, Vector2)>,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("nodes", &self.scene.node_count())
            .field("edges", &self.scene.edge_count())
            .field("offset", &self.offset)
            .field("viewport", &self.viewport)
            .field("extent", &self.layout.extent())
            .finish_non_exhaustive()
    }
}

impl Canvas {
    pub fn new(scene: Scene, config: RenderConfig, viewport: IntSize) -> Self {
        Self::with_measurer(scene, config, viewport, Arc::new(DeterministicTextMeasurer))
    }

    /// Places every node (stored positions first, then a cascade for the rest), routes every
    /// edge, and settles the frame so nothing sits at negative coordinates.
    pub fn with_measurer(
        scene: Scene,
        config: RenderConfig,
        viewport: IntSize,
        measurer: Arc<dyn TextMeasurer + Send + Sync>,
    ) -> Self {
        let interval = config.autoscroll_interval();
        let mut canvas = Self {
            scene,
            shapes: FxHashMap::default(),
            config,
            measurer,
            layout: LayoutEngine::new(),
            viewport: Viewport::new(viewport),
            offset: IntVector::zero(),
            icons: IconCache::default(),
            cascade: None,
            autoscroll: AutoScroll::new(interval),
            drag_active: false,
            edge_drag: None,
        };
        canvas
            .icons
            .update(canvas.config.zoom, canvas.config.icon_regen_threshold);

        let (stored, unplaced): (Vec<_>, Vec<_>) = canvas
            .scene
            .nodes()
            .map(|n| (n.id, n.has_stored_location()))
            .partition(|(_, stored)| *stored);
        for (id, _) in stored.into_iter().chain(unplaced) {
            canvas.place_node(id);
        }
        canvas.reroute_all();
        let shift = canvas.layout_container();
        tracing::debug!(
            nodes = canvas.scene.node_count(),
            edges = canvas.scene.edge_count(),
            dx = shift.x,
            dy = shift.y,
            "canvas created"
        );
        canvas
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn measurer(&self) -> &dyn TextMeasurer {
        self.measurer.as_ref()
    }

    pub fn offset(&self) -> IntVector {
        self.offset
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn icon_cache(&self) -> &IconCache {
        &self.icons
    }

    /// Scrollable extent; its top-left is `(0, 0)` after every settle.
    pub fn extent(&self) -> IntRect {
        self.layout.extent()
    }

    pub fn is_layout_dirty(&self) -> bool {
        self.layout.is_dirty()
    }

    pub fn is_autoscrolling(&self) -> bool {
        self.autoscroll.is_running()
    }

    pub fn shape(&self, edge: EdgeId) -> Option<&EdgeShape> {
        self.shapes.get(&edge)
    }

    /// Shapes in edge order.
    pub fn shapes(&self) -> Vec<&EdgeShape> {
        self.scene
            .edges()
            .filter_map(|e| self.shapes.get(&e.id))
            .collect()
    }

    /// Current metadata of `node` in logical em units.
    pub fn metadata(&self, node: NodeId) -> Result<NodeMetadata> {
        let n = self.scene.try_node(node)?;
        Ok(n.to_metadata(&self.config, self.measurer.as_ref(), self.offset))
    }

    /// Replaces every edge from `model` and routes them all.
    pub fn rebuild(&mut self, model: &dyn ConnectionModel) -> Update {
        self.scene.rebuild_edges(model);
        self.shapes.clear();
        let rerouted = self.reroute_all();
        let shift = self.layout_container();
        Update {
            rerouted,
            shift,
            ..Default::default()
        }
    }

    /// Single update entry point.
    pub fn apply(&mut self, event: CanvasEvent) -> Result<Update> {
        let mut update = Update::default();
        match event {
            CanvasEvent::NodeMoved { node, to } => {
                let n = self.scene.try_node_mut(node)?;
                let size = n.bounds().size;
                n.set_bounds_raw(IntRect::new(to, size));
                update.rerouted = self.node_changed(node);
            }
            CanvasEvent::NodeResized { node, bounds } => {
                let n = self.scene.try_node_mut(node)?;
                n.set_bounds_raw(bounds);
                n.commit_size(&self.config);
                update.rerouted = self.node_changed(node);
                update.metadata.push((node, self.metadata(node)?));
            }
            CanvasEvent::BindingChanged { node, binding } => {
                let affected = self.scene.set_binding(node, &binding)?;
                update.rerouted = self.reroute(&affected);
            }
            CanvasEvent::BindingRemoved { node, alias } => {
                let affected = self.scene.remove_binding(node, &alias)?;
                update.removed = self.drop_stale_shapes();
                update.rerouted = self.reroute(&affected);
                self.layout.mark_dirty();
            }
            CanvasEvent::ViewportPanRequested { to } => {
                update.shift = self.shift_viewport(to);
            }
            CanvasEvent::ZoomChanged { zoom } => return self.set_zoom(zoom),
            CanvasEvent::NodeMinimized { node, minimized } => {
                let n = self.scene.try_node_mut(node)?;
                n.set_minimized(minimized, &self.config, self.measurer.as_ref());
                update.rerouted = self.node_changed(node);
            }
            CanvasEvent::NodeOpened { node, open } => {
                let n = self.scene.try_node_mut(node)?;
                n.set_open(open);
                if n.kind == limpet_core::NodeKind::Connection {
                    n.set_minimized(!open, &self.config, self.measurer.as_ref());
                }
                n.refresh_size(&self.config, self.measurer.as_ref());
                update.rerouted = self.node_changed(node);
                update.metadata.push((node, self.metadata(node)?));
            }
            CanvasEvent::NodeAdded {
                name,
                kind,
                metadata,
            } => {
                let id = self.scene.add_node(name, kind, &metadata)?;
                self.place_node(id);
                // Former external references now end here; their sources' edges move with them.
                let mut affected = self.scene.dependents(id);
                let sources = affected
                    .iter()
                    .filter_map(|e| self.scene.edge(*e))
                    .map(|e| e.from)
                    .filter(|from| *from != id)
                    .collect::<Vec<_>>();
                for from in sources {
                    affected.extend(self.scene.dependents(from));
                }
                affected.sort_unstable();
                affected.dedup();
                update.rerouted = self.reroute(&affected);
                update.added = Some(id);
            }
            CanvasEvent::NodeRemoved { node } => {
                let dependents = self.scene.dependents(node);
                let (_, removed) = self.scene.remove_node(node)?;
                for id in &removed {
                    self.shapes.remove(id);
                }
                let survivors = dependents
                    .into_iter()
                    .filter(|id| !removed.contains(id))
                    .collect::<Vec<_>>();
                update.removed = removed;
                update.rerouted = self.reroute(&survivors);
                self.layout.mark_dirty();
            }
        }
        if self.layout.is_dirty() {
            update.shift += self.layout_container();
        }
        Ok(update)
    }

    /// Moves the viewport to `target`, first translating the whole canvas when the union of
    /// every component and the target would reach into negative coordinates.
    ///
    /// The translation is a raw write: nothing is re-routed and no move notification fires.
    /// Returns the applied delta so callers can correct coordinates they hold.
    pub fn shift_viewport(&mut self, target: IntPoint) -> IntVector {
        let boxes = self.component_boxes();
        let delta = self.layout.settle(boxes, Some(target));
        if delta != IntVector::zero() {
            self.translate_all(delta);
        }
        self.viewport.position = target + delta;
        delta
    }

    /// The layout pass. A frame that already starts at the origin only refreshes preferred
    /// sizes and re-routes every edge; otherwise everything is translated by
    /// `(max(-x, 0), max(-y, 0))`.
    pub fn layout_container(&mut self) -> IntVector {
        let mut delta = self.layout.settle(self.component_boxes(), None);
        if delta == IntVector::zero() {
            self.refresh_sizes();
            self.reroute_all();
            delta = self.layout.settle(self.component_boxes(), None);
        }
        if delta != IntVector::zero() {
            self.translate_all(delta);
        }
        delta
    }

    fn set_zoom(&mut self, zoom: f64) -> Result<Update> {
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(Error::InvalidZoom { zoom });
        }
        let ratio = zoom / self.config.zoom;
        let mut update = Update::default();
        if ratio == 1.0 {
            return Ok(update);
        }
        self.config.zoom = zoom;
        let scale = |p: IntPoint| {
            int_point(
                (p.x as f64 * ratio).round() as i32,
                (p.y as f64 * ratio).round() as i32,
            )
        };
        for node in self.scene.nodes_mut() {
            let b = node.bounds();
            node.set_bounds_raw(IntRect::new(scale(b.origin), b.size));
            node.refresh_size(&self.config, self.measurer.as_ref());
        }
        self.offset = scale(self.offset.to_point()).to_vector();
        self.viewport.position = scale(self.viewport.position);
        if let Some((_, tip)) = &mut self.edge_drag {
            *tip = *tip * ratio;
        }
        update.regenerate_icons = self
            .icons
            .update(zoom, self.config.icon_regen_threshold);
        tracing::debug!(zoom, regenerate_icons = update.regenerate_icons, "zoom changed");

        update.rerouted = self.reroute_all();
        self.layout.mark_dirty();
        update.shift = self.layout_container();
        Ok(update)
    }

    fn place_node(&mut self, id: NodeId) {
        let Some(node) = self.scene.node(id) else {
            return;
        };
        let size = node.preferred_size(&self.config, self.measurer.as_ref());
        let stored = node.preferred_location(&self.config, self.measurer.as_ref(), self.offset);
        let origin = match stored {
            Some(p) => p,
            None => self.cascade_slot(size),
        };
        if let Some(node) = self.scene.node_mut(id) {
            node.set_bounds_raw(IntRect::new(origin, size));
            self.layout.component_moved(node.bounds());
        }
    }

    fn cascade_slot(&mut self, size: IntSize) -> IntPoint {
        let gap = self.config.ems(self.config.placement_gap).round() as i32;
        let scene = &self.scene;
        let next = *self.cascade.get_or_insert_with(|| {
            let right = scene
                .nodes()
                .map(|n| n.bounds())
                .filter(|b| !b.is_empty())
                .map(|b| b.max_x())
                .max();
            int_point(right.map_or(0, |r| r + gap), 0)
        });
        self.cascade = Some(int_point(next.x, next.y + size.height + gap));
        next
    }

    fn refresh_sizes(&mut self) {
        for node in self.scene.nodes_mut() {
            node.refresh_size(&self.config, self.measurer.as_ref());
        }
    }

    pub(crate) fn commit_location(&mut self, node: NodeId) -> Result<()> {
        let n = self.scene.try_node_mut(node)?;
        n.commit_location(&self.config, self.measurer.as_ref(), self.offset);
        Ok(())
    }

    /// A node's bounds changed: track them and re-route the edges that depend on it.
    fn node_changed(&mut self, node: NodeId) -> Vec<EdgeId> {
        if let Some(n) = self.scene.node(node) {
            self.layout.component_moved(n.bounds());
        }
        let dependents = self.scene.dependents(node);
        self.reroute(&dependents)
    }

    pub(crate) fn reroute(&mut self, ids: &[EdgeId]) -> Vec<EdgeId> {
        let router = Router::new(&self.config, self.measurer.as_ref());
        let mut done = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(edge) = self.scene.edge(*id) else {
                self.shapes.remove(id);
                continue;
            };
            let shape = match self.edge_drag {
                Some((dragged, tip)) if dragged == *id => {
                    router.route_dragging(edge, &self.scene, tip)
                }
                _ => router.route(edge, &self.scene),
            };
            if !shape.is_empty() {
                self.layout.component_moved(shape.bounds);
            }
            self.shapes.insert(*id, shape);
            done.push(*id);
        }
        done
    }

    fn reroute_all(&mut self) -> Vec<EdgeId> {
        self.drop_stale_shapes();
        let ids = self.scene.edges().map(|e| e.id).collect::<Vec<_>>();
        self.reroute(&ids)
    }

    fn drop_stale_shapes(&mut self) -> Vec<EdgeId> {
        let mut stale = self
            .shapes
            .keys()
            .filter(|id| self.scene.edge(**id).is_none())
            .copied()
            .collect::<Vec<_>>();
        stale.sort_unstable();
        for id in &stale {
            self.shapes.remove(id);
        }
        stale
    }

    fn component_boxes(&self) -> Vec<IntRect> {
        self.scene
            .nodes()
            .map(|n| n.bounds())
            .chain(
                self.shapes
                    .values()
                    .filter(|s| !s.is_empty())
                    .map(|s| s.bounds),
            )
            .filter(|b| !b.is_empty())
            .collect()
    }

    /// Raw translation of every node, shape, the offset and the viewport.
    fn translate_all(&mut self, delta: IntVector) {
        for node in self.scene.nodes_mut() {
            node.translate(delta);
        }
        for shape in self.shapes.values_mut() {
            shape.translate(delta);
        }
        if let Some((_, tip)) = &mut self.edge_drag {
            *tip += Vector2::new(delta.x as f64, delta.y as f64);
        }
        self.offset += delta;
        self.viewport.position += delta;
        self.cascade = self.cascade.map(|p| p + delta);
        tracing::debug!(dx = delta.x, dy = delta.y, "canvas shifted");
    }
}
