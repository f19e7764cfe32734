use limpet_core::{Binding, EdgeId, NodeId, NodeKind, NodeMetadata};
use limpet_geom::{IntPoint, IntRect, IntVector};

/// Everything that can change canvas geometry. [`crate::Canvas::apply`] is the only entry
/// point that consumes these.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// Raw move of a node's top-left; nothing is persisted.
    NodeMoved { node: NodeId, to: IntPoint },
    /// Completed resize; the new size is persisted.
    NodeResized { node: NodeId, bounds: IntRect },
    BindingChanged { node: NodeId, binding: Binding },
    BindingRemoved { node: NodeId, alias: String },
    ViewportPanRequested { to: IntPoint },
    ZoomChanged { zoom: f64 },
    NodeMinimized { node: NodeId, minimized: bool },
    NodeOpened { node: NodeId, open: bool },
    NodeAdded {
        name: String,
        kind: NodeKind,
        metadata: NodeMetadata,
    },
    NodeRemoved { node: NodeId },
}

/// What one applied event changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    /// Edges whose shapes were recomputed.
    pub rerouted: Vec<EdgeId>,
    /// Edges that no longer exist.
    pub removed: Vec<EdgeId>,
    /// Translation applied to the whole canvas by the layout pass or a viewport shift.
    pub shift: IntVector,
    pub added: Option<NodeId>,
    /// Metadata to write back, in em units.
    pub metadata: Vec<(NodeId, NodeMetadata)>,
    /// Cached scaled icons must be rebuilt.
    pub regenerate_icons: bool,
}

impl Update {
    pub(crate) fn merge(&mut self, other: Update) {
        for id in other.rerouted {
            if !self.rerouted.contains(&id) {
                self.rerouted.push(id);
            }
        }
        self.removed.extend(other.removed);
        self.shift += other.shift;
        self.added = self.added.or(other.added);
        self.metadata.extend(other.metadata);
        self.regenerate_icons |= other.regenerate_icons;
    }
}
