//! Arena of node boxes and edges addressed by handle.
//!
//! Partner relationships are stored as handle pairs and are always re-derived from the
//! outgoing edge set of the connection node, never patched pointer by pointer.

use crate::edge::{EdgeSpec, EdgeTarget};
use crate::error::{Error, Result};
use crate::metadata::NodeMetadata;
use crate::model::{Binding, ConnectionModel};
use crate::node::{NodeBox, NodeKind};
use crate::{EdgeId, NodeId};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: IndexMap<NodeId, NodeBox>,
    names: FxHashMap<String, NodeId>,
    edges: IndexMap<EdgeId, EdgeSpec>,
    next_node: u32,
    next_edge: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        kind: NodeKind,
        meta: &NodeMetadata,
    ) -> Result<NodeId> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(Error::DuplicateNode { name });
        }
        meta.validate()?;
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.names.insert(name.clone(), id);
        self.nodes.insert(id, NodeBox::new(id, name.clone(), kind, meta));
        self.adopt_external(&name, id);
        Ok(id)
    }

    /// Points external references to `name` at the node that now carries it.
    fn adopt_external(&mut self, name: &str, id: NodeId) {
        let mut from_nodes = Vec::new();
        for edge in self.edges.values_mut() {
            let EdgeTarget::External { name: target, pin } = &mut edge.target else {
                continue;
            };
            if target.as_str() != name {
                continue;
            }
            edge.target = EdgeTarget::Node {
                node: id,
                pin: pin.take(),
            };
            if !from_nodes.contains(&edge.from) {
                from_nodes.push(edge.from);
            }
        }
        if from_nodes.is_empty() {
            return;
        }
        tracing::trace!(node = %id, sources = from_nodes.len(), "external references resolved");
        for from in from_nodes {
            self.derive_partners(from);
        }
        self.refresh_pin_bound_flags();
    }

    /// Removes a node and every edge from or to it. Returns the removed edges.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(NodeBox, Vec<EdgeId>)> {
        let node = self
            .nodes
            .shift_remove(&id)
            .ok_or(Error::UnknownNode { id })?;
        self.names.remove(&node.name);

        let doomed = self
            .edges
            .values()
            .filter(|e| e.touches(id))
            .map(|e| (e.id, e.from))
            .collect::<Vec<_>>();
        let mut from_nodes = Vec::new();
        for (edge, from) in &doomed {
            self.edges.shift_remove(edge);
            if *from != id && !from_nodes.contains(from) {
                from_nodes.push(*from);
            }
        }
        for from in from_nodes {
            self.derive_partners(from);
        }
        self.refresh_pin_bound_flags();
        Ok((node, doomed.into_iter().map(|(e, _)| e).collect()))
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeBox> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeBox> {
        self.nodes.get_mut(&id)
    }

    pub fn try_node(&self, id: NodeId) -> Result<&NodeBox> {
        self.nodes.get(&id).ok_or(Error::UnknownNode { id })
    }

    pub fn try_node_mut(&mut self, id: NodeId) -> Result<&mut NodeBox> {
        self.nodes.get_mut(&id).ok_or(Error::UnknownNode { id })
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    pub fn try_node_id(&self, name: &str) -> Result<NodeId> {
        self.node_id(name).ok_or_else(|| Error::UnknownNodeName {
            name: name.to_string(),
        })
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeBox> {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut NodeBox> {
        self.nodes.values_mut()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge(&self, id: EdgeId) -> Option<&EdgeSpec> {
        self.edges.get(&id)
    }

    pub fn try_edge(&self, id: EdgeId) -> Result<&EdgeSpec> {
        self.edges.get(&id).ok_or(Error::UnknownEdge { id })
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeSpec> {
        self.edges.values()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Outgoing edges of `node` in insertion order.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &EdgeSpec> {
        self.edges.values().filter(move |e| e.from == node)
    }

    /// Rebuilds every edge from the model: one pass over nodes × bindings.
    pub fn rebuild_edges(&mut self, model: &dyn ConnectionModel) {
        self.edges.clear();
        let froms = self
            .nodes
            .values()
            .map(|n| (n.id, n.name.clone()))
            .collect::<Vec<_>>();
        for (from, name) in &froms {
            for binding in model.bindings(name) {
                let id = self.alloc_edge();
                let spec = self.resolve(id, *from, &binding);
                self.edges.insert(spec.id, spec);
            }
        }
        for (from, _) in &froms {
            self.derive_partners(*from);
        }
        self.refresh_pin_bound_flags();
        tracing::debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            partnered = self.edges.values().filter(|e| e.partner.is_some()).count(),
            "rebuilt edges"
        );
    }

    /// Adds or replaces the edge for `binding.alias` on `node`.
    ///
    /// Returns the edges whose shapes depend on the change.
    pub fn set_binding(&mut self, node: NodeId, binding: &Binding) -> Result<Vec<EdgeId>> {
        self.try_node(node)?;
        let before = self.outgoing(node).count();
        let existing = self
            .outgoing(node)
            .find(|e| e.alias == binding.alias)
            .map(|e| e.id);

        // Replacing keeps the handle so enumeration order and partner bias stay put.
        let id = existing.unwrap_or_else(|| self.alloc_edge());
        let spec = self.resolve(id, node, binding);
        self.edges.insert(id, spec);
        if existing.is_none() {
            tracing::trace!(%node, edges = before + 1, "binding added");
        }
        self.derive_partners(node);
        self.refresh_pin_bound_flags();
        Ok(self.affected_by_binding(node))
    }

    pub fn remove_binding(&mut self, node: NodeId, alias: &str) -> Result<Vec<EdgeId>> {
        self.try_node(node)?;
        let Some(id) = self
            .outgoing(node)
            .find(|e| e.alias == alias)
            .map(|e| e.id)
        else {
            return Ok(Vec::new());
        };
        self.edges.shift_remove(&id);
        self.derive_partners(node);
        self.refresh_pin_bound_flags();
        Ok(self.affected_by_binding(node))
    }

    fn affected_by_binding(&self, node: NodeId) -> Vec<EdgeId> {
        self.outgoing(node).map(|e| e.id).collect()
    }

    fn alloc_edge(&mut self) -> EdgeId {
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        id
    }

    fn resolve(&self, id: EdgeId, from: NodeId, binding: &Binding) -> EdgeSpec {
        let target = match binding.target.as_deref() {
            None => EdgeTarget::Unconnected,
            Some(name) => match self.names.get(name) {
                Some(node) => EdgeTarget::Node {
                    node: *node,
                    pin: binding.to_pin.clone(),
                },
                None => EdgeTarget::External {
                    name: name.to_string(),
                    pin: binding.to_pin.clone(),
                },
            },
        };
        EdgeSpec {
            id,
            from,
            from_pin: binding.from_pin.clone(),
            target,
            alias: binding.alias.clone(),
            topic: binding.topic.clone(),
            head: binding.head,
            straight: binding.straight,
            partner: None,
        }
    }

    /// Partners the two non-pin outgoing edges of a binary connection; clears everything else.
    pub fn derive_partners(&mut self, node: NodeId) {
        let is_connection = self
            .nodes
            .get(&node)
            .is_some_and(|n| n.kind == NodeKind::Connection);
        let candidates = self
            .outgoing(node)
            .filter(|e| !e.is_pin_link())
            .map(|e| e.id)
            .collect::<Vec<_>>();
        let all = self.outgoing(node).map(|e| e.id).collect::<Vec<_>>();
        for id in &all {
            if let Some(e) = self.edges.get_mut(id) {
                e.partner = None;
            }
        }
        if is_connection && candidates.len() == 2 {
            let (a, b) = (candidates[0], candidates[1]);
            if let Some(e) = self.edges.get_mut(&a) {
                e.partner = Some(b);
            }
            if let Some(e) = self.edges.get_mut(&b) {
                e.partner = Some(a);
            }
        }
        debug_assert!(self.partners_symmetric(), "partner handles out of sync");
    }

    /// `A.partner == B` implies `B.partner == A` for every edge.
    pub fn partners_symmetric(&self) -> bool {
        self.edges.values().all(|e| match e.partner {
            None => true,
            Some(p) => self.edges.get(&p).is_some_and(|o| o.partner == Some(e.id)),
        })
    }

    fn refresh_pin_bound_flags(&mut self) {
        for node in self.nodes.values_mut() {
            node.pins.clear_bound();
        }
        let attachments = self
            .edges
            .values()
            .flat_map(|e| {
                let from = e.from_pin.clone().map(|k| (e.from, k));
                let to = e.target.node().zip(e.target.pin().cloned());
                from.into_iter().chain(to)
            })
            .collect::<Vec<_>>();
        for (node, key) in attachments {
            if let Some(n) = self.nodes.get_mut(&node) {
                n.pins.set_bound(&key, true);
            }
        }
    }

    /// Edges whose shape depends on the geometry of `node`: edges touching it, and the
    /// partners of those edges.
    pub fn dependents(&self, node: NodeId) -> Vec<EdgeId> {
        let mut out = Vec::new();
        for e in self.edges.values() {
            if e.touches(node) {
                out.push(e.id);
                if let Some(p) = e.partner {
                    out.push(p);
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// `(index, count)` of an unconnected edge among its unconnected siblings, with the count
    /// capped at `max` directions.
    pub fn unconnected_slot(&self, edge: EdgeId, max: usize) -> Option<(usize, usize)> {
        let spec = self.edges.get(&edge)?;
        let siblings = self
            .outgoing(spec.from)
            .filter(|e| e.target == EdgeTarget::Unconnected && !e.is_pin_link())
            .map(|e| e.id)
            .collect::<Vec<_>>();
        let index = siblings.iter().position(|id| *id == edge)?;
        let count = siblings.len().min(max.max(1));
        Some((index % count, count))
    }

    /// External-reference edges of `node`, in binding order.
    pub fn external_edges(&self, node: NodeId) -> Vec<EdgeId> {
        self.outgoing(node)
            .filter(|e| matches!(e.target, EdgeTarget::External { .. }) && !e.is_pin_link())
            .map(|e| e.id)
            .collect()
    }
}
