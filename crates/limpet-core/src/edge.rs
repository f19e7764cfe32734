use crate::pin::PinKey;
use crate::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// Decoration drawn at the tip of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeadKind {
    None,
    #[default]
    Arrow,
    Circle,
    FilledCircle,
}

/// What the far end of an edge resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeTarget {
    Node {
        node: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pin: Option<PinKey>,
    },
    /// Named part that is not shown in the current view. `pin` is the target pin the binding
    /// names, kept so the edge can attach to it once the part is added.
    External {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pin: Option<PinKey>,
    },
    Unconnected,
}

impl EdgeTarget {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            EdgeTarget::Node { node, .. } => Some(*node),
            _ => None,
        }
    }

    pub fn pin(&self) -> Option<&PinKey> {
        match self {
            EdgeTarget::Node { pin, .. } => pin.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub id: EdgeId,
    pub from: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_pin: Option<PinKey>,
    pub target: EdgeTarget,
    pub alias: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub head: HeadKind,
    pub straight: bool,
    /// The other edge of a binary connection. Always symmetric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner: Option<EdgeId>,
}

impl EdgeSpec {
    /// Pin links route between pin slots instead of node centers.
    pub fn is_pin_link(&self) -> bool {
        self.from_pin.is_some() || self.target.pin().is_some()
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.target.node() == Some(node)
    }

    /// Alias plus optional topic, as shown next to the root of the edge.
    pub fn label_text(&self) -> String {
        match &self.topic {
            Some(topic) if !topic.is_empty() => format!("{} ({topic})", self.alias),
            _ => self.alias.clone(),
        }
    }
}
