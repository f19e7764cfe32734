//! The connection model collaborator: who binds to whom, in a stable order.

use crate::edge::HeadKind;
use crate::pin::PinKey;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One named endpoint of a connection-bearing node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Binding {
    pub alias: String,
    /// Name of the bound part; `None` while the binding is unresolved.
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_pin: Option<PinKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_pin: Option<PinKey>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub straight: bool,
    pub head: HeadKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl Binding {
    pub fn new(alias: impl Into<String>, target: Option<&str>) -> Self {
        Self {
            alias: alias.into(),
            target: target.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn with_head(mut self, head: HeadKind) -> Self {
        self.head = head;
        self
    }

    pub fn straight(mut self) -> Self {
        self.straight = true;
        self
    }

    pub fn pins(mut self, from_pin: Option<PinKey>, to_pin: Option<PinKey>) -> Self {
        self.from_pin = from_pin;
        self.to_pin = to_pin;
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }
}

pub trait ConnectionModel {
    /// Bindings of `node` in enumeration order. The order must be stable within one rebuild;
    /// it decides left-to-right placement of external-reference labels.
    fn bindings(&self, node: &str) -> Vec<Binding>;
}

/// In-memory model keyed by node name.
#[derive(Debug, Clone, Default)]
pub struct StaticModel {
    bindings: IndexMap<String, Vec<Binding>>,
}

impl StaticModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: impl Into<String>, binding: Binding) -> &mut Self {
        self.bindings.entry(node.into()).or_default().push(binding);
        self
    }

    /// Replaces the binding with the same alias, or appends it.
    pub fn set(&mut self, node: &str, binding: Binding) {
        let list = self.bindings.entry(node.to_string()).or_default();
        match list.iter_mut().find(|b| b.alias == binding.alias) {
            Some(slot) => *slot = binding,
            None => list.push(binding),
        }
    }

    pub fn remove(&mut self, node: &str, alias: &str) -> Option<Binding> {
        let list = self.bindings.get_mut(node)?;
        let idx = list.iter().position(|b| b.alias == alias)?;
        Some(list.remove(idx))
    }
}

impl ConnectionModel for StaticModel {
    fn bindings(&self, node: &str) -> Vec<Binding> {
        self.bindings.get(node).cloned().unwrap_or_default()
    }
}
