use crate::metadata::{PinMetadata, PinsMetadata};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinSide {
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinKey {
    pub side: PinSide,
    pub name: String,
}

impl PinKey {
    pub fn input(name: impl Into<String>) -> Self {
        Self {
            side: PinSide::In,
            name: name.into(),
        }
    }

    pub fn output(name: impl Into<String>) -> Self {
        Self {
            side: PinSide::Out,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub name: String,
    /// Vertical slot index among the pins on the same side.
    pub order: usize,
    /// Display hint only: an edge is attached.
    pub bound: bool,
    pub topic: Option<String>,
}

/// Ordered input and output pins of one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PinSet {
    inputs: Vec<Pin>,
    outputs: Vec<Pin>,
}

impl PinSet {
    pub fn from_metadata(meta: &PinsMetadata) -> Self {
        Self {
            inputs: collect_side(&meta.inputs),
            outputs: collect_side(&meta.outputs),
        }
    }

    pub fn to_metadata(&self) -> PinsMetadata {
        let side = |pins: &[Pin]| {
            pins.iter()
                .map(|p| {
                    (
                        p.name.clone(),
                        PinMetadata {
                            order: p.order,
                            bound: p.bound,
                            topic: p.topic.clone(),
                        },
                    )
                })
                .collect::<IndexMap<_, _>>()
        };
        PinsMetadata {
            inputs: side(&self.inputs),
            outputs: side(&self.outputs),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }

    pub fn side(&self, side: PinSide) -> &[Pin] {
        match side {
            PinSide::In => &self.inputs,
            PinSide::Out => &self.outputs,
        }
    }

    fn side_mut(&mut self, side: PinSide) -> &mut Vec<Pin> {
        match side {
            PinSide::In => &mut self.inputs,
            PinSide::Out => &mut self.outputs,
        }
    }

    pub fn get(&self, key: &PinKey) -> Option<&Pin> {
        self.side(key.side).iter().find(|p| p.name == key.name)
    }

    /// Number of stacked pin rows (the taller of the two columns).
    pub fn rows(&self) -> usize {
        let last = |pins: &[Pin]| {
            pins.iter()
                .map(|p| p.order.saturating_add(1))
                .max()
                .unwrap_or(0)
        };
        last(&self.inputs).max(last(&self.outputs))
    }

    pub fn set_bound(&mut self, key: &PinKey, bound: bool) -> bool {
        match self.side_mut(key.side).iter_mut().find(|p| p.name == key.name) {
            Some(pin) => {
                pin.bound = bound;
                true
            }
            None => false,
        }
    }

    pub fn clear_bound(&mut self) {
        for pin in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            pin.bound = false;
        }
    }

    /// Adds a pin at the next free slot on its side (or replaces the one with the same name).
    pub fn insert(&mut self, key: &PinKey, topic: Option<String>) {
        let pins = self.side_mut(key.side);
        if let Some(pin) = pins.iter_mut().find(|p| p.name == key.name) {
            pin.topic = topic;
            return;
        }
        let order = pins.iter().map(|p| p.order.saturating_add(1)).max().unwrap_or(0);
        pins.push(Pin {
            name: key.name.clone(),
            order,
            bound: false,
            topic,
        });
    }
}

fn collect_side(meta: &IndexMap<String, PinMetadata>) -> Vec<Pin> {
    let mut pins = meta
        .iter()
        .map(|(name, m)| Pin {
            name: name.clone(),
            order: m.order,
            bound: m.bound,
            topic: m.topic.clone(),
        })
        .collect::<Vec<_>>();
    pins.sort_by_key(|p| p.order);
    pins
}
