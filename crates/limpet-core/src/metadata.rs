//! Persisted node geometry, in em units, as read from and written back to the model.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Highest pin slot a stored layout may name. Each slot is a row of the node box.
pub const MAX_PIN_ORDER: usize = 1024;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub open: bool,
    #[serde(skip_serializing_if = "PinsMetadata::is_empty")]
    pub pins: PinsMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinsMetadata {
    #[serde(rename = "in", skip_serializing_if = "IndexMap::is_empty")]
    pub inputs: IndexMap<String, PinMetadata>,
    #[serde(rename = "out", skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, PinMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinMetadata {
    pub order: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bound: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl PinsMetadata {
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }
}

impl NodeMetadata {
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.x?, self.y?))
    }

    pub fn size(&self) -> Option<(f64, f64)> {
        Some((self.width?, self.height?))
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [("x", self.x), ("y", self.y)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(Error::InvalidMetadata {
                        message: format!("{key} must be finite, got {v}"),
                    });
                }
            }
        }
        for (key, value) in [("width", self.width), ("height", self.height)] {
            if let Some(v) = value {
                if !(v.is_finite() && v >= 0.0) {
                    return Err(Error::InvalidMetadata {
                        message: format!("{key} must be a non-negative number, got {v}"),
                    });
                }
            }
        }
        let pins = self.pins.inputs.iter().map(|p| ("in", p));
        let pins = pins.chain(self.pins.outputs.iter().map(|p| ("out", p)));
        for (side, (name, pin)) in pins {
            if pin.order > MAX_PIN_ORDER {
                return Err(Error::InvalidMetadata {
                    message: format!(
                        "{side} pin {name:?} has order {}, the limit is {MAX_PIN_ORDER}",
                        pin.order
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json_without_empty_fields() {
        let meta: NodeMetadata =
            serde_json::from_str(r#"{"x": -1.5, "y": 2, "pins": {"in": {"a": {"order": 1}}}}"#)
                .expect("metadata");
        assert_eq!(meta.position(), Some((-1.5, 2.0)));
        assert_eq!(meta.pins.inputs["a"].order, 1);
        let text = serde_json::to_string(&meta).expect("json");
        assert!(!text.contains("width"));
        assert!(!text.contains("open"));
        assert!(!text.contains("out"));
    }

    #[test]
    fn negative_sizes_are_rejected() {
        let meta = NodeMetadata {
            width: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(
            meta.validate(),
            Err(Error::InvalidMetadata { .. })
        ));
    }

    #[test]
    fn pin_orders_past_the_row_limit_are_rejected() {
        let meta: NodeMetadata = serde_json::from_str(&format!(
            r#"{{"pins": {{"out": {{"y": {{"order": {}}}}}}}}}"#,
            usize::MAX
        ))
        .expect("metadata");
        assert!(matches!(
            meta.validate(),
            Err(Error::InvalidMetadata { .. })
        ));

        let mut meta = NodeMetadata::default();
        meta.pins.inputs.insert(
            "a".into(),
            PinMetadata {
                order: MAX_PIN_ORDER,
                ..Default::default()
            },
        );
        assert!(meta.validate().is_ok());
    }
}
