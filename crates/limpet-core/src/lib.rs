#![forbid(unsafe_code)]

//! Scene model for limpet: node boxes, pins, edges, bindings and the metadata they persist.

pub mod config;
pub mod document;
pub mod edge;
pub mod error;
pub mod ids;
pub mod metadata;
pub mod model;
pub mod node;
pub mod pin;
pub mod scene;
pub mod text;

pub use config::{RenderConfig, SceneConfig};
pub use document::{LoadedScene, NodeDocument, SceneDocument};
pub use edge::{EdgeSpec, EdgeTarget, HeadKind};
pub use error::{Error, Result};
pub use ids::{EdgeId, NodeId};
pub use metadata::{NodeMetadata, PinMetadata, PinsMetadata};
pub use model::{Binding, ConnectionModel, StaticModel};
pub use node::{IconCache, NodeBox, NodeKind, PinAnchor};
pub use pin::{Pin, PinKey, PinSet, PinSide};
pub use scene::Scene;
pub use text::{DeterministicTextMeasurer, TextMeasurer, TextMetrics};
