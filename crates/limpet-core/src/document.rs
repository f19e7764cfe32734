//! Serialized scene description: configuration, nodes with stored metadata, and bindings.

use crate::config::SceneConfig;
use crate::error::Result;
use crate::metadata::NodeMetadata;
use crate::model::{Binding, StaticModel};
use crate::node::NodeKind;
use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDocument {
    pub config: Value,
    pub nodes: Vec<NodeDocument>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDocument {
    pub name: String,
    pub kind: NodeKind,
    pub metadata: NodeMetadata,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<Binding>,
}

/// A loaded document: the scene with edges already rebuilt, its model, and its config.
#[derive(Debug, Clone)]
pub struct LoadedScene {
    pub scene: Scene,
    pub model: StaticModel,
    pub config: SceneConfig,
}

impl SceneDocument {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Picks JSON when the first non-blank character opens an object, YAML otherwise.
    pub fn from_str_auto(text: &str) -> Result<Self> {
        if text.trim_start().starts_with('{') {
            Self::from_json_str(text)
        } else {
            Self::from_yaml_str(text)
        }
    }

    pub fn build(&self) -> Result<LoadedScene> {
        let mut scene = Scene::new();
        let mut model = StaticModel::new();
        for node in &self.nodes {
            scene.add_node(node.name.clone(), node.kind, &node.metadata)?;
            for binding in &node.bindings {
                model.push(node.name.clone(), binding.clone());
            }
        }
        scene.rebuild_edges(&model);

        let config = match &self.config {
            Value::Null => SceneConfig::empty_object(),
            other => SceneConfig::from_value(other.clone()),
        };
        Ok(LoadedScene {
            scene,
            model,
            config,
        })
    }
}
