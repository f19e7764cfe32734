use crate::{EdgeId, NodeId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown node handle: {id}")]
    UnknownNode { id: NodeId },

    #[error("unknown edge handle: {id}")]
    UnknownEdge { id: EdgeId },

    #[error("no node named {name:?} in the scene")]
    UnknownNodeName { name: String },

    #[error("a node named {name:?} already exists")]
    DuplicateNode { name: String },

    #[error("invalid node metadata: {message}")]
    InvalidMetadata { message: String },

    #[error("scene JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("scene YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
