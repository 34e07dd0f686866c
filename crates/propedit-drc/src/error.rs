use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Technology '{0}' has no design rules")]
    UnknownTechnology(String),

    #[error("Layer {layer} out of range ({count} layers)")]
    LayerOutOfRange { layer: usize, count: usize },

    #[error("Node {node} out of range ({count} nodes)")]
    NodeOutOfRange { node: usize, count: usize },

    #[error("Rules for '{technology}' rejected: {reason}")]
    Rejected { technology: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RuleError>;
