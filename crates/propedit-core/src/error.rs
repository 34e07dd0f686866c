use thiserror::Error;

use crate::node::NodeId;

/// Failures surfaced by a node edit commit.
///
/// Malformed field text never reaches this type: it is recovered locally by
/// falling back to the previously stored value.
#[derive(Error, Debug)]
pub enum EditError {
    #[error("Node {0} not found in the layout database")]
    NodeNotFound(NodeId),

    #[error("Edit of node {node} rejected: {reason}")]
    Rejected { node: NodeId, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EditError>;
