//! Error types for PCDM Core

use crate::node::{Kind, NodeId};
use thiserror::Error;

/// Result type alias using the service Error
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for graph component operations
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Invariant violations raised by the membership and relation graphs
///
/// Every variant is a local validation failure. A call that returns one of
/// these has left the graph untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("parent must be a pcdm collection or object: {id} is {kind}")]
    InvalidParentKind { id: NodeId, kind: Kind },

    #[error("child must be a pcdm object or file: {id} is {kind}")]
    InvalidChildKind { id: NodeId, kind: Kind },

    #[error("related object must be a pcdm object: {id} is {kind}")]
    InvalidRelationEndpoint { id: NodeId, kind: Kind },

    #[error("object cannot be related to itself: {0}")]
    SelfRelation(NodeId),

    #[error("membership cycle: {child} is {parent} or one of its ancestors")]
    CycleDetected { parent: NodeId, child: NodeId },

    #[error("edge already exists: {from} -> {to}")]
    DuplicateEdge { from: NodeId, to: NodeId },

    #[error("edge not found: {from} -> {to}")]
    EdgeNotFound { from: NodeId, to: NodeId },

    #[error("{child} is already a member of {parent}")]
    AlreadyContained { parent: NodeId, child: NodeId },

    #[error("position {position} is taken twice under {parent}")]
    DuplicatePosition { parent: NodeId, position: u64 },
}

/// Aggregation service error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The graph invariant behind this error, if any
    pub fn graph_error(&self) -> Option<&GraphError> {
        match self {
            Self::Graph(e) => Some(e),
            _ => None,
        }
    }
}
