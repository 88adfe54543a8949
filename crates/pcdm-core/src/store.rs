//! Collaborator interfaces to the persistence layer

use crate::error::Result;
use crate::membership::MembershipEdge;
use crate::node::{Node, NodeId};
use crate::relation::RelationEdge;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Resolves node ids to node records
///
/// Implemented by the persistence layer. The aggregation core never creates
/// or destroys nodes itself.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Fetch a node, failing with `Error::NodeNotFound` if it does not exist
    async fn resolve(&self, id: &NodeId) -> Result<Node>;
}

/// Receives notice that a node was destroyed so edges to it can be dropped
pub trait DeletionNotifier: Send + Sync {
    fn node_destroyed(&self, id: NodeId) -> Result<CascadeReport>;
}

/// Edges removed by a cascade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
    pub node: NodeId,
    pub members: Vec<MembershipEdge>,
    pub related: Vec<RelationEdge>,
}

impl CascadeReport {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.related.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.members.len() + self.related.len()
    }
}
