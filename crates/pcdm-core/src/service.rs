//! Aggregation service: validate node kinds, then mutate the graphs

use crate::config::GraphConfig;
use crate::error::{Error, Result};
use crate::membership::{MembershipEdge, MembershipGraph};
use crate::node::{Kind, NodeId, TypedNode};
use crate::registry::TypeRegistry;
use crate::relation::{RelationEdge, RelationGraph};
use crate::store::{CascadeReport, DeletionNotifier, NodeStore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Serializable export of both edge sets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub members: Vec<MembershipEdge>,
    #[serde(default)]
    pub related: Vec<RelationEdge>,
}

impl GraphSnapshot {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.related.is_empty()
    }
}

struct GraphState {
    membership: MembershipGraph,
    relations: RelationGraph,
    /// Nodes reported destroyed; never re-attached
    ///
    /// Grows by one id per deletion seen during the service's lifetime and
    /// is never cleared, not even by `restore`. A long-lived service that
    /// sees many deletions holds all of their ids.
    destroyed: HashSet<NodeId>,
}

impl GraphState {
    fn new(config: GraphConfig) -> Self {
        Self {
            membership: MembershipGraph::new(config.parent_policy),
            relations: RelationGraph::new(config.related_duplicates),
            destroyed: HashSet::new(),
        }
    }

    fn ensure_live(&self, ids: &[NodeId]) -> Result<()> {
        match ids.iter().find(|id| self.destroyed.contains(id)) {
            Some(id) => Err(Error::NodeNotFound(*id)),
            None => Ok(()),
        }
    }
}

/// Entry point for membership and related-object operations
///
/// Node ids are resolved through the [`NodeStore`] and classified with the
/// [`TypeRegistry`] before the lock is taken. Both graphs share one lock, so
/// cycle checks and the insertion they guard are atomic, and a cascade
/// removes membership and relation edges in one step.
pub struct AggregationService {
    store: Arc<dyn NodeStore>,
    registry: TypeRegistry,
    config: GraphConfig,
    state: RwLock<GraphState>,
}

impl AggregationService {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self::with_config(store, GraphConfig::default())
    }

    pub fn with_config(store: Arc<dyn NodeStore>, config: GraphConfig) -> Self {
        Self {
            store,
            registry: TypeRegistry::new(),
            config,
            state: RwLock::new(GraphState::new(config)),
        }
    }

    /// Replace the type registry
    pub fn with_registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> GraphConfig {
        self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, GraphState>> {
        self.state
            .read()
            .map_err(|e| Error::Internal(format!("Lock error: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, GraphState>> {
        self.state
            .write()
            .map_err(|e| Error::Internal(format!("Lock error: {}", e)))
    }

    async fn typed(&self, id: &NodeId) -> Result<TypedNode> {
        let node = self.store.resolve(id).await?;
        Ok(TypedNode::new(node.id, self.registry.classify(&node)))
    }

    /// Resolve and classify a node
    pub async fn classify(&self, id: &NodeId) -> Result<Kind> {
        Ok(self.typed(id).await?.kind)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Membership
    // ─────────────────────────────────────────────────────────────────────────

    /// Append `child` to the members of `parent`
    pub async fn add_member(&self, parent: &NodeId, child: &NodeId) -> Result<MembershipEdge> {
        tracing::debug!("add_member: {} -> {}", parent, child);
        let parent = self.typed(parent).await?;
        let child = self.typed(child).await?;

        let mut state = self.write()?;
        state.ensure_live(&[parent.id, child.id])?;
        let edge = state.membership.add_member(parent, child)?;

        tracing::info!(
            "Added {} {} to {} {} at position {}",
            child.kind,
            child.id,
            parent.kind,
            parent.id,
            edge.position
        );
        Ok(edge)
    }

    pub async fn remove_member(&self, parent: &NodeId, child: &NodeId) -> Result<MembershipEdge> {
        tracing::debug!("remove_member: {} -> {}", parent, child);
        let parent = self.typed(parent).await?;
        let child = self.typed(child).await?;

        let edge = self.write()?.membership.remove_member(parent.id, child.id)?;
        tracing::info!("Removed {} from {}", child.id, parent.id);
        Ok(edge)
    }

    /// Members of `parent` by insertion position
    pub fn list_members(&self, parent: &NodeId) -> Result<Vec<NodeId>> {
        Ok(self.read()?.membership.list_children(*parent))
    }

    /// Object members of `parent`
    pub fn list_member_objects(&self, parent: &NodeId) -> Result<Vec<NodeId>> {
        Ok(self.read()?.membership.list_children_of_kind(*parent, Kind::Object))
    }

    /// File members of `parent`
    pub fn list_member_files(&self, parent: &NodeId) -> Result<Vec<NodeId>> {
        Ok(self.read()?.membership.list_children_of_kind(*parent, Kind::File))
    }

    /// Membership edges under `parent`, positions included
    pub fn member_edges(&self, parent: &NodeId) -> Result<Vec<MembershipEdge>> {
        Ok(self.read()?.membership.edges_of(*parent).to_vec())
    }

    pub fn list_parents(&self, child: &NodeId) -> Result<HashSet<NodeId>> {
        Ok(self.read()?.membership.list_parents(*child))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Related objects
    // ─────────────────────────────────────────────────────────────────────────

    /// Relate `source` to `target`
    ///
    /// Returns `false` if the edge already existed and duplicates are ignored.
    pub async fn add_related(&self, source: &NodeId, target: &NodeId) -> Result<bool> {
        tracing::debug!("add_related: {} -> {}", source, target);
        let source = self.typed(source).await?;
        let target = self.typed(target).await?;

        let mut state = self.write()?;
        state.ensure_live(&[source.id, target.id])?;
        let added = state.relations.add_related(source, target)?;

        if added {
            tracing::info!("Related object {} to {}", target.id, source.id);
        } else {
            tracing::debug!("Related object {} already on {}", target.id, source.id);
        }
        Ok(added)
    }

    pub async fn remove_related(&self, source: &NodeId, target: &NodeId) -> Result<RelationEdge> {
        tracing::debug!("remove_related: {} -> {}", source, target);
        let source = self.typed(source).await?;
        let target = self.typed(target).await?;

        let edge = self.write()?.relations.remove_related(source.id, target.id)?;
        tracing::info!("Removed related object {} from {}", target.id, source.id);
        Ok(edge)
    }

    /// Objects related from `source`, in insertion order
    pub fn list_related(&self, source: &NodeId) -> Result<Vec<NodeId>> {
        Ok(self.read()?.relations.list_related(*source))
    }

    /// Objects that relate to `target`
    pub fn list_related_by(&self, target: &NodeId) -> Result<HashSet<NodeId>> {
        Ok(self.read()?.relations.list_related_by(*target))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Snapshots
    // ─────────────────────────────────────────────────────────────────────────

    /// Export every edge; members are ordered by parent then position
    pub fn snapshot(&self) -> Result<GraphSnapshot> {
        let state = self.read()?;
        let mut members: Vec<MembershipEdge> = state.membership.edges().copied().collect();
        members.sort_by(|a, b| a.parent.cmp(&b.parent).then(a.position.cmp(&b.position)));
        let related = state.relations.edges().collect();
        Ok(GraphSnapshot { members, related })
    }

    /// Replace all edges with the contents of a snapshot
    ///
    /// Edges touching a node already reported destroyed are dropped. The
    /// rest is validated in full before anything is swapped in; the parent
    /// policy is left out of that validation and only applies to later
    /// `add_member` calls.
    pub fn restore(&self, snapshot: GraphSnapshot) -> Result<()> {
        let mut state = self.write()?;
        let live = |id: &NodeId| !state.destroyed.contains(id);

        let members: Vec<MembershipEdge> = snapshot
            .members
            .into_iter()
            .filter(|e| live(&e.parent) && live(&e.child))
            .collect();
        let related: Vec<RelationEdge> = snapshot
            .related
            .into_iter()
            .filter(|e| live(&e.source) && live(&e.target))
            .collect();
        let (member_count, related_count) = (members.len(), related.len());

        let membership = MembershipGraph::from_edges(self.config.parent_policy, members)?;
        let relations = RelationGraph::from_edges(self.config.related_duplicates, related)?;
        state.membership = membership;
        state.relations = relations;

        tracing::debug!(
            "Restored {} membership and {} relation edges",
            member_count,
            related_count
        );
        Ok(())
    }
}

impl DeletionNotifier for AggregationService {
    fn node_destroyed(&self, id: NodeId) -> Result<CascadeReport> {
        let mut state = self.write()?;
        state.destroyed.insert(id);
        let report = CascadeReport {
            node: id,
            members: state.membership.remove_node(id),
            related: state.relations.remove_node(id),
        };

        if !report.is_empty() {
            tracing::warn!(
                "Node {} destroyed; removed {} membership and {} relation edges",
                id,
                report.members.len(),
                report.related.len()
            );
        }
        Ok(report)
    }
}
