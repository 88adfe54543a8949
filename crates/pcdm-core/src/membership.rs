//! Containment edges between collections, objects and files

use crate::config::ParentPolicy;
use crate::error::{GraphError, GraphResult};
use crate::node::{Kind, NodeId, TypedNode};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A parent contains a child at a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipEdge {
    pub parent: NodeId,
    pub child: NodeId,
    /// Kind of the child when it was added
    pub child_kind: Kind,
    /// Insertion order under the parent; sparse after removals
    pub position: u64,
}

/// Parent -> child containment graph
///
/// The graph is acyclic: a node can never end up among its own members,
/// directly or transitively. Edges under a parent are kept sorted by
/// position, and since new edges always get the highest position the
/// per-parent list is append-only apart from removals.
#[derive(Debug, Clone, Default)]
pub struct MembershipGraph {
    policy: ParentPolicy,
    children: HashMap<NodeId, Vec<MembershipEdge>>,
    parents: HashMap<NodeId, HashSet<NodeId>>,
}

impl MembershipGraph {
    pub fn new(policy: ParentPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Rebuild a graph from previously exported edges, keeping positions
    ///
    /// Kinds, cycles, duplicate edges and duplicate positions are checked.
    /// The parent policy is not: it only governs new insertions, so edges
    /// saved under `Multiple` still load after switching to `Single`.
    pub fn from_edges(
        policy: ParentPolicy,
        edges: impl IntoIterator<Item = MembershipEdge>,
    ) -> GraphResult<Self> {
        let mut graph = Self::new(policy);
        for edge in edges {
            if !edge.child_kind.can_be_member() {
                return Err(GraphError::InvalidChildKind {
                    id: edge.child,
                    kind: edge.child_kind,
                });
            }
            graph.check_acyclic_and_new(edge.parent, edge.child)?;

            let list = graph.children.entry(edge.parent).or_default();
            let at = list.partition_point(|e| e.position < edge.position);
            if list.get(at).is_some_and(|e| e.position == edge.position) {
                return Err(GraphError::DuplicatePosition {
                    parent: edge.parent,
                    position: edge.position,
                });
            }
            list.insert(at, edge);
            graph.parents.entry(edge.child).or_default().insert(edge.parent);
        }
        Ok(graph)
    }

    pub fn policy(&self) -> ParentPolicy {
        self.policy
    }

    /// Add `child` as the last member of `parent`
    pub fn add_member(&mut self, parent: TypedNode, child: TypedNode) -> GraphResult<MembershipEdge> {
        if !parent.kind.can_contain() {
            return Err(GraphError::InvalidParentKind {
                id: parent.id,
                kind: parent.kind,
            });
        }
        if !child.kind.can_be_member() {
            return Err(GraphError::InvalidChildKind {
                id: child.id,
                kind: child.kind,
            });
        }
        self.check_insert(parent.id, child.id)?;

        let list = self.children.entry(parent.id).or_default();
        let position = list.last().map(|e| e.position + 1).unwrap_or(1);
        let edge = MembershipEdge {
            parent: parent.id,
            child: child.id,
            child_kind: child.kind,
            position,
        };
        list.push(edge);
        self.parents.entry(child.id).or_default().insert(parent.id);

        tracing::debug!("Added member {} -> {} at position {}", parent.id, child.id, position);
        Ok(edge)
    }

    /// Cycle, duplicate and parent-policy checks shared by insertions
    fn check_insert(&self, parent: NodeId, child: NodeId) -> GraphResult<()> {
        self.check_acyclic_and_new(parent, child)?;
        if self.policy == ParentPolicy::Single {
            if let Some(existing) = self.parents.get(&child).and_then(|p| p.iter().next()) {
                return Err(GraphError::AlreadyContained {
                    parent: *existing,
                    child,
                });
            }
        }
        Ok(())
    }

    fn check_acyclic_and_new(&self, parent: NodeId, child: NodeId) -> GraphResult<()> {
        if parent == child || self.reaches(child, parent) {
            return Err(GraphError::CycleDetected { parent, child });
        }
        if self.contains(parent, child) {
            return Err(GraphError::DuplicateEdge {
                from: parent,
                to: child,
            });
        }
        Ok(())
    }

    /// Depth-first search from `from` along membership edges for `target`
    fn reaches(&self, from: NodeId, target: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![from];

        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(edges) = self.children.get(&current) {
                stack.extend(
                    edges
                        .iter()
                        .map(|e| e.child)
                        .filter(|c| !visited.contains(c)),
                );
            }
        }
        false
    }

    /// Remove the edge `parent -> child`; other positions are left as they are
    pub fn remove_member(&mut self, parent: NodeId, child: NodeId) -> GraphResult<MembershipEdge> {
        let not_found = GraphError::EdgeNotFound {
            from: parent,
            to: child,
        };
        let list = self.children.get_mut(&parent).ok_or(not_found.clone())?;
        let index = list.iter().position(|e| e.child == child).ok_or(not_found)?;
        let edge = list.remove(index);
        if list.is_empty() {
            self.children.remove(&parent);
        }
        self.unlink_parent(child, parent);

        tracing::debug!("Removed member {} -> {}", parent, child);
        Ok(edge)
    }

    /// Drop every edge where `id` is parent or child
    pub fn remove_node(&mut self, id: NodeId) -> Vec<MembershipEdge> {
        let mut removed = Vec::new();

        if let Some(edges) = self.children.remove(&id) {
            for edge in &edges {
                self.unlink_parent(edge.child, id);
            }
            removed.extend(edges);
        }

        if let Some(parents) = self.parents.remove(&id) {
            for parent in parents {
                if let Some(list) = self.children.get_mut(&parent) {
                    if let Some(index) = list.iter().position(|e| e.child == id) {
                        removed.push(list.remove(index));
                    }
                    if list.is_empty() {
                        self.children.remove(&parent);
                    }
                }
            }
        }

        removed
    }

    fn unlink_parent(&mut self, child: NodeId, parent: NodeId) {
        if let Some(set) = self.parents.get_mut(&child) {
            set.remove(&parent);
            if set.is_empty() {
                self.parents.remove(&child);
            }
        }
    }

    pub fn contains(&self, parent: NodeId, child: NodeId) -> bool {
        self.children
            .get(&parent)
            .map(|edges| edges.iter().any(|e| e.child == child))
            .unwrap_or(false)
    }

    /// Members of `parent` by ascending position
    pub fn list_children(&self, parent: NodeId) -> Vec<NodeId> {
        self.edges_of(parent).iter().map(|e| e.child).collect()
    }

    /// Members of `parent` with the given kind, by ascending position
    pub fn list_children_of_kind(&self, parent: NodeId, kind: Kind) -> Vec<NodeId> {
        self.edges_of(parent)
            .iter()
            .filter(|e| e.child_kind == kind)
            .map(|e| e.child)
            .collect()
    }

    pub fn list_parents(&self, child: NodeId) -> HashSet<NodeId> {
        self.parents.get(&child).cloned().unwrap_or_default()
    }

    pub fn edges_of(&self, parent: NodeId) -> &[MembershipEdge] {
        self.children.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All edges, grouped by parent
    pub fn edges(&self) -> impl Iterator<Item = &MembershipEdge> {
        self.children.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.children.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
