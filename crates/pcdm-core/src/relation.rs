//! Related-object edges between PCDM objects

use crate::config::DuplicatePolicy;
use crate::error::{GraphError, GraphResult};
use crate::node::{NodeId, TypedNode};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Source object is related to target object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationEdge {
    pub source: NodeId,
    pub target: NodeId,
}

/// Object -> related object graph
///
/// Edges are directed and carry no containment meaning, so `A -> B` and
/// `B -> A` may coexist. Only self relations are refused.
#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    duplicates: DuplicatePolicy,
    related: HashMap<NodeId, Vec<NodeId>>,
    referrers: HashMap<NodeId, HashSet<NodeId>>,
}

impl RelationGraph {
    pub fn new(duplicates: DuplicatePolicy) -> Self {
        Self {
            duplicates,
            ..Default::default()
        }
    }

    /// Rebuild from exported edges; iteration order becomes listing order
    ///
    /// A repeated edge is an error whatever the duplicate policy, since an
    /// export never contains one.
    pub fn from_edges(
        duplicates: DuplicatePolicy,
        edges: impl IntoIterator<Item = RelationEdge>,
    ) -> GraphResult<Self> {
        let mut graph = Self::new(duplicates);
        for edge in edges {
            if edge.source == edge.target {
                return Err(GraphError::SelfRelation(edge.source));
            }
            if graph.contains(edge.source, edge.target) {
                return Err(GraphError::DuplicateEdge {
                    from: edge.source,
                    to: edge.target,
                });
            }
            graph.link(edge);
        }
        Ok(graph)
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicates
    }

    /// Relate `source` to `target`
    ///
    /// Returns `false` when the edge already existed and the duplicate
    /// policy is `Ignore`.
    pub fn add_related(&mut self, source: TypedNode, target: TypedNode) -> GraphResult<bool> {
        for endpoint in [source, target] {
            if !endpoint.kind.can_relate() {
                return Err(GraphError::InvalidRelationEndpoint {
                    id: endpoint.id,
                    kind: endpoint.kind,
                });
            }
        }
        if source.id == target.id {
            return Err(GraphError::SelfRelation(source.id));
        }
        if self.contains(source.id, target.id) {
            return match self.duplicates {
                DuplicatePolicy::Reject => Err(GraphError::DuplicateEdge {
                    from: source.id,
                    to: target.id,
                }),
                DuplicatePolicy::Ignore => Ok(false),
            };
        }

        self.link(RelationEdge {
            source: source.id,
            target: target.id,
        });
        tracing::debug!("Related {} -> {}", source.id, target.id);
        Ok(true)
    }

    fn link(&mut self, edge: RelationEdge) {
        self.related.entry(edge.source).or_default().push(edge.target);
        self.referrers.entry(edge.target).or_default().insert(edge.source);
    }

    pub fn remove_related(&mut self, source: NodeId, target: NodeId) -> GraphResult<RelationEdge> {
        let not_found = GraphError::EdgeNotFound {
            from: source,
            to: target,
        };
        let targets = self.related.get_mut(&source).ok_or(not_found.clone())?;
        let index = targets.iter().position(|t| *t == target).ok_or(not_found)?;
        targets.remove(index);
        if targets.is_empty() {
            self.related.remove(&source);
        }
        self.unlink_referrer(target, source);

        tracing::debug!("Unrelated {} -> {}", source, target);
        Ok(RelationEdge { source, target })
    }

    /// Drop every edge where `id` is source or target
    pub fn remove_node(&mut self, id: NodeId) -> Vec<RelationEdge> {
        let mut removed = Vec::new();

        if let Some(targets) = self.related.remove(&id) {
            for target in targets {
                self.unlink_referrer(target, id);
                removed.push(RelationEdge { source: id, target });
            }
        }

        if let Some(sources) = self.referrers.remove(&id) {
            for source in sources {
                if let Some(targets) = self.related.get_mut(&source) {
                    targets.retain(|t| *t != id);
                    if targets.is_empty() {
                        self.related.remove(&source);
                    }
                }
                removed.push(RelationEdge { source, target: id });
            }
        }

        removed
    }

    fn unlink_referrer(&mut self, target: NodeId, source: NodeId) {
        if let Some(set) = self.referrers.get_mut(&target) {
            set.remove(&source);
            if set.is_empty() {
                self.referrers.remove(&target);
            }
        }
    }

    pub fn contains(&self, source: NodeId, target: NodeId) -> bool {
        self.related
            .get(&source)
            .map(|targets| targets.contains(&target))
            .unwrap_or(false)
    }

    /// Objects related from `source`, in insertion order
    pub fn list_related(&self, source: NodeId) -> Vec<NodeId> {
        self.related.get(&source).cloned().unwrap_or_default()
    }

    /// Objects that relate to `target`
    pub fn list_related_by(&self, target: NodeId) -> HashSet<NodeId> {
        self.referrers.get(&target).cloned().unwrap_or_default()
    }

    pub fn edges(&self) -> impl Iterator<Item = RelationEdge> + '_ {
        self.related.iter().flat_map(|(source, targets)| {
            targets.iter().map(move |target| RelationEdge {
                source: *source,
                target: *target,
            })
        })
    }

    pub fn len(&self) -> usize {
        self.related.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.related.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Kind;

    fn node(kind: Kind) -> TypedNode {
        TypedNode::new(NodeId::new(), kind)
    }

    #[test]
    fn test_related_in_insertion_order() {
        let mut graph = RelationGraph::default();
        let o1 = node(Kind::Object);
        let o2 = node(Kind::Object);
        let o3 = node(Kind::Object);

        assert!(graph.add_related(o1, o2).unwrap());
        assert!(graph.add_related(o1, o3).unwrap());

        assert_eq!(graph.list_related(o1.id), vec![o2.id, o3.id]);
        assert!(graph.list_related(o2.id).is_empty());
        assert!(graph.list_related_by(o2.id).contains(&o1.id));
    }

    #[test]
    fn test_only_objects_relate() {
        let mut graph = RelationGraph::default();
        let object = node(Kind::Object);

        for kind in [Kind::Collection, Kind::File, Kind::Other] {
            let bad = node(kind);
            assert_eq!(
                graph.add_related(object, bad),
                Err(GraphError::InvalidRelationEndpoint { id: bad.id, kind })
            );
            assert_eq!(
                graph.add_related(bad, object),
                Err(GraphError::InvalidRelationEndpoint { id: bad.id, kind })
            );
        }
        assert!(graph.is_empty());
    }

    #[test]
    fn test_self_relation() {
        let mut graph = RelationGraph::default();
        let object = node(Kind::Object);
        assert_eq!(
            graph.add_related(object, object),
            Err(GraphError::SelfRelation(object.id))
        );
    }

    #[test]
    fn test_duplicate_policies() {
        let o1 = node(Kind::Object);
        let o2 = node(Kind::Object);

        let mut strict = RelationGraph::new(DuplicatePolicy::Reject);
        strict.add_related(o1, o2).unwrap();
        assert!(matches!(
            strict.add_related(o1, o2),
            Err(GraphError::DuplicateEdge { .. })
        ));

        let mut lenient = RelationGraph::new(DuplicatePolicy::Ignore);
        assert!(lenient.add_related(o1, o2).unwrap());
        assert!(!lenient.add_related(o1, o2).unwrap());
        assert_eq!(lenient.list_related(o1.id), vec![o2.id]);
    }

    #[test]
    fn test_reverse_edge_allowed() {
        let mut graph = RelationGraph::default();
        let a = node(Kind::Object);
        let b = node(Kind::Object);

        graph.add_related(a, b).unwrap();
        graph.add_related(b, a).unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_remove_related() {
        let mut graph = RelationGraph::default();
        let a = node(Kind::Object);
        let b = node(Kind::Object);
        let c = node(Kind::Object);
        graph.add_related(a, b).unwrap();
        graph.add_related(a, c).unwrap();

        graph.remove_related(a.id, b.id).unwrap();
        assert_eq!(graph.list_related(a.id), vec![c.id]);
        assert!(graph.list_related_by(b.id).is_empty());

        assert!(matches!(
            graph.remove_related(a.id, b.id),
            Err(GraphError::EdgeNotFound { .. })
        ));
    }

    #[test]
    fn test_remove_node() {
        let mut graph = RelationGraph::default();
        let a = node(Kind::Object);
        let b = node(Kind::Object);
        let c = node(Kind::Object);
        graph.add_related(a, b).unwrap();
        graph.add_related(b, a).unwrap();
        graph.add_related(c, a).unwrap();
        graph.add_related(b, c).unwrap();

        let removed = graph.remove_node(a.id);
        assert_eq!(removed.len(), 3);
        assert_eq!(graph.list_related(b.id), vec![c.id]);
        assert!(graph.list_related(c.id).is_empty());
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_from_edges_rejects_repeated_edge() {
        let (a, b) = (NodeId::new(), NodeId::new());
        let edges = vec![
            RelationEdge { source: a, target: b },
            RelationEdge { source: b, target: a },
            RelationEdge { source: a, target: b },
        ];

        for policy in [DuplicatePolicy::Reject, DuplicatePolicy::Ignore] {
            assert_eq!(
                RelationGraph::from_edges(policy, edges.clone()).unwrap_err(),
                GraphError::DuplicateEdge { from: a, to: b }
            );
        }
        let graph = RelationGraph::from_edges(DuplicatePolicy::Reject, edges[..2].to_vec()).unwrap();
        assert_eq!(graph.len(), 2);
    }
}
