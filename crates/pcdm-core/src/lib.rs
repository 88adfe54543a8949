//! PCDM Core - Membership and relation graphs for object aggregation
//!
//! This crate provides the node model, the kind registry, the containment
//! and related-object graphs, and the aggregation service that validates
//! node kinds before mutating either graph. Persistence is reached through
//! the [`NodeStore`] trait and lives in other crates.

pub mod config;
pub mod error;
pub mod membership;
pub mod node;
pub mod registry;
pub mod relation;
pub mod service;
pub mod store;

pub use config::{DuplicatePolicy, GraphConfig, ParentPolicy};
pub use error::{Error, GraphError, GraphResult, Result};
pub use membership::{MembershipEdge, MembershipGraph};
pub use node::{Kind, Node, NodeId, NodeModel, TypedNode, COLLECTION_MODEL, FILE_MODEL, OBJECT_MODEL};
pub use registry::TypeRegistry;
pub use relation::{RelationEdge, RelationGraph};
pub use service::{AggregationService, GraphSnapshot};
pub use store::{CascadeReport, DeletionNotifier, NodeStore};
