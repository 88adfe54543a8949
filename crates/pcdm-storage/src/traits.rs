//! Storage backend trait definitions

use crate::error::StorageResult;
use async_trait::async_trait;
use pcdm_core::{CascadeReport, DeletionNotifier, GraphSnapshot, Node, NodeId};
use std::sync::Weak;

/// Trait for node repository implementations
///
/// A repository owns node records and the persisted edge snapshot. Every
/// repository also implements [`pcdm_core::NodeStore`] so an
/// `AggregationService` can resolve ids through it.
#[async_trait]
pub trait NodeRepository: Send + Sync {
    /// Initialize the storage (create tables, etc.)
    async fn initialize(&self) -> StorageResult<()>;

    /// Health check
    async fn health_check(&self) -> StorageResult<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Node Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Save a node, replacing any record with the same id
    async fn save_node(&self, node: &Node) -> StorageResult<()>;

    /// Get a node by id
    async fn get_node(&self, id: &NodeId) -> StorageResult<Option<Node>>;

    /// Get all nodes, oldest first
    async fn list_nodes(&self) -> StorageResult<Vec<Node>>;

    /// Delete a node and notify subscribers so edges to it are dropped
    async fn delete_node(&self, id: &NodeId) -> StorageResult<Vec<CascadeReport>>;

    /// Register a deletion subscriber
    ///
    /// Subscribers are held weakly; dropped ones are pruned on the next
    /// deletion.
    fn subscribe(&self, notifier: Weak<dyn DeletionNotifier>) -> StorageResult<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Edge Snapshot
    // ─────────────────────────────────────────────────────────────────────────

    /// Persist the edge snapshot (replaces the previous one)
    async fn save_snapshot(&self, snapshot: &GraphSnapshot) -> StorageResult<()>;

    /// Load the edge snapshot; empty if none was saved
    async fn load_snapshot(&self) -> StorageResult<GraphSnapshot>;
}
