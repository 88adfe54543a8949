//! In-memory storage backend for testing

use crate::error::{StorageError, StorageResult};
use crate::notify::Subscribers;
use crate::traits::NodeRepository;
use async_trait::async_trait;
use pcdm_core::{CascadeReport, DeletionNotifier, GraphSnapshot, Node, NodeId, NodeStore};
use std::collections::HashMap;
use std::sync::{RwLock, Weak};

/// In-memory storage backend
///
/// Useful for testing and temporary storage.
pub struct MemoryStore {
    nodes: RwLock<HashMap<NodeId, Node>>,
    snapshot: RwLock<GraphSnapshot>,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            snapshot: RwLock::new(GraphSnapshot::default()),
            subscribers: Subscribers::new(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeRepository for MemoryStore {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }

    async fn save_node(&self, node: &Node) -> StorageResult<()> {
        let mut nodes = self
            .nodes
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        nodes.insert(node.id, node.clone());
        Ok(())
    }

    async fn get_node(&self, id: &NodeId) -> StorageResult<Option<Node>> {
        let nodes = self
            .nodes
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(nodes.get(id).cloned())
    }

    async fn list_nodes(&self) -> StorageResult<Vec<Node>> {
        let nodes = self
            .nodes
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        let mut all: Vec<Node> = nodes.values().cloned().collect();
        all.sort_by_key(|n| n.id);
        Ok(all)
    }

    async fn delete_node(&self, id: &NodeId) -> StorageResult<Vec<CascadeReport>> {
        {
            let mut nodes = self
                .nodes
                .write()
                .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
            if nodes.remove(id).is_none() {
                return Err(StorageError::NodeNotFound(*id));
            }
        }
        self.subscribers.notify(*id)
    }

    fn subscribe(&self, notifier: Weak<dyn DeletionNotifier>) -> StorageResult<()> {
        self.subscribers.add(notifier)
    }

    async fn save_snapshot(&self, snapshot: &GraphSnapshot) -> StorageResult<()> {
        let mut stored = self
            .snapshot
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        *stored = snapshot.clone();
        Ok(())
    }

    async fn load_snapshot(&self) -> StorageResult<GraphSnapshot> {
        let stored = self
            .snapshot
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(stored.clone())
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    async fn resolve(&self, id: &NodeId) -> pcdm_core::Result<Node> {
        self.get_node(id)
            .await?
            .ok_or(pcdm_core::Error::NodeNotFound(*id))
    }
}
