//! ReDB storage backend

use crate::error::{StorageError, StorageResult};
use crate::migration::{Migratable, SchemaVersion};
use crate::notify::Subscribers;
use crate::traits::NodeRepository;
use async_trait::async_trait;
use pcdm_core::{CascadeReport, DeletionNotifier, GraphSnapshot, Node, NodeId, NodeStore};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::{Mutex, Weak};

// Table definitions
const NODES: TableDefinition<&str, &[u8]> = TableDefinition::new("nodes");
const EDGES: TableDefinition<&str, &[u8]> = TableDefinition::new("edges");
const META: TableDefinition<&str, u32> = TableDefinition::new("meta");

const SNAPSHOT_KEY: &str = "snapshot";
const SCHEMA_VERSION_KEY: &str = "schema_version";

/// ReDB storage backend
pub struct RedbStore {
    db: Mutex<Database>,
    subscribers: Subscribers,
}

impl RedbStore {
    /// Open or create a ReDB database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;

        // Initialize tables
        {
            let write_txn = db.begin_write()?;
            {
                write_txn.open_table(NODES)?;
                write_txn.open_table(EDGES)?;
                write_txn.open_table(META)?;
            }
            write_txn.commit()?;
        }

        let store = Self {
            db: Mutex::new(db),
            subscribers: Subscribers::new(),
        };
        store.migrate_to_latest()?;
        Ok(store)
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))
    }
}

#[async_trait]
impl NodeRepository for RedbStore {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let db = self.lock()?;
        let read_txn = db.begin_read()?;
        read_txn.open_table(META)?;
        Ok(true)
    }

    async fn save_node(&self, node: &Node) -> StorageResult<()> {
        let key = node.id.to_string();
        let value = serde_json::to_vec(node)?;

        let db = self.lock()?;
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(NODES)?;
            table.insert(key.as_str(), value.as_slice())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    async fn get_node(&self, id: &NodeId) -> StorageResult<Option<Node>> {
        let key = id.to_string();

        let db = self.lock()?;
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(NODES)?;

        if let Some(value) = table.get(key.as_str())? {
            let node: Node = serde_json::from_slice(value.value())?;
            Ok(Some(node))
        } else {
            Ok(None)
        }
    }

    async fn list_nodes(&self) -> StorageResult<Vec<Node>> {
        let db = self.lock()?;
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(NODES)?;

        // ULID keys sort by creation time
        let mut nodes = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let node: Node = serde_json::from_slice(value.value())?;
            nodes.push(node);
        }

        Ok(nodes)
    }

    async fn delete_node(&self, id: &NodeId) -> StorageResult<Vec<CascadeReport>> {
        let key = id.to_string();

        {
            let db = self.lock()?;
            let write_txn = db.begin_write()?;
            let existed = {
                let mut table = write_txn.open_table(NODES)?;
                let removed = table.remove(key.as_str())?;
                removed.is_some()
            };
            if !existed {
                write_txn.abort()?;
                return Err(StorageError::NodeNotFound(*id));
            }
            write_txn.commit()?;
        }

        tracing::debug!("Deleted node {}", id);
        self.subscribers.notify(*id)
    }

    fn subscribe(&self, notifier: Weak<dyn DeletionNotifier>) -> StorageResult<()> {
        self.subscribers.add(notifier)
    }

    async fn save_snapshot(&self, snapshot: &GraphSnapshot) -> StorageResult<()> {
        let value = serde_json::to_vec(snapshot)?;

        let db = self.lock()?;
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(EDGES)?;
            table.insert(SNAPSHOT_KEY, value.as_slice())?;
        }
        write_txn.commit()?;

        tracing::debug!(
            "Saved snapshot with {} membership and {} relation edges",
            snapshot.members.len(),
            snapshot.related.len()
        );
        Ok(())
    }

    async fn load_snapshot(&self) -> StorageResult<GraphSnapshot> {
        let db = self.lock()?;
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(EDGES)?;

        match table.get(SNAPSHOT_KEY)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Ok(GraphSnapshot::default()),
        }
    }
}

#[async_trait]
impl NodeStore for RedbStore {
    async fn resolve(&self, id: &NodeId) -> pcdm_core::Result<Node> {
        self.get_node(id)
            .await?
            .ok_or(pcdm_core::Error::NodeNotFound(*id))
    }
}

impl Migratable for RedbStore {
    fn get_schema_version(&self) -> StorageResult<u32> {
        let db = self.lock()?;
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(META)?;
        let version = table.get(SCHEMA_VERSION_KEY)?.map(|v| v.value());
        Ok(version.unwrap_or(0))
    }

    fn set_schema_version(&self, version: u32) -> StorageResult<()> {
        let db = self.lock()?;
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(META)?;
            table.insert(SCHEMA_VERSION_KEY, version)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn run_migration(&self, step: &SchemaVersion) -> StorageResult<()> {
        match step.version {
            // tables are created on open
            1 => Ok(()),
            other => Err(StorageError::Migration(format!(
                "redb store has no migration for version {}",
                other
            ))),
        }
    }
}
