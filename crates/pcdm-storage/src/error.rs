//! Storage error types

use pcdm_core::NodeId;
use thiserror::Error;

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage-specific error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("{} deletion notifier(s) failed for {node}: {}", .errors.len(), join(.errors))]
    Cascade {
        node: NodeId,
        errors: Vec<pcdm_core::Error>,
    },

    #[error("Migration error: {0}")]
    Migration(String),

    #[cfg(feature = "redb")]
    #[error("ReDB error: {0}")]
    Redb(#[from] ::redb::Error),

    #[cfg(feature = "redb")]
    #[error("ReDB database error: {0}")]
    RedbDatabase(#[from] ::redb::DatabaseError),

    #[cfg(feature = "redb")]
    #[error("ReDB table error: {0}")]
    RedbTable(#[from] ::redb::TableError),

    #[cfg(feature = "redb")]
    #[error("ReDB storage error: {0}")]
    RedbStorage(#[from] ::redb::StorageError),

    #[cfg(feature = "redb")]
    #[error("ReDB commit error: {0}")]
    RedbCommit(#[from] ::redb::CommitError),

    #[cfg(feature = "redb")]
    #[error("ReDB transaction error: {0}")]
    RedbTransaction(#[from] ::redb::TransactionError),
}

impl From<StorageError> for pcdm_core::Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NodeNotFound(id) => pcdm_core::Error::NodeNotFound(id),
            StorageError::Cascade { mut errors, .. } if errors.len() == 1 => errors.remove(0),
            other => pcdm_core::Error::Storage(other.to_string()),
        }
    }
}

fn join(errors: &[pcdm_core::Error]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
