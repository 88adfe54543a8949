//! PCDM Storage - Node stores for the aggregation core
//!
//! This crate provides the persistence side of the aggregation core: node
//! records, the saved edge snapshot, and deletion notifications that let an
//! `AggregationService` cascade-remove edges.

#![allow(clippy::result_large_err)]

pub mod error;
pub mod memory;
pub mod migration;
pub mod notify;
pub mod traits;

#[cfg(feature = "redb")]
pub mod redb;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use migration::{Migratable, SchemaVersion, CURRENT_VERSION, SCHEMA_VERSIONS};
pub use notify::Subscribers;
pub use traits::NodeRepository;

#[cfg(feature = "redb")]
pub use redb::RedbStore;
