//! Schema versions for persistent node stores
//!
//! A store records the version it was last written with. Opening it walks
//! [`SCHEMA_VERSIONS`] from that version up to [`CURRENT_VERSION`], one step
//! at a time, recording each step as it completes.

use crate::error::{StorageError, StorageResult};

/// One step in the schema history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaVersion {
    pub version: u32,
    pub description: &'static str,
}

/// Every schema version, oldest first, without gaps
pub const SCHEMA_VERSIONS: &[SchemaVersion] = &[SchemaVersion {
    version: 1,
    description: "node records keyed by id, edge snapshot under one key",
}];

/// Version written by this build
pub const CURRENT_VERSION: u32 = 1;

/// Steps needed to bring a store at `current` up to `target`
pub fn pending(current: u32, target: u32) -> StorageResult<&'static [SchemaVersion]> {
    if current > target {
        return Err(StorageError::Migration(format!(
            "store is at schema version {} but this build only knows up to {}",
            current, target
        )));
    }
    if target != 0 && !SCHEMA_VERSIONS.iter().any(|s| s.version == target) {
        return Err(StorageError::Migration(format!("unknown schema version {}", target)));
    }
    let start = SCHEMA_VERSIONS.partition_point(|s| s.version <= current);
    let end = SCHEMA_VERSIONS.partition_point(|s| s.version <= target);
    Ok(&SCHEMA_VERSIONS[start..end])
}

/// Backends that track a schema version
pub trait Migratable {
    /// Recorded version, 0 for a fresh store
    fn get_schema_version(&self) -> StorageResult<u32>;

    fn set_schema_version(&self, version: u32) -> StorageResult<()>;

    /// Apply a single step; the version is recorded afterwards
    fn run_migration(&self, step: &SchemaVersion) -> StorageResult<()>;

    fn migrate_to(&self, target: u32) -> StorageResult<()> {
        let current = self.get_schema_version()?;
        let steps = pending(current, target)?;
        if steps.is_empty() {
            tracing::debug!("Schema already at version {}", current);
            return Ok(());
        }

        for step in steps {
            tracing::info!("Migrating schema to v{}: {}", step.version, step.description);
            self.run_migration(step)?;
            self.set_schema_version(step.version)?;
        }
        Ok(())
    }

    fn migrate_to_latest(&self) -> StorageResult<()> {
        self.migrate_to(CURRENT_VERSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Versioned {
        version: Mutex<u32>,
        applied: Mutex<Vec<u32>>,
    }

    impl Versioned {
        fn at(version: u32) -> Self {
            Self {
                version: Mutex::new(version),
                applied: Mutex::new(Vec::new()),
            }
        }
    }

    impl Migratable for Versioned {
        fn get_schema_version(&self) -> StorageResult<u32> {
            Ok(*self.version.lock().unwrap())
        }

        fn set_schema_version(&self, version: u32) -> StorageResult<()> {
            *self.version.lock().unwrap() = version;
            Ok(())
        }

        fn run_migration(&self, step: &SchemaVersion) -> StorageResult<()> {
            self.applied.lock().unwrap().push(step.version);
            Ok(())
        }
    }

    #[test]
    fn test_history_ends_at_current() {
        assert_eq!(SCHEMA_VERSIONS.last().unwrap().version, CURRENT_VERSION);
        for (i, step) in SCHEMA_VERSIONS.iter().enumerate() {
            assert_eq!(step.version, i as u32 + 1);
        }
    }

    #[test]
    fn test_migrate_fresh_store() {
        let store = Versioned::at(0);
        store.migrate_to_latest().unwrap();
        store.migrate_to_latest().unwrap();

        assert_eq!(store.get_schema_version().unwrap(), CURRENT_VERSION);
        assert_eq!(*store.applied.lock().unwrap(), vec![1]);
    }

    #[test]
    fn test_newer_store_is_refused() {
        let store = Versioned::at(CURRENT_VERSION + 1);
        assert!(matches!(
            store.migrate_to_latest(),
            Err(StorageError::Migration(_))
        ));
        assert!(store.applied.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_target() {
        assert!(pending(0, CURRENT_VERSION + 5).is_err());
        assert!(pending(CURRENT_VERSION, CURRENT_VERSION).unwrap().is_empty());
    }
}
