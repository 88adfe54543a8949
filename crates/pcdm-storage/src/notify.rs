//! Weak fan-out of node deletions

use crate::error::{StorageError, StorageResult};
use pcdm_core::{CascadeReport, DeletionNotifier, NodeId};
use std::sync::{RwLock, Weak};

/// Deletion subscribers shared by the storage backends
#[derive(Default)]
pub struct Subscribers {
    inner: RwLock<Vec<Weak<dyn DeletionNotifier>>>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, notifier: Weak<dyn DeletionNotifier>) -> StorageResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        inner.push(notifier);
        Ok(())
    }

    /// Tell every live subscriber that `id` is gone
    ///
    /// A failing subscriber does not stop the others. Failures are returned
    /// together once every subscriber has been told.
    pub fn notify(&self, id: NodeId) -> StorageResult<Vec<CascadeReport>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        inner.retain(|weak| weak.strong_count() > 0);

        let mut reports = Vec::new();
        let mut errors = Vec::new();
        for notifier in inner.iter().filter_map(Weak::upgrade) {
            match notifier.node_destroyed(id) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    tracing::error!("Deletion notifier failed for {}: {}", id, e);
                    errors.push(e);
                }
            }
        }

        tracing::debug!("Notified {} subscribers of deletion of {}", reports.len(), id);
        if errors.is_empty() {
            Ok(reports)
        } else {
            Err(StorageError::Cascade { node: id, errors })
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcdm_core::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl DeletionNotifier for Counting {
        fn node_destroyed(&self, id: NodeId) -> pcdm_core::Result<CascadeReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CascadeReport {
                node: id,
                members: Vec::new(),
                related: Vec::new(),
            })
        }
    }

    struct Failing;

    impl DeletionNotifier for Failing {
        fn node_destroyed(&self, _id: NodeId) -> pcdm_core::Result<CascadeReport> {
            Err(Error::Internal("Lock error: poisoned".to_string()))
        }
    }

    #[test]
    fn test_failure_does_not_skip_later_subscribers() {
        let subscribers = Subscribers::new();
        let failing: Arc<dyn DeletionNotifier> = Arc::new(Failing);
        let first = Arc::new(Counting::default());
        let second = Arc::new(Counting::default());
        let first_dyn: Arc<dyn DeletionNotifier> = first.clone();
        let second_dyn: Arc<dyn DeletionNotifier> = second.clone();

        subscribers.add(Arc::downgrade(&first_dyn)).unwrap();
        subscribers.add(Arc::downgrade(&failing)).unwrap();
        subscribers.add(Arc::downgrade(&second_dyn)).unwrap();

        let id = NodeId::new();
        let err = subscribers.notify(id).unwrap_err();
        assert!(matches!(&err, StorageError::Cascade { node, errors } if *node == id && errors.len() == 1));
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);

        let core: Error = err.into();
        assert!(matches!(core, Error::Internal(_)));
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let subscribers = Subscribers::new();
        let live: Arc<dyn DeletionNotifier> = Arc::new(Counting::default());
        {
            let gone: Arc<dyn DeletionNotifier> = Arc::new(Counting::default());
            subscribers.add(Arc::downgrade(&gone)).unwrap();
        }
        subscribers.add(Arc::downgrade(&live)).unwrap();

        assert_eq!(subscribers.notify(NodeId::new()).unwrap().len(), 1);
        assert_eq!(subscribers.len(), 1);
    }
}
