//! Shared Connectivity Handle
//!
//! A cloneable handle for hosts that sync from one thread and query from
//! others. Syncs take the write lock, so readers never see a half-built
//! snapshot.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::manager::{ConnectivityManager, SyncOutcome};
use super::ConnectivityError;
use crate::project::{DrawingState, ProjectSnapshot};

#[derive(Debug, Clone, Default)]
pub struct SharedConnectivity {
    inner: Arc<RwLock<ConnectivityManager>>,
}

impl SharedConnectivity {
    pub fn new(manager: ConnectivityManager) -> Self {
        Self {
            inner: Arc::new(RwLock::new(manager)),
        }
    }

    pub fn sync(&self, project: &ProjectSnapshot) -> Result<SyncOutcome, ConnectivityError> {
        self.write().sync(project)
    }

    pub fn sync_from_state(&self, state: DrawingState<'_>) -> Result<SyncOutcome, ConnectivityError> {
        self.write().sync_from_state(state)
    }

    pub fn mark_dirty(&self) {
        self.write().mark_dirty();
    }

    /// Run `f` against the current snapshot under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&ConnectivityManager) -> R) -> R {
        let guard = self.read_guard();
        f(&*guard)
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, ConnectivityManager> {
        // A panicked writer never commits a partial snapshot
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ConnectivityManager> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{PointId, Stroke};
    use std::thread;

    #[test]
    fn test_readers_see_committed_snapshot() {
        let shared = SharedConnectivity::default();
        let mut project = ProjectSnapshot::new();
        project.add_stroke(Stroke::via("v1", 1, 0.0, 0.0));
        project.add_stroke(Stroke::via("v2", 2, 5.0, 0.0));
        project.add_stroke(Stroke::trace("t1", &[(1, 0.0, 0.0), (2, 5.0, 0.0)]));
        shared.sync(&project).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let reader = shared.clone();
                thread::spawn(move || reader.read(|m| m.net_for_node(PointId(2)).len()))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }
    }

    #[test]
    fn test_mark_dirty_through_handle() {
        let shared = SharedConnectivity::default();
        shared.sync(&ProjectSnapshot::new()).unwrap();
        assert!(!shared.read(|m| m.is_dirty()));
        shared.mark_dirty();
        assert!(shared.read(|m| m.is_dirty()));
    }
}
