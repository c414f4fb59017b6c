//! Per-user mutual exclusion for read-modify-write sequences.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use escape_core::UserId;

/// Table of per-user async locks.
///
/// The table holds only weak references: an entry lives while some task
/// holds or awaits its lock, and dead entries are pruned on later calls.
#[derive(Default)]
pub struct UserLocks {
    table: Mutex<HashMap<UserId, Weak<AsyncMutex<()>>>>,
}

/// Exclusive access to one user's record until dropped.
pub struct UserGuard {
    _guard: OwnedMutexGuard<()>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`.
    pub async fn lock(&self, user_id: &UserId) -> UserGuard {
        let mutex = self.entry(user_id);
        UserGuard {
            _guard: mutex.lock_owned().await,
        }
    }

    fn entry(&self, user_id: &UserId) -> Arc<AsyncMutex<()>> {
        let mut table = self
            .table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(existing) = table.get(user_id).and_then(Weak::upgrade) {
            return existing;
        }

        table.retain(|_, weak| weak.strong_count() > 0);

        let mutex = Arc::new(AsyncMutex::new(()));
        table.insert(user_id.clone(), Arc::downgrade(&mutex));
        mutex
    }

    /// Number of entries currently in the table, live or not yet pruned.
    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
