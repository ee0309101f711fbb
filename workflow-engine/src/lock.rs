//! Per-instance locking. `spec.md` §5 models workflow-instance mutation as
//! serialized per instance, the same row-level guarantee the original gets
//! from `select_for_update()`. Since this engine has no database row to
//! lock, it keeps one `tokio::sync::Mutex` per `WorkflowInstanceId` in a
//! registry shaped like `atomic-api`'s websocket connection table.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use workflow_model::WorkflowInstanceId;

#[derive(Default)]
pub struct InstanceLocks {
    locks: RwLock<HashMap<WorkflowInstanceId, Arc<Mutex<()>>>>,
}

impl InstanceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    async fn lock_for(&self, id: WorkflowInstanceId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(&id) {
            return lock.clone();
        }
        let mut locks = self.locks.write().await;
        locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire the lock for `id`, holding it until the returned guard drops.
    /// Callers must drop the guard (end of the mutating call) before
    /// publishing any outbox events, so publication never happens while the
    /// instance is locked.
    pub async fn acquire(&self, id: WorkflowInstanceId) -> OwnedMutexGuard<()> {
        let lock = self.lock_for(id).await;
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_instance_id_serializes_through_the_same_lock() {
        let locks = Arc::new(InstanceLocks::new());
        let id = WorkflowInstanceId(1);

        let guard = locks.acquire(id).await;
        let locks2 = locks.clone();
        let handle = tokio::spawn(async move {
            let _guard2 = locks2.acquire(id).await;
        });

        tokio::task::yield_now().await;
        assert!(!handle.is_finished());
        drop(guard);
        handle.await.unwrap();
    }
}
