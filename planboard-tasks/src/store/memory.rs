//! In-memory record store

use std::collections::HashMap;

use async_trait::async_trait;
use planboard_fields::Scope;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::{ChangeKind, ChangeNotice, Notifier, RecordStore};
use crate::error::{Result, TaskError};
use crate::types::{Task, TaskId};

#[derive(Debug, Default)]
struct MemoryState {
    tasks: HashMap<TaskId, Task>,
    /// Last number handed out per scope
    counters: HashMap<Scope, u64>,
}

/// Record store that keeps everything in process memory.
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    notifier: Notifier,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            notifier: Notifier::new(),
        }
    }

    /// Number of stored tasks across all scopes
    pub async fn len(&self) -> usize {
        self.state.read().await.tasks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.tasks.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_tasks(&self, scope: &Scope) -> Result<Vec<Task>> {
        let state = self.state.read().await;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|t| &t.scope == scope)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.task_number);
        Ok(tasks)
    }

    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>> {
        Ok(self.state.read().await.tasks.get(id).cloned())
    }

    async fn upsert_task(&self, task: &Task) -> Result<Task> {
        self.state
            .write()
            .await
            .tasks
            .insert(task.id, task.clone());
        debug!(id = %task.id, scope = %task.scope, "task stored");
        self.notifier
            .notify(&task.scope, ChangeKind::Upserted { id: task.id });
        Ok(task.clone())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<Task> {
        let removed = self
            .state
            .write()
            .await
            .tasks
            .remove(id)
            .ok_or_else(|| TaskError::not_found("task", id))?;
        debug!(id = %id, scope = %removed.scope, "task deleted");
        self.notifier
            .notify(&removed.scope, ChangeKind::Deleted { id: *id });
        Ok(removed)
    }

    async fn replace_tasks(&self, tasks: &[Task]) -> Result<()> {
        {
            let mut state = self.state.write().await;
            for task in tasks {
                state.tasks.insert(task.id, task.clone());
            }
        }
        debug!(count = tasks.len(), "task batch stored");
        self.notifier.notify_batch(tasks);
        Ok(())
    }

    async fn allocate_task_number(&self, scope: &Scope) -> Result<u64> {
        let mut state = self.state.write().await;
        let counter = state.counters.entry(scope.clone()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeNotice> {
        self.notifier.subscribe()
    }
}
