//! Record store contract and implementations.
//!
//! The store is the persistence collaborator: it keeps whole task records and
//! hands out task numbers. It does no validation; commands validate before
//! they write.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use planboard_fields::Scope;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::error::Result;
use crate::types::{Task, TaskId};

/// Capacity of the change notice channel. Slow subscribers see `Lagged`
/// and should simply re-fetch.
pub const NOTICE_CAPACITY: usize = 64;

/// What changed. Subscribers re-fetch; the payload is only a hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ChangeKind {
    Upserted { id: TaskId },
    Deleted { id: TaskId },
    Replaced { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotice {
    pub scope: Scope,
    #[serde(flatten)]
    pub kind: ChangeKind,
}

/// Storage abstraction for task records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All tasks of a scope ordered by task number
    async fn fetch_tasks(&self, scope: &Scope) -> Result<Vec<Task>>;

    /// Get a task by id
    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>>;

    /// Insert or overwrite a task (last write wins)
    async fn upsert_task(&self, task: &Task) -> Result<Task>;

    /// Delete a task, returning the removed record
    async fn delete_task(&self, id: &TaskId) -> Result<Task>;

    /// Overwrite several tasks as one all-or-nothing batch
    async fn replace_tasks(&self, tasks: &[Task]) -> Result<()>;

    /// Next task number of a scope. Monotonic, never reused after deletion.
    async fn allocate_task_number(&self, scope: &Scope) -> Result<u64>;

    /// Receive a notice after every committed change
    fn subscribe(&self) -> broadcast::Receiver<ChangeNotice>;
}

/// Sending side of the change notice channel shared by the stores.
#[derive(Debug, Clone)]
pub(crate) struct Notifier {
    tx: broadcast::Sender<ChangeNotice>,
}

impl Notifier {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTICE_CAPACITY);
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<ChangeNotice> {
        self.tx.subscribe()
    }

    pub(crate) fn notify(&self, scope: &Scope, kind: ChangeKind) {
        // No receivers is not an error
        let receivers = self
            .tx
            .send(ChangeNotice {
                scope: scope.clone(),
                kind,
            })
            .unwrap_or(0);
        trace!(scope = %scope, receivers, "change notice sent");
    }

    /// One notice per distinct scope touched by a batch.
    pub(crate) fn notify_batch(&self, tasks: &[Task]) {
        let mut scopes: Vec<&Scope> = Vec::new();
        for task in tasks {
            if !scopes.contains(&&task.scope) {
                scopes.push(&task.scope);
            }
        }
        for scope in scopes {
            let count = tasks.iter().filter(|t| &t.scope == scope).count();
            self.notify(scope, ChangeKind::Replaced { count });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_wire_shape() {
        let notice = ChangeNotice {
            scope: Scope::project("apollo"),
            kind: ChangeKind::Replaced { count: 2 },
        };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["kind"], "replaced");
        assert_eq!(json["count"], 2);
    }

    #[tokio::test]
    async fn notify_without_subscribers_is_silent() {
        let notifier = Notifier::new();
        notifier.notify(&Scope::Global, ChangeKind::Replaced { count: 0 });

        let mut rx = notifier.subscribe();
        notifier.notify(&Scope::Global, ChangeKind::Replaced { count: 1 });
        assert_eq!(rx.recv().await.unwrap().kind, ChangeKind::Replaced { count: 1 });
    }
}
