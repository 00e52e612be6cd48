//! Live task feed for one scope.
//!
//! Keeps the latest fetched task set and re-fetches on change notices. Every
//! refresh takes a generation number; a fetch that finishes after a newer one
//! has started is discarded, so a slow stale fetch never overwrites fresher
//! data.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use planboard_fields::Scope;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::Result;
use crate::query::{query_tasks, Directory, TaskQuery};
use crate::store::RecordStore;
use crate::task::TaskGroups;
use crate::types::Task;

#[derive(Debug, Default)]
struct Snapshot {
    generation: u64,
    tasks: Arc<Vec<Task>>,
}

pub struct TaskFeed {
    store: Arc<dyn RecordStore>,
    scope: Scope,
    generation: AtomicU64,
    snapshot: RwLock<Snapshot>,
}

impl TaskFeed {
    /// An empty feed; call [`refresh`](Self::refresh) or [`spawn`](Self::spawn) to fill it.
    pub fn new(store: Arc<dyn RecordStore>, scope: Scope) -> Arc<Self> {
        Arc::new(Self {
            store,
            scope,
            generation: AtomicU64::new(0),
            snapshot: RwLock::new(Snapshot::default()),
        })
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Start a refresh and return its generation. Supersedes earlier ones.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Install a fetched task set unless a newer refresh has started.
    ///
    /// Returns whether the tasks were installed.
    pub async fn publish(&self, generation: u64, tasks: Vec<Task>) -> bool {
        let mut snapshot = self.snapshot.write().await;
        let latest = self.generation.load(Ordering::SeqCst);
        if generation != latest || generation <= snapshot.generation {
            debug!(scope = %self.scope, generation, latest, "superseded fetch discarded");
            return false;
        }
        snapshot.generation = generation;
        snapshot.tasks = Arc::new(tasks);
        debug!(scope = %self.scope, generation, tasks = snapshot.tasks.len(), "feed refreshed");
        true
    }

    /// Fetch the scope and install the result unless superseded.
    pub async fn refresh(&self) -> Result<bool> {
        let generation = self.begin();
        let tasks = self.store.fetch_tasks(&self.scope).await?;
        Ok(self.publish(generation, tasks).await)
    }

    /// The latest installed task set
    pub async fn tasks(&self) -> Arc<Vec<Task>> {
        Arc::clone(&self.snapshot.read().await.tasks)
    }

    /// Generation of the installed task set, 0 before the first refresh
    pub async fn generation(&self) -> u64 {
        self.snapshot.read().await.generation
    }

    /// Run the query engine over the latest task set
    pub async fn query(&self, query: &TaskQuery, directory: &Directory) -> TaskGroups {
        let tasks = self.tasks().await;
        query_tasks(&tasks, query, directory)
            .into_iter()
            .map(|(label, bucket)| (label, bucket.into_iter().cloned().collect()))
            .collect()
    }

    /// Refresh now and again after every change notice for this scope.
    ///
    /// The task ends when the store's notice channel closes.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let feed = Arc::clone(self);
        let mut notices = feed.store.subscribe();
        tokio::spawn(async move {
            if let Err(e) = feed.refresh().await {
                warn!(scope = %feed.scope, %e, "initial feed refresh failed");
            }
            loop {
                match notices.recv().await {
                    Ok(notice) if notice.scope != feed.scope => continue,
                    Ok(_) => {}
                    Err(RecvError::Lagged(missed)) => {
                        debug!(scope = %feed.scope, missed, "feed lagged; refreshing");
                    }
                    Err(RecvError::Closed) => {
                        debug!(scope = %feed.scope, "change notices closed");
                        break;
                    }
                }
                if let Err(e) = feed.refresh().await {
                    warn!(scope = %feed.scope, %e, "feed refresh failed");
                }
            }
        })
    }
}
