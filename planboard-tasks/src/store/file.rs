//! YAML file record store
//!
//! ```text
//! <root>/
//! ├── tasks/
//! │   └── {id}.yaml      # one task per file
//! └── counters.yaml      # last task number per scope key
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use planboard_fields::Scope;
use tokio::fs;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};
use ulid::Ulid;

use super::{ChangeKind, ChangeNotice, Notifier, RecordStore};
use crate::error::{Result, TaskError};
use crate::types::{Task, TaskId};

/// File-per-task store under a root directory.
pub struct FileStore {
    root: PathBuf,
    /// Serializes writers; readers go straight to disk
    write_lock: Mutex<()>,
    notifier: Notifier,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directories as needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("tasks")).await?;
        info!(root = %root.display(), "file store opened");
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
            notifier: Notifier::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn tasks_dir(&self) -> PathBuf {
        self.root.join("tasks")
    }

    fn task_path(&self, id: &TaskId) -> PathBuf {
        self.tasks_dir().join(format!("{id}.yaml"))
    }

    fn counters_path(&self) -> PathBuf {
        self.root.join("counters.yaml")
    }

    async fn read_task(&self, path: &Path) -> Result<Task> {
        let content = fs::read_to_string(path).await?;
        Ok(serde_yaml_ng::from_str(&content)?)
    }

    async fn read_counters(&self) -> Result<BTreeMap<String, u64>> {
        match fs::read_to_string(self.counters_path()).await {
            Ok(content) => Ok(serde_yaml_ng::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn fetch_tasks(&self, scope: &Scope) -> Result<Vec<Task>> {
        let mut tasks = Vec::new();
        let mut entries = fs::read_dir(self.tasks_dir()).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            match self.read_task(&path).await {
                Ok(task) if &task.scope == scope => tasks.push(task),
                Ok(_) => {}
                Err(e) => warn!(?path, %e, "skipping unreadable task file"),
            }
        }
        tasks.sort_by_key(|t| t.task_number);
        Ok(tasks)
    }

    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>> {
        match self.read_task(&self.task_path(id)).await {
            Ok(task) => Ok(Some(task)),
            Err(TaskError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn upsert_task(&self, task: &Task) -> Result<Task> {
        let _guard = self.write_lock.lock().await;
        let yaml = serde_yaml_ng::to_string(task)?;
        atomic_write(&self.task_path(&task.id), yaml.as_bytes()).await?;
        debug!(id = %task.id, scope = %task.scope, "task written");
        self.notifier
            .notify(&task.scope, ChangeKind::Upserted { id: task.id });
        Ok(task.clone())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<Task> {
        let _guard = self.write_lock.lock().await;
        let path = self.task_path(id);
        let task = match self.read_task(&path).await {
            Ok(task) => task,
            Err(TaskError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TaskError::not_found("task", id));
            }
            Err(e) => return Err(e),
        };
        fs::remove_file(&path).await?;
        debug!(id = %id, scope = %task.scope, "task file removed");
        self.notifier.notify(&task.scope, ChangeKind::Deleted { id: *id });
        Ok(task)
    }

    /// Every task is serialized and staged before any file is replaced. The
    /// current files are then moved aside while the staged ones take their
    /// place. A failure at any step restores the moved-aside files and removes
    /// the staged ones, leaving the store as it was.
    async fn replace_tasks(&self, tasks: &[Task]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let dir = self.tasks_dir();

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(tasks.len());
        for task in tasks {
            let tmp = dir.join(format!(".tmp_{}", Ulid::new()));
            let written = match serde_yaml_ng::to_string(task) {
                Ok(yaml) => fs::write(&tmp, yaml.as_bytes()).await.map_err(TaskError::from),
                Err(e) => Err(e.into()),
            };
            if let Err(e) = written {
                let _ = fs::remove_file(&tmp).await;
                discard_staged(&staged).await;
                return Err(TaskError::store(format!("batch not committed: {e}")));
            }
            staged.push((tmp, self.task_path(&task.id)));
        }

        let mut commit = BatchCommit::default();
        if let Err(e) = commit.apply(&staged).await {
            commit.roll_back().await;
            discard_staged(&staged).await;
            return Err(TaskError::store(format!("batch not committed: {e}")));
        }
        commit.finish().await;

        debug!(count = tasks.len(), "task batch written");
        self.notifier.notify_batch(tasks);
        Ok(())
    }

    async fn allocate_task_number(&self, scope: &Scope) -> Result<u64> {
        let _guard = self.write_lock.lock().await;
        let mut counters = self.read_counters().await?;
        let counter = counters.entry(scope.key()).or_insert(0);
        *counter += 1;
        let number = *counter;
        let yaml = serde_yaml_ng::to_string(&counters)?;
        atomic_write(&self.counters_path(), yaml.as_bytes()).await?;
        Ok(number)
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeNotice> {
        self.notifier.subscribe()
    }
}

/// Progress of a batch commit, kept so a failed commit can be undone.
#[derive(Default)]
struct BatchCommit {
    /// (backup, original path) of every file moved aside
    backups: Vec<(PathBuf, PathBuf)>,
    placed: Vec<PathBuf>,
}

impl BatchCommit {
    async fn apply(&mut self, staged: &[(PathBuf, PathBuf)]) -> Result<()> {
        for (_, path) in staged {
            match fs::symlink_metadata(path).await {
                Ok(meta) if meta.is_file() => {
                    let backup = path.with_file_name(format!(".bak_{}", Ulid::new()));
                    fs::rename(path, &backup).await?;
                    self.backups.push((backup, path.clone()));
                }
                Ok(_) => {
                    return Err(TaskError::store(format!(
                        "{} is not a task file",
                        path.display()
                    )));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        for (tmp, path) in staged {
            fs::rename(tmp, path).await?;
            self.placed.push(path.clone());
        }
        Ok(())
    }

    async fn roll_back(&self) {
        for path in &self.placed {
            let _ = fs::remove_file(path).await;
        }
        for (backup, path) in &self.backups {
            if let Err(e) = fs::rename(backup, path).await {
                error!(?backup, ?path, %e, "could not restore task file");
            }
        }
    }

    async fn finish(&self) {
        for (backup, _) in &self.backups {
            if let Err(e) = fs::remove_file(backup).await {
                warn!(?backup, %e, "could not remove task backup");
            }
        }
    }
}

async fn discard_staged(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        let _ = fs::remove_file(tmp).await;
    }
}

/// Write to a temp file then rename for atomic persistence.
async fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| TaskError::store(format!("no parent dir for {}", path.display())))?;
    let tmp = dir.join(format!(".tmp_{}", Ulid::new()));
    fs::write(&tmp, data).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
