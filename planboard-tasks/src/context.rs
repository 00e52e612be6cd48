//! TaskContext - access to the record store, property registry and settings
//!
//! The context provides access, not logic. Commands do all the work.

use std::path::Path;
use std::sync::Arc;

use planboard_fields::{PropertyRegistry, ValueCodec};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

use crate::config::PlanboardConfig;
use crate::error::{Result, TaskError};
use crate::store::{FileStore, MemoryStore, RecordStore};
use crate::types::{Task, TaskId};
use crate::validate::TaskValidator;

/// Directory under `data_dir` holding property definitions
pub const PROPERTIES_DIR: &str = "properties";

/// Context passed to every command
pub struct TaskContext {
    store: Arc<dyn RecordStore>,
    /// Writers to custom property values hold the read side while they
    /// validate and write; a cascading delete holds the write side.
    registry: RwLock<PropertyRegistry>,
    config: PlanboardConfig,
    codec: ValueCodec,
    validator: TaskValidator,
}

impl TaskContext {
    pub fn new(
        store: Arc<dyn RecordStore>,
        registry: PropertyRegistry,
        config: PlanboardConfig,
    ) -> Self {
        Self {
            store,
            registry: RwLock::new(registry),
            codec: config.codec(),
            validator: config.validator(),
            config,
        }
    }

    /// A context with an in-memory store and registry and default settings
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            PropertyRegistry::in_memory(),
            PlanboardConfig::default(),
        )
    }

    /// Open a context for `config`.
    ///
    /// With a `data_dir` the store and registry are file-backed under it,
    /// otherwise both live in memory.
    pub async fn open(config: PlanboardConfig) -> Result<Self> {
        let Some(data_dir) = config.data_dir.clone() else {
            return Ok(Self::new(
                Arc::new(MemoryStore::new()),
                PropertyRegistry::in_memory(),
                config,
            ));
        };
        Self::open_dir(&data_dir, config).await
    }

    async fn open_dir(data_dir: &Path, config: PlanboardConfig) -> Result<Self> {
        let store = FileStore::open(data_dir).await?;
        let registry = PropertyRegistry::open(data_dir.join(PROPERTIES_DIR))
            .build()
            .await?;
        info!(
            data_dir = %data_dir.display(),
            properties = registry.len(),
            "task context opened"
        );
        Ok(Self::new(Arc::new(store), registry, config))
    }

    // =========================================================================
    // Access
    // =========================================================================

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub async fn registry(&self) -> RwLockReadGuard<'_, PropertyRegistry> {
        self.registry.read().await
    }

    pub async fn registry_mut(&self) -> RwLockWriteGuard<'_, PropertyRegistry> {
        self.registry.write().await
    }

    pub fn config(&self) -> &PlanboardConfig {
        &self.config
    }

    pub fn codec(&self) -> &ValueCodec {
        &self.codec
    }

    pub fn validator(&self) -> &TaskValidator {
        &self.validator
    }

    /// Read a task, failing with `NotFound` when it doesn't exist
    pub async fn read_task(&self, id: &TaskId) -> Result<Task> {
        self.store
            .get_task(id)
            .await?
            .ok_or_else(|| TaskError::not_found("task", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planboard_fields::{CodecMode, NewProperty, PropertyType, Scope};
    use tempfile::TempDir;

    #[tokio::test]
    async fn open_without_data_dir_is_in_memory() {
        let ctx = TaskContext::open(PlanboardConfig::default()).await.unwrap();
        assert!(ctx.registry().await.root().is_none());
        assert!(matches!(
            ctx.read_task(&TaskId::new()).await,
            Err(TaskError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn open_with_data_dir_persists_registry() {
        let temp = TempDir::new().unwrap();
        let config = PlanboardConfig {
            data_dir: Some(temp.path().to_path_buf()),
            codec_mode: CodecMode::Strict,
            ..PlanboardConfig::default()
        };
        {
            let ctx = TaskContext::open(config.clone()).await.unwrap();
            assert_eq!(ctx.codec().mode(), CodecMode::Strict);
            ctx.registry_mut()
                .await
                .create(Scope::Global, NewProperty::new("Estimate", PropertyType::Number))
                .await
                .unwrap();
        }
        let ctx = TaskContext::open(config).await.unwrap();
        assert!(ctx
            .registry()
            .await
            .get_by_name(&Scope::Global, "Estimate")
            .is_some());
        assert!(temp.path().join(PROPERTIES_DIR).is_dir());
        assert!(temp.path().join("tasks").is_dir());
    }
}
