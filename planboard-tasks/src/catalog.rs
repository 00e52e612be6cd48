//! Category catalog for tags and labels.
//!
//! Creating a category and selecting it are separate steps: `create` returns
//! an id, and the caller then adds the category to a task with a patch built
//! by [`Category::select_for`].

use async_trait::async_trait;
use planboard_fields::FieldError;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Result, TaskError};
use crate::types::{CategoryId, Task, TaskPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Tag,
    Label,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub kind: CategoryKind,
    pub name: String,
}

impl Category {
    /// Patch that adds this category to the task's tags or labels.
    pub fn select_for(&self, task: &Task) -> TaskPatch {
        let current = match self.kind {
            CategoryKind::Tag => &task.tags,
            CategoryKind::Label => &task.labels,
        };
        let mut selected = current.clone();
        if !selected.contains(&self.name) {
            selected.push(self.name.clone());
        }
        match self.kind {
            CategoryKind::Tag => TaskPatch::new().with_tags(selected),
            CategoryKind::Label => TaskPatch::new().with_labels(selected),
        }
    }
}

/// Shared registry of tag and label names, injected where forms need it
#[async_trait]
pub trait CategoryCatalog: Send + Sync {
    /// Create a category, or return the id of an existing one whose name
    /// matches case-insensitively
    async fn create(&self, kind: CategoryKind, name: &str) -> Result<CategoryId>;

    async fn get(&self, id: &CategoryId) -> Result<Option<Category>>;

    /// Categories of a kind in creation order
    async fn list(&self, kind: CategoryKind) -> Result<Vec<Category>>;
}

/// In-process catalog
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    categories: RwLock<Vec<Category>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryCatalog for InMemoryCatalog {
    async fn create(&self, kind: CategoryKind, name: &str) -> Result<CategoryId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TaskError::Validation(vec![FieldError::new(
                "name",
                "cannot be empty",
            )]));
        }

        let mut categories = self.categories.write().await;
        let existing = categories
            .iter()
            .find(|c| c.kind == kind && c.name.to_lowercase() == name.to_lowercase());
        if let Some(existing) = existing {
            return Ok(existing.id);
        }

        let category = Category {
            id: CategoryId::new(),
            kind,
            name: name.to_string(),
        };
        debug!(id = %category.id, ?kind, name, "category created");
        let id = category.id;
        categories.push(category);
        Ok(id)
    }

    async fn get(&self, id: &CategoryId) -> Result<Option<Category>> {
        Ok(self
            .categories
            .read()
            .await
            .iter()
            .find(|c| &c.id == id)
            .cloned())
    }

    async fn list(&self, kind: CategoryKind) -> Result<Vec<Category>> {
        Ok(self
            .categories
            .read()
            .await
            .iter()
            .filter(|c| c.kind == kind)
            .cloned()
            .collect())
    }
}
