//! DeleteTask command

use async_trait::async_trait;
use tracing::info;

use crate::command::Execute;
use crate::context::TaskContext;
use crate::error::Result;
use crate::types::{Task, TaskId};

/// Hard-delete a task. Its custom property values live on the record and go
/// with it.
#[derive(Debug, Clone)]
pub struct DeleteTask {
    pub id: TaskId,
}

impl DeleteTask {
    pub fn new(id: TaskId) -> Self {
        Self { id }
    }
}

#[async_trait]
impl Execute for DeleteTask {
    type Output = Task;

    async fn execute(&self, ctx: &TaskContext) -> Result<Task> {
        let task = ctx.store().delete_task(&self.id).await?;
        info!(
            scope = %task.scope,
            id = %task.id,
            values = task.custom_properties.len(),
            "task deleted"
        );
        Ok(task)
    }
}
