//! GetTask command

use async_trait::async_trait;

use crate::command::Execute;
use crate::context::TaskContext;
use crate::error::Result;
use crate::types::{Task, TaskId};

/// Get a task by id
#[derive(Debug, Clone)]
pub struct GetTask {
    pub id: TaskId,
}

impl GetTask {
    pub fn new(id: TaskId) -> Self {
        Self { id }
    }
}

#[async_trait]
impl Execute for GetTask {
    type Output = Task;

    async fn execute(&self, ctx: &TaskContext) -> Result<Task> {
        ctx.read_task(&self.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::task::CreateTask;
    use crate::types::NewTask;
    use planboard_fields::Scope;

    #[tokio::test]
    async fn test_get_task() {
        let ctx = TaskContext::in_memory();
        let created = CreateTask::new(Scope::Global, NewTask::new("Book venue"))
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(GetTask::new(created.id).execute(&ctx).await.unwrap(), created);

        let err = GetTask::new(TaskId::new()).execute(&ctx).await.unwrap_err();
        assert!(matches!(err, TaskError::NotFound { .. }));
    }
}
