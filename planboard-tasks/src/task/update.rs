//! UpdateTask command

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use super::ensure_valid;
use crate::command::Execute;
use crate::context::TaskContext;
use crate::error::Result;
use crate::types::{Task, TaskId, TaskPatch};

/// Apply a partial update to a task.
///
/// The merged task is validated as a whole, so a patch that leaves an
/// invalid field untouched still fails.
#[derive(Debug, Clone)]
pub struct UpdateTask {
    pub id: TaskId,
    pub patch: TaskPatch,
}

impl UpdateTask {
    pub fn new(id: TaskId, patch: TaskPatch) -> Self {
        Self { id, patch }
    }
}

#[async_trait]
impl Execute for UpdateTask {
    type Output = Task;

    async fn execute(&self, ctx: &TaskContext) -> Result<Task> {
        let registry = ctx.registry().await;
        let mut task = ctx.read_task(&self.id).await?;

        self.patch.apply(&mut task);
        task.updated_at = Utc::now();

        let definitions = registry.list(&task.scope);
        ensure_valid(ctx.validator().validate(&task, &definitions))?;

        let task = ctx.store().upsert_task(&task).await?;
        info!(scope = %task.scope, id = %task.id, "task updated");
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::task::CreateTask;
    use crate::types::{NewTask, PriorityLevel, Status, TaskPriority, Urgency};
    use planboard_fields::Scope;

    async fn setup() -> (TaskContext, Task) {
        let ctx = TaskContext::in_memory();
        let task = CreateTask::new(Scope::project("apollo"), NewTask::new("Design homepage"))
            .execute(&ctx)
            .await
            .unwrap();
        (ctx, task)
    }

    #[tokio::test]
    async fn test_update_task_fields() {
        let (ctx, task) = setup().await;
        let patch = TaskPatch::new()
            .with_title("Design landing page")
            .with_status(Status::InProgress)
            .with_team(Some("Web".into()));

        let updated = UpdateTask::new(task.id, patch).execute(&ctx).await.unwrap();
        assert_eq!(updated.title, "Design landing page");
        assert_eq!(updated.status, Status::InProgress);
        assert_eq!(updated.assigned_team.as_deref(), Some("Web"));
        assert_eq!(updated.task_number, task.task_number);
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at >= task.updated_at);
    }

    #[tokio::test]
    async fn test_update_normalizes_legacy_priority() {
        let (ctx, task) = setup().await;
        let updated = UpdateTask::new(task.id, TaskPatch::new().with_priority(Urgency::High))
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(updated.priority, TaskPriority::Level(PriorityLevel::P1));
    }

    #[tokio::test]
    async fn test_update_validates_merged_result() {
        let (ctx, task) = setup().await;

        // Simulate a record that became invalid outside the commands
        let mut stored = task.clone();
        stored.supporting_links = vec!["not-a-url".into()];
        ctx.store().upsert_task(&stored).await.unwrap();

        let err = UpdateTask::new(task.id, TaskPatch::new().with_title("Design homepage v2"))
            .execute(&ctx)
            .await
            .unwrap_err();
        let fields: Vec<&str> = err
            .field_errors()
            .unwrap()
            .iter()
            .map(|e| e.field.as_str())
            .collect();
        assert_eq!(fields, vec!["supporting_links[0]"]);
        assert_eq!(ctx.read_task(&task.id).await.unwrap().title, "Design homepage");
    }

    #[tokio::test]
    async fn test_update_rejects_global_status_on_project_task() {
        let (ctx, task) = setup().await;
        let err = UpdateTask::new(task.id, TaskPatch::new().with_status(Status::OnHold))
            .execute(&ctx)
            .await
            .unwrap_err();
        assert_eq!(err.field_errors().unwrap()[0].field, "status");
    }

    #[tokio::test]
    async fn test_update_missing_task() {
        let ctx = TaskContext::in_memory();
        let err = UpdateTask::new(TaskId::new(), TaskPatch::new())
            .execute(&ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::NotFound { .. }));
    }
}
