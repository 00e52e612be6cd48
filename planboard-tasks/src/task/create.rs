//! CreateTask command

use async_trait::async_trait;
use chrono::Utc;
use planboard_fields::{FieldError, Scope};
use tracing::info;

use super::{decode_property, ensure_valid};
use crate::command::Execute;
use crate::context::TaskContext;
use crate::error::Result;
use crate::types::{non_blank, unique_trimmed, NewTask, Status, Task, TaskId};
use crate::validate::property_field;

/// Create a task in a scope
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub scope: Scope,
    pub input: NewTask,
}

impl CreateTask {
    pub fn new(scope: Scope, input: NewTask) -> Self {
        Self { scope, input }
    }
}

#[async_trait]
impl Execute for CreateTask {
    type Output = Task;

    async fn execute(&self, ctx: &TaskContext) -> Result<Task> {
        let input = &self.input;
        let registry = ctx.registry().await;
        let definitions = registry.list(&self.scope);

        let priority = match input.priority {
            Some(priority) => priority.normalize_for(&self.scope),
            None => ctx.config().default_priority(&self.scope),
        };

        let now = Utc::now();
        let mut task = Task {
            id: TaskId::new(),
            scope: self.scope.clone(),
            task_number: 0,
            title: input.title.trim().to_string(),
            description: non_blank(input.description.as_deref()),
            status: input.status.unwrap_or(Status::Todo),
            priority,
            assigned_to: input.assigned_to.clone(),
            assigned_team: input.assigned_team.clone(),
            start_date: input.start_date,
            due_date: input.due_date,
            tags: unique_trimmed(&input.tags),
            labels: unique_trimmed(&input.labels),
            supporting_links: input
                .supporting_links
                .iter()
                .map(|l| l.trim().to_string())
                .collect(),
            custom_properties: Default::default(),
            recurrence: input.recurrence.clone(),
            created_at: now,
            updated_at: now,
        };

        let mut errors: Vec<FieldError> = Vec::new();
        for (id, raw) in &input.custom_properties {
            let Some(def) = registry.get(id).filter(|d| d.scope == self.scope) else {
                errors.push(FieldError::new(property_field(id), "unknown property"));
                continue;
            };
            match decode_property(ctx.codec(), def, raw, None) {
                Ok(value) => task.set_property(*id, value),
                Err(e) => errors.push(e),
            }
        }
        errors.extend(ctx.validator().validate(&task, &definitions));
        ensure_valid(errors)?;

        // Numbers are only consumed by tasks that are actually stored
        task.task_number = ctx.store().allocate_task_number(&self.scope).await?;
        let task = ctx.store().upsert_task(&task).await?;

        info!(
            scope = %task.scope,
            id = %task.id,
            task_number = task.task_number,
            "task created"
        );
        Ok(task)
    }
}
