//! SetPropertyValue command

use async_trait::async_trait;
use chrono::Utc;
use planboard_fields::{FieldError, PropertyId, PropertyValue, RawValue};
use tracing::debug;

use super::{decode_property, ensure_valid};
use crate::command::Execute;
use crate::context::TaskContext;
use crate::error::{Result, TaskError};
use crate::types::TaskId;
use crate::validate::property_field;

/// Decode raw input for one custom property and store it on a task.
///
/// Input the codec treats as unset removes the key.
#[derive(Debug, Clone)]
pub struct SetPropertyValue {
    pub task_id: TaskId,
    pub property_id: PropertyId,
    pub raw: RawValue,
}

impl SetPropertyValue {
    pub fn new(task_id: TaskId, property_id: PropertyId, raw: impl Into<RawValue>) -> Self {
        Self {
            task_id,
            property_id,
            raw: raw.into(),
        }
    }
}

#[async_trait]
impl Execute for SetPropertyValue {
    /// The stored value, `None` when the property is now unset
    type Output = Option<PropertyValue>;

    async fn execute(&self, ctx: &TaskContext) -> Result<Option<PropertyValue>> {
        // Held until the write lands so a cascading delete can't interleave
        let registry = ctx.registry().await;
        let def = registry
            .get(&self.property_id)
            .ok_or_else(|| TaskError::not_found("property", self.property_id))?;
        let mut task = ctx.read_task(&self.task_id).await?;

        if def.scope != task.scope {
            return Err(TaskError::Validation(vec![FieldError::new(
                property_field(&def.id),
                format!("{} belongs to {}, not {}", def.name, def.scope, task.scope),
            )]));
        }

        let value = decode_property(ctx.codec(), def, &self.raw, task.property(&def.id))
            .map_err(|e| TaskError::Validation(vec![e]))?;
        task.set_property(def.id, value.clone());
        task.updated_at = Utc::now();

        let definitions = registry.list(&task.scope);
        ensure_valid(ctx.validator().validate(&task, &definitions))?;
        ctx.store().upsert_task(&task).await?;

        debug!(
            task = %task.id,
            property = %def.id,
            set = value.is_some(),
            "property value stored"
        );
        Ok(value)
    }
}
