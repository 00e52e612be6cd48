//! DeleteProperty command

use async_trait::async_trait;
use chrono::Utc;
use planboard_fields::{PropertyDef, PropertyId};
use serde::Serialize;
use tracing::{error, info};

use crate::command::Execute;
use crate::context::TaskContext;
use crate::error::{Result, TaskError};
use crate::types::Task;

/// Outcome of a cascading property deletion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CascadeReport {
    /// The removed definition
    pub property: PropertyDef,
    /// Number of tasks that carried a value and were rewritten
    pub values_removed: usize,
}

/// Delete a definition together with every stored value for it.
///
/// Values are stripped in one all-or-nothing store batch and the scope is
/// re-read to confirm none remain. Only then is the definition removed. If
/// anything is left behind the definition stays and the command fails with
/// [`TaskError::CascadeIntegrity`].
#[derive(Debug, Clone)]
pub struct DeleteProperty {
    pub id: PropertyId,
}

impl DeleteProperty {
    pub fn new(id: PropertyId) -> Self {
        Self { id }
    }
}

#[async_trait]
impl Execute for DeleteProperty {
    type Output = CascadeReport;

    async fn execute(&self, ctx: &TaskContext) -> Result<CascadeReport> {
        // Exclusive for the whole cascade: no value writer can slip in
        let mut registry = ctx.registry_mut().await;
        let def = registry
            .get(&self.id)
            .cloned()
            .ok_or_else(|| TaskError::not_found("property", self.id))?;

        let now = Utc::now();
        let stripped: Vec<Task> = ctx
            .store()
            .fetch_tasks(&def.scope)
            .await?
            .into_iter()
            .filter(|t| t.custom_properties.contains_key(&def.id))
            .map(|mut t| {
                t.set_property(def.id, None);
                t.updated_at = now;
                t
            })
            .collect();

        if !stripped.is_empty() {
            ctx.store().replace_tasks(&stripped).await?;
        }

        let remaining = ctx
            .store()
            .fetch_tasks(&def.scope)
            .await?
            .iter()
            .filter(|t| t.custom_properties.contains_key(&def.id))
            .count();
        if remaining > 0 {
            error!(
                property = %def.id,
                scope = %def.scope,
                remaining,
                "cascade left values behind; definition kept"
            );
            return Err(TaskError::CascadeIntegrity {
                property: def.id.to_string(),
                remaining,
            });
        }

        let property = registry.remove(&def.id).await?;
        info!(
            property = %property.id,
            scope = %property.scope,
            values_removed = stripped.len(),
            "property deleted with its values"
        );
        Ok(CascadeReport {
            property,
            values_removed: stripped.len(),
        })
    }
}
