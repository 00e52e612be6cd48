//! UpdateProperty command

use async_trait::async_trait;
use planboard_fields::{PropertyDef, PropertyId, PropertyPatch};

use crate::command::Execute;
use crate::context::TaskContext;
use crate::error::Result;

/// Rename, reorder, retype or change the options of a definition.
///
/// Stored values are not migrated when the type changes.
#[derive(Debug, Clone)]
pub struct UpdateProperty {
    pub id: PropertyId,
    pub patch: PropertyPatch,
}

impl UpdateProperty {
    pub fn new(id: PropertyId, patch: PropertyPatch) -> Self {
        Self { id, patch }
    }
}

#[async_trait]
impl Execute for UpdateProperty {
    type Output = PropertyDef;

    async fn execute(&self, ctx: &TaskContext) -> Result<PropertyDef> {
        let mut registry = ctx.registry_mut().await;
        Ok(registry.update(&self.id, self.patch.clone()).await?)
    }
}
