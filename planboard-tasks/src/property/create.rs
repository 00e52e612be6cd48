//! CreateProperty command

use async_trait::async_trait;
use planboard_fields::{NewProperty, PropertyDef, Scope};

use crate::command::Execute;
use crate::context::TaskContext;
use crate::error::Result;

/// Define a custom property in a scope
#[derive(Debug, Clone)]
pub struct CreateProperty {
    pub scope: Scope,
    pub input: NewProperty,
}

impl CreateProperty {
    pub fn new(scope: Scope, input: NewProperty) -> Self {
        Self { scope, input }
    }
}

#[async_trait]
impl Execute for CreateProperty {
    type Output = PropertyDef;

    async fn execute(&self, ctx: &TaskContext) -> Result<PropertyDef> {
        let mut registry = ctx.registry_mut().await;
        Ok(registry.create(self.scope.clone(), self.input.clone()).await?)
    }
}
