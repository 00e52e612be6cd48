//! ListProperties command

use async_trait::async_trait;
use planboard_fields::{PropertyDef, Scope};

use crate::command::Execute;
use crate::context::TaskContext;
use crate::error::Result;

/// Definitions of a scope by display order, ties broken by id
#[derive(Debug, Clone)]
pub struct ListProperties {
    pub scope: Scope,
}

impl ListProperties {
    pub fn new(scope: Scope) -> Self {
        Self { scope }
    }
}

#[async_trait]
impl Execute for ListProperties {
    type Output = Vec<PropertyDef>;

    async fn execute(&self, ctx: &TaskContext) -> Result<Vec<PropertyDef>> {
        let registry = ctx.registry().await;
        Ok(registry.list(&self.scope).into_iter().cloned().collect())
    }
}
