//! Command trait

use async_trait::async_trait;

use crate::context::TaskContext;
use crate::error::Result;

/// A command executed against a [`TaskContext`].
///
/// Commands hold their input and do all the work; the context only provides
/// access to the store, registry and configuration.
#[async_trait]
pub trait Execute {
    type Output: Send;

    async fn execute(&self, ctx: &TaskContext) -> Result<Self::Output>;
}
