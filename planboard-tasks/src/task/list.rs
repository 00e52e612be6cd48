//! ListTasks command

use async_trait::async_trait;
use indexmap::IndexMap;
use planboard_fields::Scope;
use tracing::debug;

use crate::command::Execute;
use crate::context::TaskContext;
use crate::error::Result;
use crate::query::{query_tasks, Directory, TaskQuery};
use crate::types::Task;

/// Owned query result, bucket order preserved
pub type TaskGroups = IndexMap<String, Vec<Task>>;

/// Fetch a scope's tasks and run them through the query engine
#[derive(Debug, Clone)]
pub struct ListTasks {
    pub scope: Scope,
    pub query: TaskQuery,
    pub directory: Directory,
}

impl ListTasks {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            query: TaskQuery::default(),
            directory: Directory::default(),
        }
    }

    pub fn with_query(mut self, query: TaskQuery) -> Self {
        self.query = query;
        self
    }

    pub fn with_directory(mut self, directory: Directory) -> Self {
        self.directory = directory;
        self
    }
}

#[async_trait]
impl Execute for ListTasks {
    type Output = TaskGroups;

    async fn execute(&self, ctx: &TaskContext) -> Result<TaskGroups> {
        let tasks = ctx.store().fetch_tasks(&self.scope).await?;
        let groups: TaskGroups = query_tasks(&tasks, &self.query, &self.directory)
            .into_iter()
            .map(|(label, bucket)| (label, bucket.into_iter().cloned().collect()))
            .collect();
        debug!(scope = %self.scope, fetched = tasks.len(), buckets = groups.len(), "tasks listed");
        Ok(groups)
    }
}
