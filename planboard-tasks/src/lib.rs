//! Task record model and query engine
//!
//! Tasks carry a fixed core of typed fields plus custom property values
//! defined in `planboard-fields`. A single filter → sort → group pipeline
//! serves every view: table, board, calendar and timeline.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use planboard_tasks::{
//!     query::{GroupBy, TaskQuery},
//!     task::{CreateTask, ListTasks},
//!     Execute, NewTask, Scope, TaskContext,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = TaskContext::in_memory();
//! let scope = Scope::project("apollo");
//!
//! CreateTask::new(scope.clone(), NewTask::new("Design homepage"))
//!     .execute(&ctx)
//!     .await?;
//!
//! let groups = ListTasks::new(scope)
//!     .with_query(TaskQuery::new().with_group_by(GroupBy::Status))
//!     .execute(&ctx)
//!     .await?;
//! for (label, tasks) in &groups {
//!     println!("{label}: {}", tasks.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Layout
//!
//! - [`types`]: tasks, ids, status and the two priority vocabularies, recurrence
//! - [`validate`]: field-keyed validation that reports every problem at once
//! - [`query`]: the pure query engine
//! - [`store`]: the record store contract with memory and YAML file stores
//! - [`task`] / [`property`]: commands executed against a [`TaskContext`]
//! - [`feed`]: a per-scope task set kept fresh from change notices
//! - [`catalog`]: tag and label categories
//! - [`config`]: figment-based settings

pub mod catalog;
mod command;
pub mod config;
mod context;
pub mod error;
pub mod feed;
pub mod property;
pub mod query;
pub mod store;
pub mod task;
pub mod types;
pub mod validate;

pub use command::Execute;
pub use config::{ConfigProvider, PlanboardConfig};
pub use context::{TaskContext, PROPERTIES_DIR};
pub use error::{Result, TaskError};
pub use feed::TaskFeed;
pub use query::{query_tasks, TaskQuery};
pub use store::{ChangeNotice, FileStore, MemoryStore, RecordStore};
pub use types::{
    CategoryId, MemberId, NewTask, PriorityLevel, Recurrence, RecurrencePattern, Status, Task,
    TaskId, TaskPatch, TaskPriority, Urgency,
};
pub use validate::{validate_task, TaskRules, TaskValidator};

pub use planboard_fields::{
    CodecMode, FieldError, PropertyDef, PropertyId, PropertyType, PropertyValue, RawValue, Scope,
    ValueCodec,
};
