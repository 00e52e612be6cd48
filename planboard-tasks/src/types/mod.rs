//! Core types for the task engine

mod ids;
mod priority;
mod recurrence;
mod task;

// Re-export all types
pub use ids::{CategoryId, MemberId, TaskId};
pub use priority::{PriorityLevel, Status, TaskPriority, Urgency};
pub use recurrence::{Recurrence, RecurrencePattern};
pub use task::{NewTask, Task, TaskPatch};

pub(crate) use task::{non_blank, unique_trimmed};
