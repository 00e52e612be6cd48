//! Bucket key derivation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{MemberId, Task, TaskPriority};

pub const ALL_TASKS: &str = "All Tasks";
pub const NO_TEAM: &str = "No Team";
pub const UNKNOWN_MEMBER: &str = "Unknown";
pub const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    None,
    Status,
    Priority,
    AssignedTeam,
    Assignee,
}

/// Display names the grouping step resolves against.
///
/// Fallbacks for unresolved references are applied here, once, so every view
/// shows the same bucket labels.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    pub members: HashMap<MemberId, String>,
    pub priority_labels: HashMap<TaskPriority, String>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        self.members.insert(id.into(), name.into());
        self
    }

    pub fn with_priority_label(
        mut self,
        priority: impl Into<TaskPriority>,
        label: impl Into<String>,
    ) -> Self {
        self.priority_labels.insert(priority.into(), label.into());
        self
    }

    pub fn member_name(&self, id: &MemberId) -> Option<&str> {
        self.members.get(id).map(String::as_str)
    }
}

impl GroupBy {
    /// The bucket label of `task`.
    pub fn key(&self, task: &Task, directory: &Directory) -> String {
        match self {
            Self::None => ALL_TASKS.to_string(),
            Self::Status => task.status.as_str().to_string(),
            Self::Priority => directory
                .priority_labels
                .get(&task.priority)
                .cloned()
                .unwrap_or_else(|| task.priority.code().to_string()),
            Self::AssignedTeam => task
                .assigned_team
                .clone()
                .unwrap_or_else(|| NO_TEAM.to_string()),
            Self::Assignee => match &task.assigned_to {
                None => UNASSIGNED.to_string(),
                Some(id) => directory
                    .member_name(id)
                    .unwrap_or(UNKNOWN_MEMBER)
                    .to_string(),
            },
        }
    }
}
