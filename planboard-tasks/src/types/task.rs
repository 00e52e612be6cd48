//! Task types: Task, NewTask, TaskPatch

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use planboard_fields::{PropertyId, PropertyValue, RawValue, Scope};
use serde::{Deserialize, Serialize};

use super::ids::{MemberId, TaskId};
use super::priority::{Status, TaskPriority};
use super::recurrence::Recurrence;

/// The canonical task entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub scope: Scope,
    /// Display ordinal, assigned once per scope and never reused.
    pub task_number: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: Status,
    pub priority: TaskPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<MemberId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Set semantics, kept in insertion order for display.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Independent namespace from `tags`.
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub supporting_links: Vec<String>,
    /// Custom property values keyed by definition id. A missing key is "unset".
    #[serde(default)]
    pub custom_properties: BTreeMap<PropertyId, PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a task with default status `todo`. The caller assigns the number.
    pub fn new(scope: Scope, title: impl Into<String>, priority: TaskPriority) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            scope,
            task_number: 0,
            title: title.into(),
            description: None,
            status: Status::Todo,
            priority,
            assigned_to: None,
            assigned_team: None,
            start_date: None,
            due_date: None,
            tags: Vec::new(),
            labels: Vec::new(),
            supporting_links: Vec::new(),
            custom_properties: BTreeMap::new(),
            recurrence: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_assignee(mut self, member: impl Into<MemberId>) -> Self {
        self.assigned_to = Some(member.into());
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.assigned_team = Some(team.into());
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Add a tag unless already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        insert_unique(&mut self.tags, tag.into())
    }

    /// Add a label unless already present.
    pub fn add_label(&mut self, label: impl Into<String>) -> bool {
        insert_unique(&mut self.labels, label.into())
    }

    /// Stored value of a custom property, `None` when unset.
    pub fn property(&self, id: &PropertyId) -> Option<&PropertyValue> {
        self.custom_properties.get(id)
    }

    /// Store a value, or remove the key when `value` is `None`.
    pub fn set_property(&mut self, id: PropertyId, value: Option<PropertyValue>) {
        match value {
            Some(value) => {
                self.custom_properties.insert(id, value);
            }
            None => {
                self.custom_properties.remove(&id);
            }
        }
    }

    /// Text the search filter looks at: title, then description when present.
    pub fn search_text(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.title.as_str()).chain(self.description.as_deref())
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    /// The task title (required)
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `todo`
    pub status: Option<Status>,
    /// Defaults to the configured priority of the task family
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<MemberId>,
    pub assigned_team: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub supporting_links: Vec<String>,
    /// Raw custom property input, decoded by the codec on create
    #[serde(default)]
    pub custom_properties: BTreeMap<PropertyId, RawValue>,
    pub recurrence: Option<Recurrence>,
}

impl NewTask {
    /// Create a new task input with just a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: impl Into<TaskPriority>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_assignee(mut self, member: impl Into<MemberId>) -> Self {
        self.assigned_to = Some(member.into());
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.assigned_team = Some(team.into());
        self
    }

    pub fn with_start_date(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supporting_links = links.into_iter().map(Into::into).collect();
        self
    }

    /// Provide raw input for a custom property
    pub fn with_property(mut self, id: PropertyId, raw: impl Into<RawValue>) -> Self {
        self.custom_properties.insert(id, raw.into());
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }
}

/// Partial update of a task.
///
/// `None` leaves a field untouched. For clearable fields `Some(None)` clears
/// and `Some(Some(x))` sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<Status>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Option<MemberId>>,
    pub assigned_team: Option<Option<String>>,
    pub start_date: Option<Option<DateTime<Utc>>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// Replace all tags
    pub tags: Option<Vec<String>>,
    /// Replace all labels
    pub labels: Option<Vec<String>>,
    /// Replace all supporting links
    pub supporting_links: Option<Vec<String>>,
    pub recurrence: Option<Option<Recurrence>>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set or clear the description
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: impl Into<TaskPriority>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_assignee(mut self, member: Option<MemberId>) -> Self {
        self.assigned_to = Some(member);
        self
    }

    pub fn with_team(mut self, team: Option<String>) -> Self {
        self.assigned_team = Some(team);
        self
    }

    pub fn with_start_date(mut self, start: Option<DateTime<Utc>>) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn with_due_date(mut self, due: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Set the tags (replaces all existing tags)
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Set the labels (replaces all existing labels)
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Set the links (replaces all existing links)
    pub fn with_links(mut self, links: Vec<String>) -> Self {
        self.supporting_links = Some(links);
        self
    }

    pub fn with_recurrence(mut self, recurrence: Option<Recurrence>) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    /// Merge this patch into `task`. Validation happens on the merged result.
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            task.description = non_blank(description.as_deref());
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority.normalize_for(&task.scope);
        }
        if let Some(assignee) = &self.assigned_to {
            task.assigned_to = assignee.clone();
        }
        if let Some(team) = &self.assigned_team {
            task.assigned_team = team.clone();
        }
        if let Some(start) = self.start_date {
            task.start_date = start;
        }
        if let Some(due) = self.due_date {
            task.due_date = due;
        }
        if let Some(tags) = &self.tags {
            task.tags = unique_trimmed(tags);
        }
        if let Some(labels) = &self.labels {
            task.labels = unique_trimmed(labels);
        }
        if let Some(links) = &self.supporting_links {
            task.supporting_links = links.iter().map(|l| l.trim().to_string()).collect();
        }
        if let Some(recurrence) = &self.recurrence {
            task.recurrence = recurrence.clone();
        }
    }
}

/// Trimmed text, or `None` when nothing is left.
pub(crate) fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Trim, drop empties, keep the first occurrence of each value.
pub(crate) fn unique_trimmed(values: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        insert_unique(&mut out, value.trim().to_string());
    }
    out
}

fn insert_unique(values: &mut Vec<String>, value: String) -> bool {
    if value.is_empty() || values.contains(&value) {
        return false;
    }
    values.push(value);
    true
}
