//! Query engine: filter, then sort, then group.
//!
//! A pure function over an in-memory task collection. The same inputs always
//! give the same buckets in the same order, so views can recompute on every
//! change notice without coordination.

mod filter;
mod group;
mod sort;

pub use filter::TaskFilters;
pub use group::{Directory, GroupBy, ALL_TASKS, NO_TEAM, UNASSIGNED, UNKNOWN_MEMBER};
pub use sort::{SortDirection, SortField, TaskSort};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::Task;

/// Ordered buckets keyed by label. Bucket order is first encounter while
/// scanning the filtered and sorted tasks.
pub type Buckets<'a> = IndexMap<String, Vec<&'a Task>>;

/// Filters, optional sort, and grouping. Ephemeral, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskQuery {
    #[serde(default)]
    pub filters: TaskFilters,
    /// Without a sort the input order is kept
    #[serde(default)]
    pub sort: Option<TaskSort>,
    #[serde(default)]
    pub group_by: GroupBy,
}

impl TaskQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(mut self, filters: TaskFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_sort(mut self, sort: TaskSort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }
}

/// Filter, sort and group `tasks`.
pub fn query_tasks<'a>(tasks: &'a [Task], query: &TaskQuery, directory: &Directory) -> Buckets<'a> {
    let mut buckets: Buckets<'a> = IndexMap::new();
    for task in select_tasks(tasks, &query.filters, query.sort.as_ref()) {
        buckets
            .entry(query.group_by.key(task, directory))
            .or_default()
            .push(task);
    }
    buckets
}

/// Ungrouped convenience: filter and sort into a flat list.
pub fn select_tasks<'a>(
    tasks: &'a [Task],
    filters: &TaskFilters,
    sort: Option<&TaskSort>,
) -> Vec<&'a Task> {
    let matcher = filters.matcher();
    let mut selected: Vec<&Task> = tasks.iter().filter(|t| matcher.matches(t)).collect();
    if let Some(sort) = sort {
        sort.apply(&mut selected);
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PriorityLevel, Status};
    use planboard_fields::Scope;

    fn numbered(n: u64, status: Status) -> Task {
        let priority = PriorityLevel::P3.into();
        let mut task = Task::new(Scope::project("apollo"), format!("Task {n}"), priority)
            .with_status(status);
        task.task_number = n;
        task
    }

    fn labels(buckets: &Buckets<'_>) -> Vec<String> {
        buckets.keys().cloned().collect()
    }

    #[test]
    fn buckets_follow_first_encounter_order() {
        let tasks = vec![
            numbered(1, Status::Completed),
            numbered(2, Status::Todo),
            numbered(3, Status::Todo),
        ];
        let query = TaskQuery::new().with_group_by(GroupBy::Status);
        let buckets = query_tasks(&tasks, &query, &Directory::new());

        assert_eq!(labels(&buckets), vec!["completed", "todo"]);
        assert_eq!(buckets["completed"][0].task_number, 1);
        let todo: Vec<u64> = buckets["todo"].iter().map(|t| t.task_number).collect();
        assert_eq!(todo, vec![2, 3]);
    }

    #[test]
    fn sort_runs_before_grouping() {
        let tasks = vec![
            numbered(3, Status::Completed),
            numbered(1, Status::Todo),
            numbered(2, Status::Completed),
        ];
        let query = TaskQuery::new()
            .with_sort(TaskSort::asc(SortField::TaskNumber))
            .with_group_by(GroupBy::Status);
        let buckets = query_tasks(&tasks, &query, &Directory::new());

        assert_eq!(labels(&buckets), vec!["todo", "completed"]);
        let done: Vec<u64> = buckets["completed"].iter().map(|t| t.task_number).collect();
        assert_eq!(done, vec![2, 3]);
    }

    #[test]
    fn no_grouping_yields_single_bucket() {
        let tasks = vec![numbered(1, Status::Todo), numbered(2, Status::Completed)];
        let buckets = query_tasks(&tasks, &TaskQuery::new(), &Directory::new());
        assert_eq!(labels(&buckets), vec![ALL_TASKS]);
        assert_eq!(buckets[ALL_TASKS].len(), 2);
    }

    #[test]
    fn filtered_out_everything_gives_no_buckets() {
        let tasks = vec![numbered(1, Status::Todo)];
        let query = TaskQuery::new().with_filters(TaskFilters::new().with_search("missing"));
        assert!(query_tasks(&tasks, &query, &Directory::new()).is_empty());
    }

    #[test]
    fn select_matches_query_flattened() {
        let tasks = vec![
            numbered(2, Status::Todo),
            numbered(1, Status::Completed),
            numbered(3, Status::Todo),
        ];
        let filters = TaskFilters::new().with_status([Status::Todo]);
        let sort = TaskSort::desc(SortField::TaskNumber);
        let flat: Vec<u64> = select_tasks(&tasks, &filters, Some(&sort))
            .iter()
            .map(|t| t.task_number)
            .collect();
        assert_eq!(flat, vec![3, 2]);
    }
}
