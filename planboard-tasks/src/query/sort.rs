//! Stable single-field sorting.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::Task;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    TaskNumber,
    /// Lexicographic
    Title,
    /// Declaration order: todo, in-progress, completed, cancelled, on-hold
    Status,
    /// Urgency order, most urgent first when ascending
    Priority,
    /// Tasks without a due date always come last
    DueDate,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSort {
    pub field: SortField,
    #[serde(default)]
    pub direction: SortDirection,
}

impl TaskSort {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }

    /// Compare two tasks under this sort.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        if self.field == SortField::DueDate {
            return match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => self.directed(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
        }
        let ordering = match self.field {
            SortField::TaskNumber => a.task_number.cmp(&b.task_number),
            SortField::Title => a.title.cmp(&b.title),
            SortField::Status => a.status.cmp(&b.status),
            SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::DueDate => Ordering::Equal,
        };
        self.directed(ordering)
    }

    /// Sort in place. Stable: equal keys keep their input order in both directions.
    pub fn apply(&self, tasks: &mut [&Task]) {
        tasks.sort_by(|a, b| self.compare(a, b));
    }

    fn directed(&self, ordering: Ordering) -> Ordering {
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PriorityLevel, Status, Urgency};
    use chrono::{TimeZone, Utc};
    use planboard_fields::Scope;

    fn numbered(n: u64, priority: PriorityLevel) -> Task {
        let mut task = Task::new(Scope::project("apollo"), format!("Task {n}"), priority.into());
        task.task_number = n;
        task
    }

    fn numbers(tasks: &[&Task]) -> Vec<u64> {
        tasks.iter().map(|t| t.task_number).collect()
    }

    #[test]
    fn priority_sorts_by_urgency() {
        let tasks = [
            numbered(1, PriorityLevel::P3),
            numbered(2, PriorityLevel::P1),
            numbered(3, PriorityLevel::P5),
            numbered(4, PriorityLevel::P2),
        ];
        let mut refs: Vec<&Task> = tasks.iter().collect();
        TaskSort::asc(SortField::Priority).apply(&mut refs);
        let codes: Vec<&str> = refs.iter().map(|t| t.priority.code()).collect();
        assert_eq!(codes, vec!["P1", "P2", "P3", "P5"]);
    }

    #[test]
    fn urgency_vocabulary_puts_urgent_first() {
        let mk = |u: Urgency| Task::new(Scope::Global, "Global", u.into());
        let tasks = [mk(Urgency::Low), mk(Urgency::Urgent), mk(Urgency::Medium), mk(Urgency::High)];
        let mut refs: Vec<&Task> = tasks.iter().collect();
        TaskSort::asc(SortField::Priority).apply(&mut refs);
        let codes: Vec<&str> = refs.iter().map(|t| t.priority.code()).collect();
        assert_eq!(codes, vec!["urgent", "high", "medium", "low"]);
    }

    #[test]
    fn status_uses_declaration_order_not_alphabetical() {
        let tasks = [
            numbered(1, PriorityLevel::P3).with_status(Status::Completed),
            numbered(2, PriorityLevel::P3).with_status(Status::Todo),
            numbered(3, PriorityLevel::P3).with_status(Status::InProgress),
        ];
        let mut refs: Vec<&Task> = tasks.iter().collect();
        TaskSort::asc(SortField::Status).apply(&mut refs);
        assert_eq!(numbers(&refs), vec![2, 3, 1]);
    }

    #[test]
    fn ties_keep_input_order_in_both_directions() {
        let tasks = [
            numbered(5, PriorityLevel::P2),
            numbered(1, PriorityLevel::P1),
            numbered(3, PriorityLevel::P2),
            numbered(2, PriorityLevel::P2),
        ];
        let mut refs: Vec<&Task> = tasks.iter().collect();
        TaskSort::asc(SortField::Priority).apply(&mut refs);
        assert_eq!(numbers(&refs), vec![1, 5, 3, 2]);

        let mut refs: Vec<&Task> = tasks.iter().collect();
        TaskSort::desc(SortField::Priority).apply(&mut refs);
        assert_eq!(numbers(&refs), vec![5, 3, 2, 1]);
    }

    #[test]
    fn missing_due_dates_sort_last_in_both_directions() {
        let early = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let tasks = [
            numbered(1, PriorityLevel::P3),
            numbered(2, PriorityLevel::P3).with_due_date(late),
            numbered(3, PriorityLevel::P3).with_due_date(early),
        ];

        let mut refs: Vec<&Task> = tasks.iter().collect();
        TaskSort::asc(SortField::DueDate).apply(&mut refs);
        assert_eq!(numbers(&refs), vec![3, 2, 1]);

        let mut refs: Vec<&Task> = tasks.iter().collect();
        TaskSort::desc(SortField::DueDate).apply(&mut refs);
        assert_eq!(numbers(&refs), vec![2, 3, 1]);
    }

    #[test]
    fn wire_names() {
        let sort: TaskSort =
            serde_json::from_str(r#"{"field":"due_date","direction":"desc"}"#).unwrap();
        assert_eq!(sort, TaskSort::desc(SortField::DueDate));
        let sort: TaskSort = serde_json::from_str(r#"{"field":"task_number"}"#).unwrap();
        assert_eq!(sort.direction, SortDirection::Asc);
    }
}
