//! Conjunctive task filters.

use serde::{Deserialize, Serialize};

use crate::types::{MemberId, Status, Task, TaskPriority};

/// Predicates over the fixed task fields.
///
/// All non-empty predicates must hold. Within one predicate the accepted
/// values are alternatives. An empty set or an empty search matches every task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskFilters {
    #[serde(default)]
    pub status: Vec<Status>,
    #[serde(default)]
    pub priority: Vec<TaskPriority>,
    #[serde(default)]
    pub assigned_to: Vec<MemberId>,
    #[serde(default)]
    pub assigned_team: Vec<String>,
    /// Case-insensitive substring of the title or description
    #[serde(default)]
    pub search: Option<String>,
}

impl TaskFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: impl IntoIterator<Item = Status>) -> Self {
        self.status = status.into_iter().collect();
        self
    }

    pub fn with_priority<P: Into<TaskPriority>>(
        mut self,
        priority: impl IntoIterator<Item = P>,
    ) -> Self {
        self.priority = priority.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_assignees<M: Into<MemberId>>(
        mut self,
        members: impl IntoIterator<Item = M>,
    ) -> Self {
        self.assigned_to = members.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_teams<S: Into<String>>(mut self, teams: impl IntoIterator<Item = S>) -> Self {
        self.assigned_team = teams.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Whether no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
            && self.priority.is_empty()
            && self.assigned_to.is_empty()
            && self.assigned_team.is_empty()
            && self.needle().is_none()
    }

    /// Whether `task` satisfies every active predicate.
    pub fn matches(&self, task: &Task) -> bool {
        self.matcher().matches(task)
    }

    /// Prepare for matching many tasks; the search term is lowercased once.
    pub(crate) fn matcher(&self) -> FilterMatcher<'_> {
        FilterMatcher {
            filters: self,
            needle: self.needle().map(str::to_lowercase),
        }
    }

    fn needle(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }
}

pub(crate) struct FilterMatcher<'a> {
    filters: &'a TaskFilters,
    needle: Option<String>,
}

impl FilterMatcher<'_> {
    pub(crate) fn matches(&self, task: &Task) -> bool {
        let f = self.filters;
        accepts(&f.status, Some(&task.status))
            && accepts(&f.priority, Some(&task.priority))
            && accepts(&f.assigned_to, task.assigned_to.as_ref())
            && accepts(&f.assigned_team, task.assigned_team.as_ref())
            && self.search_matches(task)
    }

    fn search_matches(&self, task: &Task) -> bool {
        let Some(needle) = &self.needle else {
            return true;
        };
        task.search_text()
            .any(|text| text.to_lowercase().contains(needle.as_str()))
    }
}

/// Empty accepts anything; otherwise the value must be present and listed.
fn accepts<T: PartialEq>(allowed: &[T], value: Option<&T>) -> bool {
    allowed.is_empty() || value.is_some_and(|v| allowed.contains(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PriorityLevel;
    use planboard_fields::Scope;

    fn task(title: &str) -> Task {
        Task::new(Scope::project("apollo"), title, PriorityLevel::P3.into())
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let lunch = task("Team Lunch");
        let hosting = task("Server Hosting");
        for term in ["lunch", "LUNCH", "m lu"] {
            let filters = TaskFilters::new().with_search(term);
            assert!(filters.matches(&lunch), "{term}");
            assert!(!filters.matches(&hosting), "{term}");
        }
    }

    #[test]
    fn search_looks_at_description() {
        let t = task("Catering").with_description("Order lunch for Friday");
        assert!(TaskFilters::new().with_search("LUNCH").matches(&t));
    }

    #[test]
    fn empty_predicates_match_everything() {
        let t = task("Anything");
        let filters = TaskFilters::new().with_search("");
        assert!(filters.is_empty());
        assert!(filters.matches(&t));
    }

    #[test]
    fn predicates_are_conjunctive_and_values_disjunctive() {
        let t = task("Design homepage")
            .with_status(Status::InProgress)
            .with_team("Web");

        let filters = TaskFilters::new().with_status([Status::Todo, Status::InProgress]);
        assert!(filters.matches(&t));

        let filters = filters.with_teams(["Mobile"]);
        assert!(!filters.matches(&t));

        let filters = TaskFilters::new()
            .with_status([Status::InProgress])
            .with_teams(["Web", "Mobile"])
            .with_priority([PriorityLevel::P3]);
        assert!(filters.matches(&t));
    }

    #[test]
    fn absent_assignee_never_matches_assignee_filter() {
        let t = task("Unowned");
        assert!(!TaskFilters::new().with_assignees(["m1"]).matches(&t));
        assert!(TaskFilters::new()
            .with_assignees(["m1"])
            .matches(&t.with_assignee("m1")));
    }
}
