//! Task validation.
//!
//! Every rule runs and every violation is reported; nothing exits early so a
//! form can highlight all offending fields at once.

use std::collections::HashMap;
use std::sync::LazyLock;

use planboard_fields::{FieldError, PropertyDef, PropertyId, Scope};
use regex::Regex;

use crate::types::Task;

static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://").expect("link pattern is valid"));

/// Length limits for the fixed task fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRules {
    /// Minimum title length in characters, after trimming
    pub title_min: usize,
    pub title_max: usize,
    pub description_max: usize,
}

impl Default for TaskRules {
    fn default() -> Self {
        Self {
            title_min: 3,
            title_max: 200,
            description_max: 2000,
        }
    }
}

/// Validate the fixed fields of a task with the default rules.
///
/// Custom properties are not checked; use [`TaskValidator::validate`] with the
/// scope's definitions for that.
pub fn validate_task(task: &Task) -> Vec<FieldError> {
    TaskValidator::default().validate_fields(task)
}

/// Validates tasks against configurable rules and property definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskValidator {
    rules: TaskRules,
}

impl TaskValidator {
    pub fn new(rules: TaskRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &TaskRules {
        &self.rules
    }

    /// All problems with `task`, including its custom property values
    /// checked against `definitions` (the definitions of the task's scope).
    pub fn validate(&self, task: &Task, definitions: &[&PropertyDef]) -> Vec<FieldError> {
        let mut errors = self.validate_fields(task);
        errors.extend(check_properties(task, definitions));
        errors
    }

    /// Problems with the fixed fields only.
    pub fn validate_fields(&self, task: &Task) -> Vec<FieldError> {
        let mut errors = Vec::new();

        let title_len = task.title.trim().chars().count();
        if title_len < self.rules.title_min || title_len > self.rules.title_max {
            errors.push(FieldError::new(
                "title",
                format!(
                    "must be between {} and {} characters (got {})",
                    self.rules.title_min, self.rules.title_max, title_len
                ),
            ));
        }

        if let Some(description) = &task.description {
            let len = description.chars().count();
            if len > self.rules.description_max {
                errors.push(FieldError::new(
                    "description",
                    format!(
                        "must be at most {} characters (got {})",
                        self.rules.description_max, len
                    ),
                ));
            }
        }

        for (i, link) in task.supporting_links.iter().enumerate() {
            if !LINK_PATTERN.is_match(link) {
                errors.push(FieldError::new(
                    format!("supporting_links[{i}]"),
                    "must start with http:// or https://",
                ));
            }
        }

        if !task.priority.fits(&task.scope) {
            errors.push(FieldError::new(
                "priority",
                format!("{} is not a {} priority", task.priority, family(&task.scope)),
            ));
        }

        if !task.status.allowed_in(&task.scope) {
            errors.push(FieldError::new(
                "status",
                format!("{} is not a {} status", task.status, family(&task.scope)),
            ));
        }

        if let Some(recurrence) = &task.recurrence {
            errors.extend(recurrence.check(task.start_date));
        }

        errors
    }
}

fn family(scope: &Scope) -> &'static str {
    match scope {
        Scope::Global => "global task",
        Scope::Project(_) => "project task",
    }
}

/// Field name used for errors about a custom property
pub(crate) fn property_field(id: &PropertyId) -> String {
    format!("custom_properties.{id}")
}

fn check_properties(task: &Task, definitions: &[&PropertyDef]) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let by_id: HashMap<PropertyId, &PropertyDef> =
        definitions.iter().map(|def| (def.id, *def)).collect();

    for (id, value) in &task.custom_properties {
        match by_id.get(id) {
            None => errors.push(FieldError::new(property_field(id), "unknown property")),
            Some(def) if value.property_type() != def.type_ => {
                errors.push(FieldError::new(
                    property_field(id),
                    format!(
                        "{} expects a {} value, got {}",
                        def.name,
                        def.type_,
                        value.property_type()
                    ),
                ));
            }
            Some(_) => {}
        }
    }

    for def in definitions {
        if def.required && !task.custom_properties.contains_key(&def.id) {
            errors.push(FieldError::new(
                property_field(&def.id),
                format!("{} is required", def.name),
            ));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PriorityLevel, Recurrence, RecurrencePattern, Status, TaskPriority, Urgency};
    use planboard_fields::{PropertyType, PropertyValue};

    fn task(title: &str) -> Task {
        Task::new(Scope::project("apollo"), title, PriorityLevel::P3.into())
    }

    fn def(type_: PropertyType, required: bool) -> PropertyDef {
        PropertyDef {
            id: PropertyId::new(),
            scope: Scope::project("apollo"),
            name: "Estimate".into(),
            type_,
            options: Vec::new(),
            required,
            display_order: 0,
        }
    }

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn short_title_fails_and_reasonable_title_passes() {
        assert_eq!(fields(&validate_task(&task("ab"))), vec!["title"]);
        assert!(validate_task(&task("Design homepage")).is_empty());
    }

    #[test]
    fn title_is_measured_after_trimming() {
        assert_eq!(fields(&validate_task(&task("  ab   "))), vec!["title"]);
        assert!(validate_task(&task(&"x".repeat(200))).is_empty());
        assert_eq!(fields(&validate_task(&task(&"x".repeat(201)))), vec!["title"]);
    }

    #[test]
    fn all_violations_are_reported_together() {
        let mut t = task("ab").with_description("d".repeat(2001));
        t.supporting_links = vec![
            "https://example.com".into(),
            "ftp://example.com".into(),
            "example.com".into(),
        ];
        t.priority = TaskPriority::Urgency(Urgency::Urgent);
        t.status = Status::OnHold;

        let errors = validate_task(&t);
        assert_eq!(
            fields(&errors),
            vec![
                "title",
                "description",
                "supporting_links[1]",
                "supporting_links[2]",
                "priority",
                "status"
            ]
        );
    }

    #[test]
    fn global_tasks_use_urgency_vocabulary() {
        let mut t = Task::new(Scope::Global, "Book venue", Urgency::High.into());
        t.status = Status::Cancelled;
        assert!(validate_task(&t).is_empty());

        t.priority = PriorityLevel::P1.into();
        assert_eq!(fields(&validate_task(&t)), vec!["priority"]);
    }

    #[test]
    fn recurrence_errors_are_included() {
        let mut t = task("Weekly sync");
        t.recurrence = Some(Recurrence::new(RecurrencePattern::Weekly, 0));
        assert_eq!(fields(&validate_task(&t)), vec!["recurrence.interval"]);
    }

    #[test]
    fn custom_properties_checked_against_definitions() {
        let number = def(PropertyType::Number, false);
        let required = def(PropertyType::Boolean, true);
        let unknown = PropertyId::new();

        let mut t = task("Design homepage");
        t.set_property(number.id, Some(PropertyValue::Text("five".into())));
        t.set_property(unknown, Some(PropertyValue::Number(1.0)));

        let errors = TaskValidator::default().validate(&t, &[&number, &required]);
        let mut got = fields(&errors);
        got.sort();
        let mut expected = vec![
            property_field(&number.id),
            property_field(&unknown),
            property_field(&required.id),
        ];
        expected.sort();
        assert_eq!(got, expected);
    }

    #[test]
    fn explicit_false_satisfies_required_boolean() {
        let required = def(PropertyType::Boolean, true);
        let mut t = task("Design homepage");
        t.set_property(required.id, Some(PropertyValue::Bool(false)));
        assert!(TaskValidator::default().validate(&t, &[&required]).is_empty());
    }

    #[test]
    fn custom_rules_apply() {
        let validator = TaskValidator::new(TaskRules {
            title_min: 1,
            title_max: 5,
            description_max: 3,
        });
        let t = task("ab").with_description("long");
        assert_eq!(fields(&validator.validate_fields(&t)), vec!["description"]);
    }
}
