//! Recurrence descriptor: a declarative pattern consumed by an external scheduler.

use chrono::{DateTime, Utc};
use planboard_fields::FieldError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Repeat every `interval` units of `pattern`, optionally until a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub pattern: RecurrencePattern,
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
}

impl Recurrence {
    pub fn new(pattern: RecurrencePattern, interval: u32) -> Self {
        Self {
            pattern,
            interval,
            until: None,
        }
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// Problems with this descriptor for a task starting at `start`.
    pub fn check(&self, start: Option<DateTime<Utc>>) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.interval == 0 {
            errors.push(FieldError::new("recurrence.interval", "must be at least 1"));
        }
        if let (Some(until), Some(start)) = (self.until, start) {
            if until < start {
                errors.push(FieldError::new(
                    "recurrence.until",
                    "cannot be before the start date",
                ));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn zero_interval_is_rejected() {
        let errors = Recurrence::new(RecurrencePattern::Weekly, 0).check(None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "recurrence.interval");
    }

    #[test]
    fn until_must_not_precede_start() {
        let start = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap();
        let rule = Recurrence::new(RecurrencePattern::Monthly, 1).until(before);
        assert_eq!(rule.check(Some(start))[0].field, "recurrence.until");
        assert!(rule.check(None).is_empty());
    }

    #[test]
    fn yaml_shape() {
        let rule = Recurrence::new(RecurrencePattern::Daily, 2);
        let yaml = serde_yaml_ng::to_string(&rule).unwrap();
        assert!(yaml.contains("pattern: daily"));
        assert!(yaml.contains("interval: 2"));
        assert!(!yaml.contains("until"));
    }
}
