//! Status and the two priority vocabularies.
//!
//! Project tasks use `P1..P5`; global tasks use `low|medium|high|urgent`.
//! The vocabularies are kept as separate closed enums. The only bridge is
//! [`Urgency::legacy_level`], a one-way, lossy mapping.

use std::fmt;

use planboard_fields::Scope;
use serde::{Deserialize, Serialize};

/// Task workflow status. Declaration order is the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Todo,
    InProgress,
    Completed,
    /// Global tasks only
    Cancelled,
    /// Global tasks only
    OnHold,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::OnHold => "on-hold",
        }
    }

    /// Whether the status exists in the task family of `scope`.
    pub fn allowed_in(&self, scope: &Scope) -> bool {
        match scope {
            Scope::Global => true,
            Scope::Project(_) => matches!(self, Self::Todo | Self::InProgress | Self::Completed),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project priority, P1 most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriorityLevel {
    P1,
    P2,
    P3,
    P4,
    P5,
}

impl PriorityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
            Self::P4 => "P4",
            Self::P5 => "P5",
        }
    }

    /// 0 for the most urgent.
    pub fn rank(&self) -> u8 {
        *self as u8
    }
}

/// Global-task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Urgent,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    /// 0 for the most urgent.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Urgent => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    /// Map the legacy `low|medium|high` vocabulary onto project levels.
    ///
    /// One-directional and lossy: nothing maps to P4/P5, and `urgent` was
    /// never part of the legacy vocabulary so it has no mapping.
    pub fn legacy_level(&self) -> Option<PriorityLevel> {
        match self {
            Self::High => Some(PriorityLevel::P1),
            Self::Medium => Some(PriorityLevel::P2),
            Self::Low => Some(PriorityLevel::P3),
            Self::Urgent => None,
        }
    }
}

/// A priority from either vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskPriority {
    Level(PriorityLevel),
    Urgency(Urgency),
}

impl TaskPriority {
    /// Raw code: `P1`, `urgent`, ...
    pub fn code(&self) -> &'static str {
        match self {
            Self::Level(level) => level.as_str(),
            Self::Urgency(urgency) => urgency.as_str(),
        }
    }

    /// Urgency rank within its vocabulary, 0 most urgent.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Level(level) => level.rank(),
            Self::Urgency(urgency) => urgency.rank(),
        }
    }

    /// Whether this priority belongs to the task family of `scope`.
    pub fn fits(&self, scope: &Scope) -> bool {
        match (self, scope) {
            (Self::Level(_), Scope::Project(_)) => true,
            (Self::Urgency(_), Scope::Global) => true,
            _ => false,
        }
    }

    /// Normalize an incoming priority for the family of `scope`.
    ///
    /// Legacy urgency values on project tasks are mapped once to a level.
    /// Anything without a mapping is returned unchanged and fails validation.
    pub fn normalize_for(self, scope: &Scope) -> Self {
        match (self, scope) {
            (Self::Urgency(urgency), Scope::Project(_)) => urgency
                .legacy_level()
                .map(Self::Level)
                .unwrap_or(self),
            _ => self,
        }
    }
}

impl From<PriorityLevel> for TaskPriority {
    fn from(level: PriorityLevel) -> Self {
        Self::Level(level)
    }
}

impl From<Urgency> for TaskPriority {
    fn from(urgency: Urgency) -> Self {
        Self::Urgency(urgency)
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
