//! Todo task records.
//!
//! # Invariants
//! - `status` and `priority` are always one of the enumerated values; the
//!   store enforces the same sets with CHECK constraints.
//! - Titles are 1..=200 characters and never whitespace-only.

use super::{empty_patch_error, RowId};
use crate::validation::{self, ValidationError, ValidationResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const TITLE_MAX_CHARS: usize = 200;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created but not started.
    #[default]
    Pending,
    /// Work is in progress.
    InProgress,
    /// Finished; excluded from overdue listings.
    Completed,
}

impl TaskStatus {
    pub const ALL: [&'static str; 3] = ["pending", "in_progress", "completed"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match validation::choice(value, "Status", &Self::ALL)? {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            _ => Ok(Self::Completed),
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [&'static str; 3] = ["low", "medium", "high"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match validation::choice(value, "Priority", &Self::ALL)? {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            _ => Ok(Self::High),
        }
    }
}

impl Display for TaskPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: RowId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub category_id: Option<RowId>,
    pub created_at: NaiveDateTime,
}

/// Input for `TaskRepository::create`. Status and priority default to
/// `pending` and `medium`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub category_id: Option<RowId>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn due(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn category(mut self, category_id: RowId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn validate(&self) -> ValidationResult {
        validate_title(&self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub category_id: Option<RowId>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.category_id.is_none()
    }

    pub fn validate(&self) -> ValidationResult {
        if self.is_empty() {
            return Err(empty_patch_error());
        }
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        Ok(())
    }
}

/// Optional grouping for tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCategory {
    pub id: RowId,
    pub name: String,
    pub created_at: NaiveDateTime,
}

fn validate_title(title: &str) -> ValidationResult {
    validation::not_empty(title, "Title")?;
    validation::length(title, "Title", Some(1), Some(TITLE_MAX_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_task_json_fills_defaults() {
        let task: NewTask = serde_json::from_value(json!({"title": "Buy milk"})).unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn enums_use_snake_case_on_the_wire() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            json!("in_progress")
        );
        let patch: TaskPatch =
            serde_json::from_value(json!({"priority": "high", "due_date": "2026-03-01"})).unwrap();
        assert_eq!(patch.priority, Some(TaskPriority::High));
        assert_eq!(patch.due_date, NaiveDate::from_ymd_opt(2026, 3, 1));
    }

    #[test]
    fn patch_rejects_unknown_fields() {
        let result: Result<TaskPatch, _> = serde_json::from_value(json!({"colour": "red"}));
        assert!(result.is_err());
    }

    #[test]
    fn whitespace_title_is_rejected() {
        let err = NewTask::new("   ").validate().unwrap_err();
        assert_eq!(err.field, "Title");
        assert!(TaskPatch::default().validate().is_err());
    }
}
