//! Tasks, their statuses, and the task list filter.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  filter::{FilterSet, parse_date, replace},
};

pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 5000;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle state of a task.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
  #[default]
  Todo,
  InProgress,
  Done,
}

impl TaskStatus {
  pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

  pub fn as_str(self) -> &'static str {
    match self {
      TaskStatus::Todo => "TODO",
      TaskStatus::InProgress => "IN_PROGRESS",
      TaskStatus::Done => "DONE",
    }
  }
}

impl fmt::Display for TaskStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for TaskStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    TaskStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| Error::UnknownStatus(s.to_owned()))
  }
}

// ─── Task ────────────────────────────────────────────────────────────────────

/// A task as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
  pub id:             i64,
  pub assignee_id:    Option<i64>,
  pub assignee_email: Option<String>,
  pub title:          String,
  pub description:    Option<String>,
  #[serde(default)]
  pub status:         TaskStatus,
  pub deadline:       Option<NaiveDate>,
  pub created_at:     Option<DateTime<Utc>>,
  pub updated_at:     Option<DateTime<Utc>>,
}

/// Body of `POST /api/tasks` and `PUT /api/tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
  pub title:       String,
  pub description: Option<String>,
  pub status:      TaskStatus,
  pub deadline:    Option<NaiveDate>,
  pub assignee_id: Option<i64>,
}

impl TaskPayload {
  /// Build a payload from raw form input: trims text, maps an empty
  /// description to `None`, and enforces the server's length limits.
  pub fn from_form(
    title: &str,
    description: &str,
    status: TaskStatus,
    deadline: &str,
    assignee_id: Option<i64>,
  ) -> Result<Self> {
    let title = title.trim();
    if title.is_empty() {
      return Err(Error::BlankTitle);
    }
    if title.chars().count() > TITLE_MAX {
      return Err(Error::TitleTooLong { max: TITLE_MAX });
    }
    let description = description.trim();
    if description.chars().count() > DESCRIPTION_MAX {
      return Err(Error::DescriptionTooLong { max: DESCRIPTION_MAX });
    }
    Ok(Self {
      title: title.to_owned(),
      description: (!description.is_empty()).then(|| description.to_owned()),
      status,
      deadline: parse_date(deadline)?,
      assignee_id,
    })
  }
}

/// Body of `PATCH /api/tasks/{id}/status`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusUpdate {
  pub status: TaskStatus,
}

// ─── Filter ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilterField {
  Status,
  DeadlineFrom,
  DeadlineTo,
}

/// Filters accepted by `GET /api/tasks`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
  status:        String,
  deadline_from: String,
  deadline_to:   String,
}

impl TaskFilter {
  pub fn status(&self) -> Option<TaskStatus> { self.status.parse().ok() }
}

impl FilterSet for TaskFilter {
  type Field = TaskFilterField;

  fn get(&self, field: TaskFilterField) -> &str {
    match field {
      TaskFilterField::Status => &self.status,
      TaskFilterField::DeadlineFrom => &self.deadline_from,
      TaskFilterField::DeadlineTo => &self.deadline_to,
    }
  }

  fn set(&mut self, field: TaskFilterField, value: &str) -> Result<bool> {
    let value = value.trim();
    match field {
      TaskFilterField::Status => {
        if !value.is_empty() {
          value.parse::<TaskStatus>()?;
        }
        Ok(replace(&mut self.status, value.to_owned()))
      }
      TaskFilterField::DeadlineFrom => {
        parse_date(value)?;
        Ok(replace(&mut self.deadline_from, value.to_owned()))
      }
      TaskFilterField::DeadlineTo => {
        parse_date(value)?;
        Ok(replace(&mut self.deadline_to, value.to_owned()))
      }
    }
  }

  fn query_params(&self) -> Vec<(&'static str, String)> {
    [
      ("status", &self.status),
      ("deadlineFrom", &self.deadline_from),
      ("deadlineTo", &self.deadline_to),
    ]
    .into_iter()
    .filter(|(_, v)| !v.is_empty())
    .map(|(k, v)| (k, v.clone()))
    .collect()
  }
}
