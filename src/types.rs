//! Core types for the task tracker.

use crate::error::StoreError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Storage format for timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Task identifier, assigned by the store.
pub type TaskId = i64;

/// A persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub table_name: String,
    pub email: String,
    pub saved_email: String,
    pub task_description: String,
    pub completed: bool,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub last_updated: NaiveDateTime,
}

impl Task {
    /// The editable portion of the record.
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            name: self.name.clone(),
            table_name: self.table_name.clone(),
            email: self.email.clone(),
            saved_email: self.saved_email.clone(),
            task_description: self.task_description.clone(),
        }
    }

    pub fn summary(&self) -> TaskSummary {
        TaskSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// The five fields a user can edit. Always written together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFields {
    pub name: String,
    pub table_name: String,
    pub email: String,
    pub saved_email: String,
    pub task_description: String,
}

impl TaskFields {
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        email: impl Into<String>,
        saved_email: impl Into<String>,
        task_description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            email: email.into(),
            saved_email: saved_email.into(),
            task_description: task_description.into(),
        }
    }

    /// Build from a key/value map as returned by a record form.
    /// Missing keys are reported by name.
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, String> {
        let take = |key: &str| values.get(key).cloned().ok_or_else(|| key.to_string());
        Ok(Self {
            name: take("name")?,
            table_name: take("table_name")?,
            email: take("email")?,
            saved_email: take("saved_email")?,
            task_description: take("task_description")?,
        })
    }

    /// Key/value view in form order.
    pub fn to_pairs(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("name", self.name.as_str()),
            ("table_name", self.table_name.as_str()),
            ("email", self.email.as_str()),
            ("saved_email", self.saved_email.as_str()),
            ("task_description", self.task_description.as_str()),
        ]
    }
}

/// What a list view displays for each row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: TaskId,
    pub name: String,
}

/// Completion filter for listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    /// Every task regardless of completion.
    #[default]
    All,
    /// `completed = false`.
    Active,
    /// `completed = true`.
    Archived,
}

impl TaskFilter {
    /// The `completed` value to match, `None` for all tasks.
    pub fn completed(self) -> Option<bool> {
        match self {
            TaskFilter::All => None,
            TaskFilter::Active => Some(false),
            TaskFilter::Archived => Some(true),
        }
    }
}

impl From<Option<bool>> for TaskFilter {
    fn from(completed: Option<bool>) -> Self {
        match completed {
            None => TaskFilter::All,
            Some(false) => TaskFilter::Active,
            Some(true) => TaskFilter::Archived,
        }
    }
}

/// Columns a task list may be ordered by.
///
/// This is the only path from caller input to an ORDER BY clause; the
/// column text comes from [`SortField::column`], never from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    TableName,
    Email,
    SavedEmail,
    TaskDescription,
    Completed,
    CreatedAt,
    LastUpdated,
}

impl SortField {
    pub const ALL: [SortField; 8] = [
        SortField::Name,
        SortField::TableName,
        SortField::Email,
        SortField::SavedEmail,
        SortField::TaskDescription,
        SortField::Completed,
        SortField::CreatedAt,
        SortField::LastUpdated,
    ];

    /// Storage column name.
    pub fn column(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::TableName => "table_name",
            SortField::Email => "email",
            SortField::SavedEmail => "saved_email",
            SortField::TaskDescription => "task_description",
            SortField::Completed => "completed",
            SortField::CreatedAt => "created_at",
            SortField::LastUpdated => "last_updated",
        }
    }

    /// ORDER BY expression for this column.
    pub(crate) fn order_expr(self) -> String {
        match self {
            // Fixed-width timestamps and 0/1 flags compare correctly as-is.
            SortField::Completed | SortField::CreatedAt | SortField::LastUpdated => {
                self.column().to_string()
            }
            _ => format!("{} COLLATE NOCASE", self.column()),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for SortField {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|field| field.column() == s)
            .ok_or_else(|| StoreError::InvalidSortField(s.to_string()))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for SortOrder {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(StoreError::InvalidSortOrder(s.to_string())),
        }
    }
}

/// Parse a stored timestamp.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
}

/// Render a timestamp in storage format.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

mod timestamp {
    use super::{format_timestamp, parse_timestamp};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
