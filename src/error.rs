//! Structured error types for the store and controller.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Caller errors raised by the store before anything reaches SQLite.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The requested ordering column is not in the allow-list.
    #[error("invalid sort field '{0}'")]
    InvalidSortField(String),

    #[error("invalid sort order '{0}', expected asc or desc")]
    InvalidSortOrder(String),

    /// Explicit timestamps must come as a pair with `created_at <= last_updated`.
    #[error("invalid timestamps: {0}")]
    InvalidTimestamps(String),

    /// The connection could not be acquired.
    #[error("storage unavailable: {0}")]
    Storage(String),
}

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Selection / input
    MissingSelection,
    MissingRequiredField,
    InvalidFieldValue,
    ReadOnly,
    InvalidState,

    // Not found
    TaskNotFound,

    // Failures
    DatabaseError,
    InternalError,
}

/// A user-facing error with a stable code.
#[derive(Debug, Serialize)]
pub struct TaskError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl TaskError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    // Convenience constructors

    /// `action` is the gerund shown to the user, e.g. "deletion".
    pub fn no_selection(action: &str) -> Self {
        Self::new(
            ErrorCode::MissingSelection,
            format!("No task selected for {}.", action),
        )
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("{} is required", field),
        )
        .with_field(field)
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, reason).with_field(field)
    }

    pub fn read_only() -> Self {
        Self::new(ErrorCode::ReadOnly, "This form is read-only.")
    }

    /// The action is not offered in the current view.
    pub fn unavailable(action: &str, view: &str) -> Self {
        Self::new(
            ErrorCode::InvalidState,
            format!("Cannot {} in the {} view.", action, view),
        )
    }

    pub fn task_not_found() -> Self {
        Self::new(ErrorCode::TaskNotFound, "Task not found.")
    }

    /// `verb` is the failed action, e.g. "archive".
    pub fn failed(verb: &str) -> Self {
        Self::new(ErrorCode::TaskNotFound, format!("Failed to {} task.", verb))
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TaskError {}

impl From<StoreError> for TaskError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidSortField(_) => {
                TaskError::invalid_value("sort_field", &err.to_string())
            }
            StoreError::InvalidSortOrder(_) => {
                TaskError::invalid_value("sort_order", &err.to_string())
            }
            StoreError::InvalidTimestamps(_) => {
                TaskError::invalid_value("created_at", &err.to_string())
            }
            StoreError::Storage(_) => TaskError::database(err),
        }
    }
}

// Allow using ? with anyhow errors by converting them
impl From<anyhow::Error> for TaskError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<TaskError>() {
            Ok(task_err) => return task_err,
            Err(err) => err,
        };
        let err = match err.downcast::<StoreError>() {
            Ok(store_err) => return store_err.into(),
            Err(err) => err,
        };
        match err.downcast::<rusqlite::Error>() {
            Ok(sql_err) => TaskError::database(sql_err),
            Err(err) => TaskError::internal(err),
        }
    }
}

/// Result type for controller operations.
pub type TaskResult<T> = std::result::Result<T, TaskError>;
