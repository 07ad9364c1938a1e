//! Task CRUD, filtering and ordering.

use super::{Database, now};
use crate::error::StoreError;
use crate::types::{
    SortField, SortOrder, Task, TaskFields, TaskFilter, TaskId, format_timestamp, parse_timestamp,
};
use anyhow::Result;
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

const TASK_COLUMNS: &str = "id, name, table_name, email, saved_email, task_description, \
                            completed, created_at, last_updated";

/// Build the ORDER BY clause. Column names only ever come from [`SortField`].
/// The id breaks ties in the same direction, so flipping the order reverses
/// the whole list.
fn build_order_clause(sort_by: Option<SortField>, order: SortOrder) -> String {
    match sort_by {
        Some(field) => format!(
            " ORDER BY {} {}, id {}",
            field.order_expr(),
            order.as_sql(),
            order.as_sql()
        ),
        None => " ORDER BY id ASC".to_string(),
    }
}

fn timestamp_column(row: &Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

/// Text columns may be NULL in databases written by older versions.
fn text_column(row: &Row, name: &str) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(name)?.unwrap_or_default())
}

/// Parse a row selected with [`TASK_COLUMNS`].
pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let completed: i64 = row.get("completed")?;

    Ok(Task {
        id: row.get("id")?,
        name: text_column(row, "name")?,
        table_name: text_column(row, "table_name")?,
        email: text_column(row, "email")?,
        saved_email: text_column(row, "saved_email")?,
        task_description: text_column(row, "task_description")?,
        completed: completed != 0,
        created_at: timestamp_column(row, 7)?,
        last_updated: timestamp_column(row, 8)?,
    })
}

/// Internal helper to get a task using an existing connection.
fn get_task_internal(conn: &Connection, task_id: TaskId) -> Result<Option<Task>> {
    let sql = format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS);
    let task = conn
        .query_row(&sql, params![task_id], parse_task_row)
        .optional()?;
    Ok(task)
}

impl Database {
    /// List tasks, optionally filtered by completion and ordered by an
    /// allow-listed field. Without a sort field the order is insertion order.
    pub fn list_tasks(
        &self,
        filter: TaskFilter,
        sort_by: Option<SortField>,
        order: SortOrder,
    ) -> Result<Vec<Task>> {
        let mut sql = format!("SELECT {} FROM tasks", TASK_COLUMNS);
        let completed = filter.completed();
        if completed.is_some() {
            sql.push_str(" WHERE completed = ?1");
        }
        sql.push_str(&build_order_clause(sort_by, order));

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = match completed {
                Some(flag) => stmt.query_map(params![flag], parse_task_row)?,
                None => stmt.query_map([], parse_task_row)?,
            };
            let tasks = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// List tasks with caller-supplied sort text. Unknown fields or
    /// directions are rejected before any SQL is built.
    pub fn list_tasks_by_name(
        &self,
        filter: TaskFilter,
        sort_by: Option<&str>,
        order: &str,
    ) -> Result<Vec<Task>> {
        let sort_by = sort_by.map(str::parse::<SortField>).transpose()?;
        let order = order.parse::<SortOrder>()?;
        self.list_tasks(filter, sort_by, order)
    }

    /// Count tasks matching the filter.
    pub fn count_tasks(&self, filter: TaskFilter) -> Result<i64> {
        self.with_conn(|conn| {
            let count = match filter.completed() {
                Some(flag) => conn.query_row(
                    "SELECT COUNT(*) FROM tasks WHERE completed = ?1",
                    params![flag],
                    |row| row.get(0),
                )?,
                None => conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?,
            };
            Ok(count)
        })
    }

    /// Get a task by id. `None` when no record matches.
    pub fn get_task(&self, task_id: TaskId) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id))
    }

    /// Create a task stamped with the current time.
    pub fn create_task(&self, fields: &TaskFields) -> Result<TaskId> {
        self.create_task_at(fields, None, None)
    }

    /// Create a task with explicit timestamps. Both or neither must be given.
    pub fn create_task_at(
        &self,
        fields: &TaskFields,
        created_at: Option<NaiveDateTime>,
        last_updated: Option<NaiveDateTime>,
    ) -> Result<TaskId> {
        let (created_at, last_updated) = match (created_at, last_updated) {
            (None, None) => {
                let now = now();
                (now, now)
            }
            (Some(created), Some(updated)) if created <= updated => (created, updated),
            (Some(_), Some(_)) => {
                return Err(StoreError::InvalidTimestamps(
                    "created_at is later than last_updated".into(),
                )
                .into());
            }
            _ => {
                return Err(StoreError::InvalidTimestamps(
                    "created_at and last_updated must be supplied together".into(),
                )
                .into());
            }
        };

        let task_id = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (
                    name, table_name, email, saved_email, task_description,
                    completed, created_at, last_updated
                ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7)",
                params![
                    fields.name,
                    fields.table_name,
                    fields.email,
                    fields.saved_email,
                    fields.task_description,
                    format_timestamp(&created_at),
                    format_timestamp(&last_updated),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        debug!(task_id, "Task created");
        Ok(task_id)
    }

    /// Rewrite all editable fields and refresh `last_updated`.
    /// Returns false when the task does not exist.
    pub fn update_task(&self, task_id: TaskId, fields: &TaskFields) -> Result<bool> {
        let now = format_timestamp(&now());
        let changed = self.with_conn(|conn| {
            // MAX keeps last_updated monotonic if the wall clock steps back.
            let changed = conn.execute(
                "UPDATE tasks SET
                    name = ?1, table_name = ?2, email = ?3, saved_email = ?4,
                    task_description = ?5, last_updated = MAX(?6, last_updated)
                 WHERE id = ?7",
                params![
                    fields.name,
                    fields.table_name,
                    fields.email,
                    fields.saved_email,
                    fields.task_description,
                    now,
                    task_id,
                ],
            )?;
            Ok(changed)
        })?;

        debug!(task_id, updated = changed > 0, "Task update");
        Ok(changed > 0)
    }

    /// Hard-delete a task. Returns false when it did not exist.
    pub fn delete_task(&self, task_id: TaskId) -> Result<bool> {
        let changed = self.with_conn(|conn| {
            let sql = "DELETE FROM tasks WHERE id = ?1";
            Ok(conn.execute(sql, params![task_id])?)
        })?;

        debug!(task_id, deleted = changed > 0, "Task delete");
        Ok(changed > 0)
    }

    /// Set the completion flag. Leaves `last_updated` untouched.
    /// Returns false when the task does not exist.
    pub fn set_completed(&self, task_id: TaskId, completed: bool) -> Result<bool> {
        let changed = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE tasks SET completed = ?1 WHERE id = ?2",
                params![completed, task_id],
            )?)
        })?;

        debug!(task_id, completed, found = changed > 0, "Task completion set");
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_clause_defaults_to_insertion_order() {
        assert_eq!(
            build_order_clause(None, SortOrder::Desc),
            " ORDER BY id ASC"
        );
    }

    #[test]
    fn order_clause_uses_collation_for_text() {
        assert_eq!(
            build_order_clause(Some(SortField::Name), SortOrder::Desc),
            " ORDER BY name COLLATE NOCASE DESC, id DESC"
        );
    }

    #[test]
    fn order_clause_leaves_timestamps_uncollated() {
        assert_eq!(
            build_order_clause(Some(SortField::CreatedAt), SortOrder::Asc),
            " ORDER BY created_at ASC, id ASC"
        );
    }

    #[test]
    fn null_text_columns_read_as_empty() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TABLE legacy (id INTEGER PRIMARY KEY, name TEXT, table_name TEXT,
                    email TEXT, saved_email TEXT, task_description TEXT, completed INTEGER,
                    created_at TEXT, last_updated TEXT);
                 INSERT INTO legacy VALUES (1, 'n', NULL, NULL, NULL, NULL, 1,
                    '2024-01-01 00:00:00', '2024-01-01 00:00:00');",
            )?;
            let task = conn.query_row(
                &format!("SELECT {} FROM legacy", TASK_COLUMNS),
                [],
                parse_task_row,
            )?;
            assert_eq!(task.table_name, "");
            assert!(task.completed);
            Ok(())
        })
        .unwrap();
    }
}
