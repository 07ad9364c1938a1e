//! Task controller: session view state and user intents.
//!
//! The controller owns two pieces of session state, the current view
//! (active or archived) and the per-field sort memory. Every mutation goes
//! through the store and ends with a fresh list being pushed to the
//! presenter; the displayed list is never patched in place.

use crate::db::Database;
use crate::error::{TaskError, TaskResult};
use crate::form::RecordForm;
use crate::types::{SortField, SortOrder, Task, TaskFields, TaskFilter, TaskId, TaskSummary};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Which partition of tasks is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Active,
    Archived,
}

impl View {
    pub fn toggled(self) -> Self {
        match self {
            View::Active => View::Archived,
            View::Archived => View::Active,
        }
    }

    pub fn filter(self) -> TaskFilter {
        match self {
            View::Active => TaskFilter::Active,
            View::Archived => TaskFilter::Archived,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            View::Active => "active",
            View::Archived => "archived",
        }
    }

    /// Whether the intent is offered in this view. Creating, editing,
    /// deleting and archiving belong to the active view; unarchiving to the
    /// archived one.
    pub fn allows(self, intent: &Intent) -> bool {
        match intent {
            Intent::Add | Intent::Edit(_) | Intent::Delete(_) | Intent::Archive(_) => {
                self == View::Active
            }
            Intent::Unarchive(_) => self == View::Archived,
            Intent::ViewDetails(_)
            | Intent::ToggleSort(_)
            | Intent::SwitchView
            | Intent::Refresh => true,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user action raised by the presenter. Targets carry the selected id
/// explicitly; `None` means nothing was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Add,
    Edit(Option<TaskId>),
    Delete(Option<TaskId>),
    Archive(Option<TaskId>),
    Unarchive(Option<TaskId>),
    ViewDetails(Option<TaskId>),
    ToggleSort(SortField),
    SwitchView,
    Refresh,
}

impl Intent {
    fn label(&self) -> &'static str {
        match self {
            Intent::Add => "add tasks",
            Intent::Edit(_) => "edit tasks",
            Intent::Delete(_) => "delete tasks",
            Intent::Archive(_) => "archive tasks",
            Intent::Unarchive(_) => "unarchive tasks",
            Intent::ViewDetails(_) => "view tasks",
            Intent::ToggleSort(_) => "sort tasks",
            Intent::SwitchView => "switch views",
            Intent::Refresh => "refresh",
        }
    }
}

/// Display surface driven by the controller.
pub trait Presenter {
    /// Replace the displayed list.
    fn show_tasks(&mut self, tasks: &[TaskSummary]);

    /// Reconfigure controls after the view changed.
    fn set_view_mode(&mut self, view: View);

    /// Show a record form. Returns the field map on confirm, `None` on cancel.
    /// Read-only forms return value is ignored.
    fn show_form(&mut self, form: &RecordForm) -> Option<HashMap<String, String>>;

    /// Ask a yes/no question.
    fn confirm(&mut self, title: &str, message: &str) -> bool;

    fn info(&mut self, title: &str, message: &str);

    fn error(&mut self, err: &TaskError);
}

/// Bridges presenter intents to the task store.
pub struct TaskController<P: Presenter> {
    db: Database,
    presenter: P,
    current_view: View,
    /// Last applied direction per field.
    sort_order: HashMap<SortField, SortOrder>,
    /// Sort of the list currently displayed, reused after mutations.
    active_sort: Option<(SortField, SortOrder)>,
    displayed: Vec<Task>,
}

impl<P: Presenter> TaskController<P> {
    pub fn new(db: Database, presenter: P) -> Self {
        let sort_order = HashMap::from([
            (SortField::TableName, SortOrder::Desc),
            (SortField::LastUpdated, SortOrder::Desc),
        ]);
        Self {
            db,
            presenter,
            current_view: View::Active,
            sort_order,
            active_sort: None,
            displayed: Vec::new(),
        }
    }

    pub fn current_view(&self) -> View {
        self.current_view
    }

    /// Last applied direction for a field; unseen fields report `Desc`.
    pub fn sort_order(&self, field: SortField) -> SortOrder {
        self.sort_order.get(&field).copied().unwrap_or(SortOrder::Desc)
    }

    /// The list most recently handed to the presenter.
    pub fn displayed(&self) -> &[Task] {
        &self.displayed
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Re-derive the displayed list for the current view.
    pub fn refresh(&mut self, sort_by: Option<SortField>, order: SortOrder) -> Result<Vec<Task>> {
        self.apply_sort(sort_by, order);
        self.show(self.current_view.filter())
    }

    /// Set the sort used by later refreshes without re-listing.
    pub fn apply_sort(&mut self, sort_by: Option<SortField>, order: SortOrder) {
        self.active_sort = sort_by.map(|field| (field, order));
    }

    /// Refresh keeping whatever sort is currently applied.
    pub fn refresh_current(&mut self) -> Result<Vec<Task>> {
        self.show(self.current_view.filter())
    }

    /// Display tasks by completion state without changing the view.
    /// `None` lists every task.
    pub fn load_tasks(&mut self, completed: Option<bool>) -> Result<Vec<Task>> {
        self.show(TaskFilter::from(completed))
    }

    fn show(&mut self, filter: TaskFilter) -> Result<Vec<Task>> {
        let (sort_by, order) = match self.active_sort {
            Some((field, order)) => (Some(field), order),
            None => (None, SortOrder::Asc),
        };
        let tasks = self.db.list_tasks(filter, sort_by, order)?;
        debug!(
            view = %self.current_view,
            count = tasks.len(),
            sort = ?sort_by,
            order = %order,
            "Task list refreshed"
        );
        let summaries: Vec<TaskSummary> = tasks.iter().map(Task::summary).collect();
        self.presenter.show_tasks(&summaries);
        self.displayed = tasks.clone();
        Ok(tasks)
    }

    /// Flip the remembered direction for `field` and re-sort by it.
    pub fn toggle_sort(&mut self, field: SortField) -> Result<Vec<Task>> {
        let order = self.sort_order(field).toggled();
        self.sort_order.insert(field, order);
        self.refresh(Some(field), order)
    }

    /// Flip between the active and archived views.
    pub fn switch_view(&mut self) -> Result<Vec<Task>> {
        self.current_view = self.current_view.toggled();
        info!(view = %self.current_view, "Switched view");
        let tasks = self.refresh_current()?;
        self.presenter.set_view_mode(self.current_view);
        Ok(tasks)
    }

    /// Update the task when `task_id` is given, otherwise create one.
    /// Returns the saved id, or `None` when the update target is gone.
    pub fn create_or_update(
        &mut self,
        task_id: Option<TaskId>,
        fields: &TaskFields,
    ) -> Result<Option<TaskId>> {
        let saved = match task_id {
            Some(id) => {
                if self.db.update_task(id, fields)? {
                    Some(id)
                } else {
                    self.presenter.error(&TaskError::failed("update"));
                    None
                }
            }
            None => Some(self.db.create_task(fields)?),
        };
        self.refresh_current()?;
        Ok(saved)
    }

    /// Delete after confirmation. Returns true when a task was removed.
    pub fn delete(&mut self, task_id: Option<TaskId>) -> Result<bool> {
        let Some(id) = task_id else {
            self.presenter.error(&TaskError::no_selection("deletion"));
            return Ok(false);
        };
        if !self
            .presenter
            .confirm("Confirm Deletion", "Are you sure you want to delete this task?")
        {
            return Ok(false);
        }
        let deleted = self.db.delete_task(id)?;
        self.report(deleted, "delete", "deleted")?;
        Ok(deleted)
    }

    /// Move a task to the archived partition.
    pub fn archive(&mut self, task_id: Option<TaskId>) -> Result<bool> {
        self.set_completed(task_id, true)
    }

    /// Move a task back to the active partition.
    pub fn unarchive(&mut self, task_id: Option<TaskId>) -> Result<bool> {
        self.set_completed(task_id, false)
    }

    fn set_completed(&mut self, task_id: Option<TaskId>, completed: bool) -> Result<bool> {
        let (verb, gerund, past) = if completed {
            ("archive", "archiving", "archived")
        } else {
            ("unarchive", "unarchiving", "unarchived")
        };
        let Some(id) = task_id else {
            self.presenter.error(&TaskError::no_selection(gerund));
            return Ok(false);
        };
        let changed = self.db.set_completed(id, completed)?;
        self.report(changed, verb, past)?;
        Ok(changed)
    }

    /// Tell the user how a targeted operation went; refresh only on success.
    fn report(&mut self, success: bool, verb: &str, past: &str) -> Result<()> {
        if success {
            self.presenter
                .info("Success", &format!("Task successfully {}.", past));
            self.refresh_current()?;
        } else {
            self.presenter.error(&TaskError::failed(verb));
        }
        Ok(())
    }

    /// Show a task read-only with its description expanded.
    pub fn view_details(&mut self, task_id: Option<TaskId>) -> Result<bool> {
        let Some(id) = task_id else {
            self.presenter.error(&TaskError::no_selection("viewing"));
            return Ok(false);
        };
        match self.db.get_task(id)? {
            Some(task) => {
                self.presenter.show_form(&RecordForm::view(&task));
                Ok(true)
            }
            None => {
                self.presenter.error(&TaskError::task_not_found());
                Ok(false)
            }
        }
    }

    /// Open the add form (no id) or the edit form, then save on confirm.
    pub fn open_task_form(&mut self, task_id: Option<TaskId>) -> Result<Option<TaskId>> {
        let form = match task_id {
            Some(id) => match self.db.get_task(id)? {
                Some(task) => RecordForm::edit(&task),
                None => {
                    self.presenter.error(&TaskError::task_not_found());
                    return Ok(None);
                }
            },
            None => RecordForm::create(),
        };
        let Some(values) = self.presenter.show_form(&form) else {
            return Ok(None);
        };
        match form.submit(values) {
            Ok(fields) => self.create_or_update(task_id, &fields),
            Err(err) => {
                self.presenter.error(&err);
                Ok(None)
            }
        }
    }

    /// Route a presenter intent. Storage failures are shown to the user and
    /// returned.
    pub fn dispatch(&mut self, intent: Intent) -> TaskResult<()> {
        if !self.current_view.allows(&intent) {
            let err = TaskError::unavailable(intent.label(), self.current_view.as_str());
            self.presenter.error(&err);
            return Err(err);
        }

        let result = match intent {
            Intent::Add => self.open_task_form(None).map(drop),
            Intent::Edit(None) => {
                self.presenter.error(&TaskError::no_selection("editing"));
                Ok(())
            }
            Intent::Edit(id) => self.open_task_form(id).map(drop),
            Intent::Delete(id) => self.delete(id).map(drop),
            Intent::Archive(id) => self.archive(id).map(drop),
            Intent::Unarchive(id) => self.unarchive(id).map(drop),
            Intent::ViewDetails(id) => self.view_details(id).map(drop),
            Intent::ToggleSort(field) => self.toggle_sort(field).map(drop),
            Intent::SwitchView => self.switch_view().map(drop),
            Intent::Refresh => self.refresh_current().map(drop),
        };

        result.map_err(|err| {
            warn!(error = %err, ?intent, "Operation failed");
            let err = TaskError::from(err);
            self.presenter.error(&err);
            err
        })
    }
}
