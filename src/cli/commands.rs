//! One-shot subcommands run against a controller.

use super::shell::TerminalPresenter;
use super::{FieldArgs, ListArgs};
use crate::controller::{Presenter, TaskController};
use crate::error::TaskError;
use crate::types::{TaskFields, TaskId};
use anyhow::Result;
use std::io::{BufRead, Write};

type Controller<R, W, E> = TaskController<TerminalPresenter<R, W, E>>;

/// `list`: the active view by default, `--archived` or `--all` otherwise,
/// sorted by `--sort`/`--order` in every case.
pub fn list<R, W, E>(controller: &mut Controller<R, W, E>, args: &ListArgs) -> Result<bool>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    if args.all {
        controller.apply_sort(args.sort, args.order);
        controller.load_tasks(None)?;
        return Ok(true);
    }
    if args.archived {
        // Switch quietly; only the final list is printed.
        controller.presenter_mut().set_quiet(true);
        let switched = controller.switch_view();
        controller.presenter_mut().set_quiet(false);
        switched?;
    }
    controller.refresh(args.sort, args.order)?;
    Ok(true)
}

/// `add`: omitted fields are stored empty.
pub fn add<R, W, E>(
    controller: &mut Controller<R, W, E>,
    args: FieldArgs,
) -> Result<Option<TaskId>>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let fields = TaskFields {
        name: args.name.unwrap_or_default(),
        table_name: args.table_name.unwrap_or_default(),
        email: args.email.unwrap_or_default(),
        saved_email: args.saved_email.unwrap_or_default(),
        task_description: args.description.unwrap_or_default(),
    };
    controller.create_or_update(None, &fields)
}

/// `edit ID`: omitted fields keep their stored value.
pub fn edit<R, W, E>(
    controller: &mut Controller<R, W, E>,
    id: TaskId,
    args: FieldArgs,
) -> Result<bool>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let Some(task) = controller.database().get_task(id)? else {
        controller.presenter_mut().error(&TaskError::task_not_found());
        return Ok(false);
    };
    let current = task.fields();
    let fields = TaskFields {
        name: args.name.unwrap_or(current.name),
        table_name: args.table_name.unwrap_or(current.table_name),
        email: args.email.unwrap_or(current.email),
        saved_email: args.saved_email.unwrap_or(current.saved_email),
        task_description: args.description.unwrap_or(current.task_description),
    };
    Ok(controller.create_or_update(Some(id), &fields)?.is_some())
}
