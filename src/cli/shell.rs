//! Line-based terminal presenter and the interactive session loop.

use crate::controller::{Intent, Presenter, TaskController, View};
use crate::db::Database;
use crate::error::TaskError;
use crate::form::RecordForm;
use crate::format::{OutputFormat, format_form, format_summaries};
use crate::types::{SortField, TaskFilter, TaskId, TaskSummary};
use anyhow::Result;
use serde_json::json;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// Terminal surface: lists and messages go to `out`, errors to `err`,
/// answers and form values are read from `input`.
pub struct TerminalPresenter<R, W, E> {
    input: R,
    out: W,
    err: E,
    format: OutputFormat,
    /// Answer yes to confirmations without asking.
    assume_yes: bool,
    /// Suppress success messages and list output (one-shot mutations).
    quiet: bool,
}

impl<R: BufRead, W: Write, E: Write> TerminalPresenter<R, W, E> {
    pub fn new(input: R, out: W, err: E, format: OutputFormat) -> Self {
        Self {
            input,
            out,
            err,
            format,
            assume_yes: false,
            quiet: false,
        }
    }

    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn set_quiet(&mut self, quiet: bool) {
        self.quiet = quiet;
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn errors(&self) -> &E {
        &self.err
    }

    /// Print a prompt and read one line without its terminator.
    /// `None` at end of input.
    pub fn read_line(&mut self, prompt: &str) -> Option<String> {
        let _ = write!(self.out, "{}", prompt);
        let _ = self.out.flush();
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
            Err(e) => {
                warn!(error = %e, "Failed to read input, ending session");
                None
            }
        }
    }

    /// Read lines until a lone `.`; an empty first line keeps `current`.
    fn read_multiline(&mut self, label: &str, current: &str) -> Option<String> {
        let _ = writeln!(
            self.out,
            "{} (finish with '.' on its own line, empty line keeps current):",
            label
        );
        let mut lines = Vec::new();
        loop {
            let line = self.read_line("| ")?;
            if lines.is_empty() && line.is_empty() {
                return Some(current.to_string());
            }
            if line == "." {
                break;
            }
            lines.push(line);
        }
        Some(lines.join("\n"))
    }

    pub fn message(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text);
    }
}

impl<R: BufRead, W: Write, E: Write> Presenter for TerminalPresenter<R, W, E> {
    fn show_tasks(&mut self, tasks: &[TaskSummary]) {
        if self.quiet {
            return;
        }
        let _ = write!(self.out, "{}", format_summaries(tasks, self.format));
        if self.format == OutputFormat::Json {
            let _ = writeln!(self.out);
        }
    }

    fn set_view_mode(&mut self, view: View) {
        if self.quiet {
            return;
        }
        let (name, commands) = match view {
            View::Active => ("active", "add, edit, delete, archive, show, sort, switch"),
            View::Archived => ("archived", "unarchive, show, sort, switch"),
        };
        self.message(&format!("Showing {} tasks. Commands: {}", name, commands));
    }

    fn show_form(&mut self, form: &RecordForm) -> Option<HashMap<String, String>> {
        if !form.editable {
            let text = match self.format {
                OutputFormat::Text => format_form(form),
                OutputFormat::Json => format!("{}\n", json!(form.values)),
            };
            let _ = write!(self.out, "{}", text);
            return None;
        }

        self.message(&format!("== {} ==", form.title));
        let mut values = HashMap::new();
        for spec in &form.fields {
            let current = form.value(spec.key).to_string();
            let value = if form.is_expanded(spec) {
                self.read_multiline(spec.label, &current)?
            } else {
                let line = self.read_line(&format!("{} [{}]: ", spec.label, current))?;
                if line.is_empty() { current } else { line }
            };
            values.insert(spec.key.to_string(), value);
        }

        let answer = self.read_line("Save? [Y/n] ")?;
        if answer.trim().eq_ignore_ascii_case("n") || answer.trim().eq_ignore_ascii_case("no") {
            return None;
        }
        Some(values)
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        match self.read_line(&format!("{}: {} [y/N] ", title, message)) {
            Some(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            None => false,
        }
    }

    fn info(&mut self, _title: &str, message: &str) {
        if !self.quiet {
            self.message(message);
        }
    }

    fn error(&mut self, err: &TaskError) {
        let _ = match self.format {
            OutputFormat::Text => writeln!(self.err, "Error: {}", err),
            OutputFormat::Json => writeln!(self.err, "{}", json!({ "error": err })),
        };
    }
}

/// One parsed shell line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    Intent(Intent),
    ShowAll,
    Status,
    Help,
    Quit,
    Empty,
}

pub const HELP: &str = "\
Commands:
  list                 refresh the current view
  all                  list every task, active and archived
  add                  create a task
  edit ID              edit a task
  show ID              show every field of a task
  delete ID            delete a task
  archive ID           move a task to the archive
  unarchive ID         move a task back to the active view
  sort FIELD           sort by FIELD, toggling direction on repeat
  switch               switch between active and archived views
  status               count active and archived tasks
  help                 this text
  quit                 leave";

fn parse_id(arg: Option<&str>) -> Result<Option<TaskId>, TaskError> {
    match arg {
        None => Ok(None),
        Some(raw) => match raw.parse::<TaskId>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                let reason = format!("'{}' is not a task id", raw);
                Err(TaskError::invalid_value("id", &reason))
            }
        },
    }
}

/// Parse a shell line into a command.
pub fn parse_command(line: &str) -> Result<ShellCommand, TaskError> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(ShellCommand::Empty);
    };
    let arg = words.next();

    let command = match word.to_ascii_lowercase().as_str() {
        "list" | "ls" | "refresh" => ShellCommand::Intent(Intent::Refresh),
        "all" => ShellCommand::ShowAll,
        "add" | "new" => ShellCommand::Intent(Intent::Add),
        "edit" => ShellCommand::Intent(Intent::Edit(parse_id(arg)?)),
        "show" | "view" => ShellCommand::Intent(Intent::ViewDetails(parse_id(arg)?)),
        "delete" | "rm" => ShellCommand::Intent(Intent::Delete(parse_id(arg)?)),
        "archive" => ShellCommand::Intent(Intent::Archive(parse_id(arg)?)),
        "unarchive" => ShellCommand::Intent(Intent::Unarchive(parse_id(arg)?)),
        "sort" => {
            let field = arg.ok_or_else(|| TaskError::missing_field("sort field"))?;
            let field: SortField = field.parse()?;
            ShellCommand::Intent(Intent::ToggleSort(field))
        }
        "switch" => ShellCommand::Intent(Intent::SwitchView),
        "status" => ShellCommand::Status,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => {
            return Err(TaskError::invalid_value(
                "command",
                &format!("unknown command '{}', try 'help'", other),
            ));
        }
    };
    Ok(command)
}

/// "N active, M archived" for the whole task file.
pub fn status_line(db: &Database) -> Result<String> {
    let active = db.count_tasks(TaskFilter::Active)?;
    let archived = db.count_tasks(TaskFilter::Archived)?;
    Ok(format!("{} active, {} archived", active, archived))
}

/// Run the interactive session until `quit` or end of input.
pub fn run<R, W, E>(controller: &mut TaskController<TerminalPresenter<R, W, E>>) -> Result<()>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let view = controller.current_view();
    controller.presenter_mut().set_view_mode(view);
    controller.refresh_current()?;

    loop {
        let prompt = format!("{}> ", controller.current_view());
        let Some(line) = controller.presenter_mut().read_line(&prompt) else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                controller.presenter_mut().error(&err);
                continue;
            }
        };
        debug!(?command, "Shell command");

        match command {
            ShellCommand::Empty => {}
            ShellCommand::Quit => break,
            ShellCommand::Help => controller.presenter_mut().message(HELP),
            ShellCommand::Status => match status_line(controller.database()) {
                Ok(line) => controller.presenter_mut().message(&line),
                Err(err) => controller.presenter_mut().error(&TaskError::from(err)),
            },
            ShellCommand::ShowAll => {
                if let Err(err) = controller.load_tasks(None) {
                    controller.presenter_mut().error(&TaskError::from(err));
                }
            }
            // Reported to the user by the controller; the session carries on.
            ShellCommand::Intent(intent) => {
                let _ = controller.dispatch(intent);
            }
        }
    }
    Ok(())
}
