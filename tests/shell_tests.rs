//! End-to-end sessions through the terminal presenter.

use std::io::Cursor;
use taskbook::cli::shell::{self, TerminalPresenter};
use taskbook::controller::{TaskController, View};
use taskbook::db::Database;
use taskbook::format::OutputFormat;
use taskbook::types::{TaskFields, TaskFilter};

type Session = TaskController<TerminalPresenter<Cursor<Vec<u8>>, Vec<u8>, Vec<u8>>>;

fn session(db: Database, script: &str) -> Session {
    let presenter = TerminalPresenter::new(
        Cursor::new(script.as_bytes().to_vec()),
        Vec::new(),
        Vec::new(),
        OutputFormat::Text,
    );
    TaskController::new(db, presenter)
}

fn stdout(s: &Session) -> String {
    String::from_utf8(s.presenter().output().clone()).unwrap()
}

fn stderr(s: &Session) -> String {
    String::from_utf8(s.presenter().errors().clone()).unwrap()
}

#[test]
fn add_archive_and_switch() {
    let db = Database::open_in_memory().unwrap();
    let script =
        "add\nWrite report\nfinance\n\n\nQuarterly numbers\n.\ny\narchive 1\nswitch\nquit\n";
    let mut s = session(db.clone(), script);

    shell::run(&mut s).unwrap();

    let task = db.get_task(1).unwrap().expect("created");
    assert_eq!(task.name, "Write report");
    assert_eq!(task.table_name, "finance");
    assert_eq!(task.task_description, "Quarterly numbers");
    assert!(task.completed);
    assert_eq!(s.current_view(), View::Archived);
    let out = stdout(&s);
    assert!(out.contains("Task successfully archived."));
    assert!(out.contains("Showing archived tasks."));
    assert!(out.trim_end().ends_with("archived>"));
    assert!(stderr(&s).is_empty());
}

#[test]
fn errors_do_not_end_the_session() {
    let db = Database::open_in_memory().unwrap();
    db.create_task(&TaskFields::new("keep", "t", "", "", "")).unwrap();
    let script = "delete\nsort completed;DROP\nbogus\ndelete 1\nn\nlist\n";
    let mut s = session(db.clone(), script);

    shell::run(&mut s).unwrap();

    let err = stderr(&s);
    assert!(err.contains("Error: No task selected for deletion."));
    assert!(err.contains("invalid sort field"));
    assert!(err.contains("unknown command 'bogus'"));
    // Declined confirmation
    assert_eq!(db.count_tasks(TaskFilter::All).unwrap(), 1);
}

#[test]
fn archived_view_blocks_add() {
    let db = Database::open_in_memory().unwrap();
    let mut s = session(db.clone(), "switch\nadd\n");

    shell::run(&mut s).unwrap();

    let err = stderr(&s);
    assert!(err.contains("Cannot add tasks in the archived view."));
    assert_eq!(db.count_tasks(TaskFilter::All).unwrap(), 0);
}

#[test]
fn sort_toggles_between_runs_of_the_command() {
    let db = Database::open_in_memory().unwrap();
    db.create_task(&TaskFields::new("A", "Zeta", "", "", "")).unwrap();
    db.create_task(&TaskFields::new("B", "alpha", "", "", "")).unwrap();
    let mut s = session(db, "sort table_name\nsort table_name\n");

    shell::run(&mut s).unwrap();

    let names: Vec<&str> = s.displayed().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    let out = stdout(&s);
    let asc = out.find("2  B\n1  A\n").expect("ascending listing");
    let desc = out.rfind("1  A\n2  B\n").expect("descending listing");
    assert!(asc < desc);
}

#[test]
fn show_prints_expanded_description() {
    let db = Database::open_in_memory().unwrap();
    let fields = TaskFields::new("Plan", "ops", "a@b.c", "", "step one\nstep two");
    db.create_task(&fields).unwrap();
    let mut s = session(db, "show 1\n");

    shell::run(&mut s).unwrap();

    let out = stdout(&s);
    assert!(out.contains("== View Task =="));
    assert!(out.contains("Description:\n  step one\n  step two\n"));
}
