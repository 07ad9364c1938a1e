//! CLI command definitions for taskbook.
//!
//! Every subcommand drives the same controller the interactive shell uses;
//! one-shot commands are a shell session of a single intent.

pub mod commands;
pub mod shell;

use crate::format::OutputFormat;
use crate::types::{SortField, SortOrder, TaskId};
use clap::{Args, Parser, Subcommand};

/// Personal task tracker with an archive.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Output format (overrides config)
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive session (default if no subcommand given)
    Shell,

    /// List tasks
    List(ListArgs),

    /// Show every field of a task
    Show { id: TaskId },

    /// Create a task
    Add(FieldArgs),

    /// Rewrite a task's fields; omitted fields keep their value
    Edit {
        id: TaskId,
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Delete a task permanently
    Delete {
        id: TaskId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Move a task to the archive
    Archive { id: TaskId },

    /// Move a task back to the active list
    Unarchive { id: TaskId },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// List archived tasks instead of active ones
    #[arg(long, conflicts_with = "all")]
    pub archived: bool,

    /// List every task
    #[arg(long)]
    pub all: bool,

    /// Field to sort by
    #[arg(long, value_parser = parse_sort_field)]
    pub sort: Option<SortField>,

    /// Sort direction: asc or desc
    #[arg(long, default_value = "asc", value_parser = parse_sort_order)]
    pub order: SortOrder,
}

#[derive(Args, Debug, Default, Clone)]
pub struct FieldArgs {
    #[arg(long)]
    pub name: Option<String>,

    /// Grouping label
    #[arg(long = "table")]
    pub table_name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub saved_email: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
}

fn parse_sort_field(s: &str) -> Result<SortField, String> {
    s.parse().map_err(|e: crate::error::StoreError| e.to_string())
}

fn parse_sort_order(s: &str) -> Result<SortOrder, String> {
    s.parse().map_err(|e: crate::error::StoreError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_shell() {
        let cli = Cli::try_parse_from(["taskbook"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log, "2");
    }

    #[test]
    fn list_accepts_allow_listed_sort() {
        let cli = Cli::try_parse_from([
            "taskbook",
            "list",
            "--sort",
            "table_name",
            "--order",
            "desc",
        ])
        .unwrap();
        match cli.command {
            Some(Command::List(args)) => {
                assert_eq!(args.sort, Some(SortField::TableName));
                assert_eq!(args.order, SortOrder::Desc);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn list_rejects_unknown_sort() {
        let args = ["taskbook", "list", "--sort", "id; DROP TABLE tasks"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn archived_and_all_conflict() {
        let args = ["taskbook", "list", "--archived", "--all"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn edit_takes_partial_fields() {
        let cli = Cli::try_parse_from(["taskbook", "edit", "4", "--table", "ops"]).unwrap();
        match cli.command {
            Some(Command::Edit { id, fields }) => {
                assert_eq!(id, 4);
                assert_eq!(fields.table_name.as_deref(), Some("ops"));
                assert!(fields.name.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
