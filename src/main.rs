//! Taskbook
//!
//! Personal task tracker: one SQLite file, an active list and an archive.

use anyhow::Result;
use clap::Parser;
use std::io::{self, BufReader};
use std::process::ExitCode;
use taskbook::cli::shell::{self, TerminalPresenter};
use taskbook::cli::{Cli, Command, commands};
use taskbook::config::{Config, ConfigLoader, ConfigPaths};
use taskbook::controller::TaskController;
use taskbook::db::Database;
use taskbook::logging::{self, LogTarget};
use taskbook::paths;
use tracing::{debug, info};

type Terminal = TerminalPresenter<BufReader<io::Stdin>, io::Stdout, io::Stderr>;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration, the --config flag acting as the explicit tier
    let mut config_paths = ConfigPaths::discover();
    if let Some(config_path) = &cli.config {
        config_paths.explicit_file = Some(config_path.into());
    }
    let mut loader = ConfigLoader::load_with_paths(config_paths)?;

    // Override from CLI arguments
    let config = loader.config_mut();
    if let Some(db_path) = &cli.database {
        config.storage.db_path = Some(db_path.into());
    }
    if let Some(format) = cli.format {
        config.display.format = format;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    logging::init(&LogTarget::parse(&cli.log), &loader.config().logging.level)?;
    if let Some(path) = loader.config_path() {
        debug!(path = %path.display(), "Loaded config");
    }

    let config = loader.into_config();
    let db_path = paths::prepare_db_path(&config)?;
    let db = Database::open(&db_path)?;
    info!(path = %db_path.display(), "Task database ready");

    let command = cli.command.unwrap_or(Command::Shell);
    let quiet = !matches!(command, Command::Shell | Command::List(_) | Command::Show { .. });
    let assume_yes = matches!(command, Command::Delete { yes: true, .. });
    let presenter = terminal(&config).quiet(quiet).assume_yes(assume_yes);
    let mut controller = TaskController::new(db, presenter);

    let ok = match command {
        Command::Shell => {
            shell::run(&mut controller)?;
            true
        }
        Command::List(args) => commands::list(&mut controller, &args)?,
        Command::Show { id } => controller.view_details(Some(id))?,
        Command::Add(fields) => {
            let id = commands::add(&mut controller, fields)?;
            if let Some(id) = id {
                println!("{}", id);
            }
            id.is_some()
        }
        Command::Edit { id, fields } => commands::edit(&mut controller, id, fields)?,
        Command::Delete { id, .. } => controller.delete(Some(id))?,
        Command::Archive { id } => controller.archive(Some(id))?,
        Command::Unarchive { id } => controller.unarchive(Some(id))?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn terminal(config: &Config) -> Terminal {
    TerminalPresenter::new(
        BufReader::new(io::stdin()),
        io::stdout(),
        io::stderr(),
        config.display.format,
    )
}
