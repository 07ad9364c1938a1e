//! Database file location.
//!
//! Resolved once at startup. The default lives under the user's documents
//! directory; the parent directory is created if missing.

use crate::config::Config;
use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application directory under the documents folder.
const APP_DIR: &str = "taskbook";
const DB_FILE: &str = "tasks.db";

/// `<Documents>/taskbook/db/tasks.db`, falling back to `~/Documents` when
/// the platform has no documents directory.
pub fn default_db_path() -> Option<PathBuf> {
    let documents = dirs::document_dir().or_else(|| dirs::home_dir().map(|h| h.join("Documents")))?;
    Some(documents.join(APP_DIR).join("db").join(DB_FILE))
}

/// The configured database path, or the default one.
pub fn db_path(config: &Config) -> Result<PathBuf> {
    match config.storage.db_path {
        Some(ref path) => Ok(path.clone()),
        None => default_db_path().ok_or_else(|| anyhow!("no home directory for the task database")),
    }
}

/// Resolve the database path and make sure its directory exists.
pub fn prepare_db_path(config: &Config) -> Result<PathBuf> {
    let path = db_path(config)?;
    ensure_parent_dir(&path)?;
    Ok(path)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
        debug!(dir = %parent.display(), "Created database directory");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn configured_path_wins() {
        let mut config = Config::default();
        config.storage.db_path = Some(PathBuf::from("/srv/tasks.db"));
        assert_eq!(db_path(&config).unwrap(), PathBuf::from("/srv/tasks.db"));
    }

    #[test]
    fn default_path_ends_with_app_layout() {
        if let Some(path) = default_db_path() {
            assert!(path.ends_with("taskbook/db/tasks.db"));
        }
    }

    #[test]
    fn prepare_creates_missing_directories() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("a").join("b").join("tasks.db");
        let mut config = Config::default();
        config.storage.db_path = Some(target.clone());

        let path = prepare_db_path(&config).unwrap();

        assert_eq!(path, target);
        assert!(target.parent().unwrap().is_dir());
        assert!(!target.exists());
    }

    #[test]
    fn bare_file_name_needs_no_directory() {
        assert!(ensure_parent_dir(Path::new("tasks.db")).is_ok());
    }
}
