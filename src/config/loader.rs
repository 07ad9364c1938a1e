//! Configuration loader with tier-based merging.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Locations of the file-backed tiers.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
    /// Explicit config file
    pub explicit_file: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        // User dir: TASKBOOK_USER_DIR or ~/.taskbook
        let user_dir = std::env::var("TASKBOOK_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".taskbook")));

        let explicit_file = std::env::var("TASKBOOK_CONFIG_PATH").ok().map(PathBuf::from);

        Self {
            user_dir,
            explicit_file,
        }
    }

    /// Create paths with explicit locations.
    pub fn with_dirs(user_dir: Option<PathBuf>, explicit_file: Option<PathBuf>) -> Self {
        Self {
            user_dir,
            explicit_file,
        }
    }

    /// The user tier's config file.
    pub fn user_file(&self) -> Option<PathBuf> {
        self.user_dir.as_ref().map(|dir| dir.join("config.yaml"))
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: Config,
    /// Highest-priority file that contributed
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration with explicit paths, taking overrides from the
    /// process environment.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        Self::load_with_env(paths, |key| std::env::var(key).ok())
    }

    /// Load configuration with explicit paths and an environment lookup.
    pub fn load_with_env<F>(paths: ConfigPaths, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut tiers: Vec<Value> = Vec::new();
        let mut config_path = None;

        // Tier 1: Defaults
        tiers.push(serde_json::to_value(Config::default())?);

        // Tier 2: User config. A broken user file is reported and skipped.
        if let Some(user_file) = paths.user_file()
            && user_file.exists()
        {
            match read_yaml(&user_file) {
                Ok(value) => {
                    tiers.push(value);
                    config_path = Some(user_file);
                }
                Err(e) => {
                    warn!(path = %user_file.display(), error = %e, "Ignoring unreadable config")
                }
            }
        }

        // Tier 3: Explicit file. Asked for by name, so failures are errors.
        if let Some(ref explicit) = paths.explicit_file {
            tiers.push(read_yaml(explicit)?);
            config_path = Some(explicit.clone());
        }

        let merged = deep_merge_all(tiers);
        let mut config: Config = serde_json::from_value(merged)?;

        // Tier 4: Environment variable overrides
        Self::apply_env_overrides(&mut config, env);

        Ok(Self {
            config,
            config_path,
        })
    }

    fn apply_env_overrides<F>(config: &mut Config, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db_path) = env("TASKBOOK_DB_PATH") {
            config.storage.db_path = Some(PathBuf::from(db_path));
        }

        if let Some(level) = env("TASKBOOK_LOG_LEVEL") {
            config.logging.level = level;
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Get the config file path that was used.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

fn read_yaml(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let value: Value = serde_yaml::from_str(&content)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputFormat;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_load_defaults_only() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(Some(temp.path().join("user")), None);

        let loader = ConfigLoader::load_with_env(paths, no_env).unwrap();

        assert!(loader.config().storage.db_path.is_none());
        assert_eq!(loader.config().logging.level, "info");
        assert!(loader.config_path().is_none());
    }

    #[test]
    fn test_user_config_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&user_dir).unwrap();
        std::fs::write(user_dir.join("config.yaml"), "display:\n  format: json\n").unwrap();

        let paths = ConfigPaths::with_dirs(Some(user_dir.clone()), None);
        let loader = ConfigLoader::load_with_env(paths, no_env).unwrap();

        assert_eq!(loader.config().display.format, OutputFormat::Json);
        assert_eq!(loader.config().logging.level, "info");
        let expected = user_dir.join("config.yaml");
        assert_eq!(loader.config_path(), Some(expected.as_path()));
    }

    #[test]
    fn test_explicit_file_overrides_user() {
        let temp = TempDir::new().unwrap();
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&user_dir).unwrap();
        std::fs::write(
            user_dir.join("config.yaml"),
            "logging:\n  level: warn\ndisplay:\n  format: json\n",
        )
        .unwrap();
        let explicit = temp.path().join("other.yaml");
        std::fs::write(&explicit, "logging:\n  level: debug\n").unwrap();

        let paths = ConfigPaths::with_dirs(Some(user_dir), Some(explicit));
        let loader = ConfigLoader::load_with_env(paths, no_env).unwrap();

        assert_eq!(loader.config().logging.level, "debug");
        assert_eq!(loader.config().display.format, OutputFormat::Json);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(None, Some(temp.path().join("absent.yaml")));
        assert!(ConfigLoader::load_with_env(paths, no_env).is_err());
    }

    #[test]
    fn test_broken_user_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.yaml"), "logging: [unclosed").unwrap();
        let paths = ConfigPaths::with_dirs(Some(temp.path().to_path_buf()), None);
        let loader = ConfigLoader::load_with_env(paths, no_env).unwrap();
        assert_eq!(loader.config().logging.level, "info");
    }

    #[test]
    fn test_env_overrides_files() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("config.yaml");
        std::fs::write(&file, "storage:\n  db_path: /from/file.db\n").unwrap();
        let paths = ConfigPaths::with_dirs(Some(temp.path().to_path_buf()), None);

        let loader = ConfigLoader::load_with_env(paths, |key| match key {
            "TASKBOOK_DB_PATH" => Some("/from/env.db".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(
            loader.config().storage.db_path.as_deref(),
            Some(Path::new("/from/env.db"))
        );
    }
}
