//! Tiered configuration.
//!
//! Tiers, lowest to highest:
//! 1. **Defaults** - built in
//! 2. **User** - `~/.taskbook/config.yaml`
//! 3. **Explicit file** - `TASKBOOK_CONFIG_PATH` (or `--config`)
//! 4. **Environment** - `TASKBOOK_DB_PATH`, `TASKBOOK_LOG_LEVEL`
//!
//! YAML tiers deep-merge field by field. CLI flags are applied by the binary
//! on top of the result.
//!
//! ## Environment Variables
//! - `TASKBOOK_CONFIG_PATH` - Explicit config file
//! - `TASKBOOK_USER_DIR` - User config dir (default: `~/.taskbook`)
//! - `TASKBOOK_DB_PATH` - Database path
//! - `TASKBOOK_LOG_LEVEL` - Log filter directive

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
