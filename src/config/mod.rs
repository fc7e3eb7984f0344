//! Layered settings for the flattener and the command line tool.
//!
//! Tiers, lowest priority first:
//! 1. **Defaults** - `Config::default()`
//! 2. **Project** - `$CWD/env-flatten.yaml`
//! 3. **User** - `~/.env-flatten/config.yaml`
//! 4. **Environment** - variables listed below
//!
//! YAML tiers are deep-merged field by field.
//!
//! ## Environment Variables
//! - `ENV_FLATTEN_CONFIG_PATH` - Explicit config file (replaces project and user tiers)
//! - `ENV_FLATTEN_PROJECT_DIR` - Project config dir (default: `.`)
//! - `ENV_FLATTEN_USER_DIR` - User config dir (default: `~/.env-flatten`)
//! - `ENV_FLATTEN_MAX_DEPTH`, `ENV_FLATTEN_PREFIX`, `ENV_FLATTEN_SEQUENCES`,
//!   `ENV_FLATTEN_NULLS` - Individual setting overrides

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier, PROJECT_CONFIG_FILE, USER_CONFIG_FILE};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
