//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::{deep_merge, deep_merge_all};
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the project-level config file.
pub const PROJECT_CONFIG_FILE: &str = "env-flatten.yaml";

/// Name of the user-level config file inside the user directory.
pub const USER_CONFIG_FILE: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Embedded defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/env-flatten.yaml)
    Project = 1,
    /// User-level config (~/.env-flatten/config.yaml)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Paths for each configuration tier.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Directory holding `env-flatten.yaml`
    pub project_dir: Option<PathBuf>,
    /// Directory holding the user `config.yaml`
    pub user_dir: Option<PathBuf>,
    /// Single config file that replaces the project and user tiers
    pub explicit_file: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        // User dir: ENV_FLATTEN_USER_DIR or ~/.env-flatten
        let user_dir = std::env::var("ENV_FLATTEN_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".env-flatten")));

        // Project dir: ENV_FLATTEN_PROJECT_DIR or $CWD
        let project_dir = std::env::var("ENV_FLATTEN_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from(".")));

        let explicit_file = std::env::var("ENV_FLATTEN_CONFIG_PATH")
            .ok()
            .map(PathBuf::from);

        Self {
            project_dir,
            user_dir,
            explicit_file,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
            explicit_file: None,
        }
    }

    /// Use a single config file instead of the project and user tiers.
    pub fn with_explicit_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    fn tier_file(&self, tier: ConfigTier) -> Option<PathBuf> {
        match tier {
            ConfigTier::Project => self
                .project_dir
                .as_ref()
                .map(|d| d.join(PROJECT_CONFIG_FILE)),
            ConfigTier::User => self.user_dir.as_ref().map(|d| d.join(USER_CONFIG_FILE)),
            ConfigTier::Defaults | ConfigTier::Environment => None,
        }
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Loaded configuration
    config: Config,
    /// Config files that contributed, lowest priority first
    sources: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers with proper merging.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load configuration with explicit paths.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        Self::load_with_env(paths, |name| std::env::var(name).ok())
    }

    /// Load configuration, reading environment overrides through `lookup`.
    pub fn load_with_env(
        paths: ConfigPaths,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let (mut config, sources) = if let Some(ref explicit) = paths.explicit_file {
            // An explicit file must exist and parse; no silent fallback.
            let config = Config::load(explicit)?;
            (config, vec![explicit.clone()])
        } else {
            let mut configs: Vec<Value> = Vec::new();
            let mut sources = Vec::new();

            // Tier 1: Defaults (embedded)
            let defaults =
                serde_json::to_value(Config::default()).context("failed to encode defaults")?;
            configs.push(defaults.clone());

            // Tier 2 and 3: project, then user
            for tier in [ConfigTier::Project, ConfigTier::User] {
                if let Some(file) = paths.tier_file(tier)
                    && let Some(value) = read_tier_file(&file, tier, &defaults)
                {
                    configs.push(value);
                    sources.push(file);
                }
            }

            let merged = deep_merge_all(configs);
            let config: Config =
                serde_json::from_value(merged).context("invalid merged configuration")?;
            (config, sources)
        };

        // Tier 4: Environment variable overrides
        apply_env_overrides(&mut config, lookup);
        config.validate()?;

        debug!(sources = sources.len(), "configuration loaded");
        Ok(Self { config, sources })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Config files that were merged, lowest priority first.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

/// Read one tier file as a JSON value. Missing files are skipped quietly,
/// unreadable or invalid ones with a warning.
///
/// A tier only counts as valid if it deserializes into `Config` when laid
/// over `defaults`, so a bad value never reaches the merged result.
fn read_tier_file(path: &Path, tier: ConfigTier, defaults: &Value) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Skipping {} config {}: {}", tier, path.display(), e);
            return None;
        }
    };
    let value = match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => value,
        Err(e) => {
            warn!("Skipping {} config {}: {}", tier, path.display(), e);
            return None;
        }
    };
    let layered = deep_merge(defaults.clone(), value.clone());
    if let Err(e) = serde_json::from_value::<Config>(layered) {
        warn!("Skipping {} config {}: {}", tier, path.display(), e);
        return None;
    }
    debug!("Loaded {} config from {}", tier, path.display());
    Some(value)
}

/// Apply environment variable overrides to config.
fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(max_depth) = lookup("ENV_FLATTEN_MAX_DEPTH") {
        match max_depth.trim().parse() {
            Ok(depth) => config.flatten.max_depth = depth,
            Err(_) => warn!("Ignoring invalid ENV_FLATTEN_MAX_DEPTH '{}'", max_depth),
        }
    }

    if let Some(prefix) = lookup("ENV_FLATTEN_PREFIX") {
        config.flatten.prefix = prefix;
    }

    if let Some(sequences) = lookup("ENV_FLATTEN_SEQUENCES") {
        match sequences.parse() {
            Ok(policy) => config.flatten.sequences = policy,
            Err(e) => warn!("Ignoring ENV_FLATTEN_SEQUENCES: {}", e),
        }
    }

    if let Some(nulls) = lookup("ENV_FLATTEN_NULLS") {
        match nulls.parse() {
            Ok(policy) => config.flatten.nulls = policy,
            Err(e) => warn!("Ignoring ENV_FLATTEN_NULLS: {}", e),
        }
    }
}
