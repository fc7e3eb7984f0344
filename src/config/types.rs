//! Configuration types and structures.

use crate::flatten::FlattenOptions;
use crate::format::OutputFormat;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Output settings for the command line tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format: env (default) or json.
    #[serde(default)]
    pub format: OutputFormat,

    /// End non-empty output with a newline (default: true).
    #[serde(default = "default_trailing_newline")]
    pub trailing_newline: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            trailing_newline: default_trailing_newline(),
        }
    }
}

fn default_trailing_newline() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub flatten: FlattenOptions,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a single YAML file.
    ///
    /// An empty or comment-only file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Option<Config> = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config.unwrap_or_default())
    }

    /// Reject settings the flattener cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.flatten.max_depth == 0 {
            bail!("flatten.max_depth must be at least 1");
        }
        if self.flatten.prefix.contains('=') || self.flatten.prefix.contains('\n') {
            bail!("flatten.prefix must not contain '=' or newlines");
        }
        Ok(())
    }

    /// Render the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::{NullPolicy, SequencePolicy};
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.flatten.max_depth, 64);
        assert_eq!(config.flatten.prefix, "");
        assert_eq!(config.flatten.sequences, SequencePolicy::Json);
        assert_eq!(config.flatten.nulls, NullPolicy::Empty);
        assert_eq!(config.output.format, OutputFormat::Env);
        assert!(config.output.trailing_newline);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("flatten:\n  nulls: skip\n").unwrap();
        assert_eq!(config.flatten.nulls, NullPolicy::Skip);
        assert_eq!(config.flatten.max_depth, 64);
        assert!(config.output.trailing_newline);
    }

    #[test]
    fn test_load_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "# nothing here\n").unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_load_missing_file_errors() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(temp.path().join("absent.yaml")).is_err());
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.flatten.max_depth = 0;
        assert!(config.validate().is_err());

        config.flatten.max_depth = 4;
        config.flatten.prefix = "A=".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_roundtrip_of_effective_config() {
        let mut config = Config::default();
        config.flatten.prefix = "PROJECT_".to_string();
        config.output.format = OutputFormat::Json;
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("prefix: PROJECT_"));
        assert!(yaml.contains("format: json"));
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
