//! Input parsing and output rendering.

use crate::error::{FlattenError, FlattenResult};
use crate::flatten::FlattenedEntry;
use crate::node::ConfigNode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Structured text format of an input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Yaml,
}

impl InputFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "json" => Some(InputFormat::Json),
            "yaml" | "yml" => Some(InputFormat::Yaml),
            _ => None,
        }
    }
}

impl std::str::FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(InputFormat::Json),
            "yaml" | "yml" => Ok(InputFormat::Yaml),
            _ => Err(format!(
                "Invalid input format '{}'. Valid options: json, yaml",
                s
            )),
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Json => write!(f, "json"),
            InputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// Output format for flattened entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// `KEY=value` lines (default)
    #[default]
    Env,
    /// A JSON object of key paths to values
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "env" => Ok(OutputFormat::Env),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Invalid output format '{}'. Valid options: env, json",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Env => write!(f, "env"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse raw text in the given format into a document tree.
pub fn parse_document(text: &str, format: InputFormat) -> FlattenResult<ConfigNode> {
    match format {
        InputFormat::Json => serde_json::from_str::<Value>(text)
            .map(ConfigNode::from)
            .map_err(|e| FlattenError::malformed(InputFormat::Json, e)),
        InputFormat::Yaml => {
            let value: serde_yaml::Value = serde_yaml::from_str(text)
                .map_err(|e| FlattenError::malformed(InputFormat::Yaml, e))?;
            ConfigNode::from_yaml(value)
        }
    }
}

/// Parse raw text as JSON, falling back to YAML.
///
/// When both parsers reject the text the JSON error is reported.
pub fn parse_auto(text: &str) -> FlattenResult<ConfigNode> {
    match parse_document(text, InputFormat::Json) {
        Ok(node) => Ok(node),
        Err(json_err) => {
            debug!("input is not JSON ({}), trying YAML", json_err);
            match parse_document(text, InputFormat::Yaml) {
                Ok(node) => Ok(node),
                Err(FlattenError::MalformedInput { .. }) => Err(json_err),
                Err(other) => Err(other),
            }
        }
    }
}

/// Join entries as newline-separated `KEY=value` lines, with no trailing newline.
pub fn render_env(entries: &[FlattenedEntry]) -> String {
    entries
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render entries as a pretty-printed JSON object in traversal order.
///
/// A key path that occurs twice keeps its last value.
pub fn render_json(entries: &[FlattenedEntry]) -> String {
    let mut map = Map::with_capacity(entries.len());
    for entry in entries {
        map.insert(entry.key().to_string(), Value::String(entry.value().to_string()));
    }
    // Serializing a map of strings cannot fail.
    serde_json::to_string_pretty(&Value::Object(map)).unwrap_or_default()
}

/// Render entries in the requested output format.
pub fn render(entries: &[FlattenedEntry], format: OutputFormat) -> String {
    match format {
        OutputFormat::Env => render_env(entries),
        OutputFormat::Json => render_json(entries),
    }
}
