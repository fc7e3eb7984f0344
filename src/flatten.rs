//! Flattening of nested configuration documents into environment assignments.
//!
//! Every scalar reachable from the root mapping becomes one `KEY=value` entry.
//! The key is the upper-cased chain of mapping keys leading to the value,
//! joined with `_`:
//!
//! ```
//! use env_flatten::flatten::flatten;
//! use env_flatten::node::ConfigNode;
//! use serde_json::json;
//!
//! let doc = ConfigNode::from(json!({"db": {"host": "localhost", "port": 5432}}));
//! assert_eq!(flatten(&doc).unwrap(), vec!["DB_HOST=localhost", "DB_PORT=5432"]);
//! ```
//!
//! Entries are collected into a buffer owned by the top-level call, so calls
//! are independent of each other and safe to run from several threads.

use crate::error::{FlattenError, FlattenResult};
use crate::format::{InputFormat, parse_auto, parse_document};
use crate::node::{ConfigNode, Mapping, Scalar};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default maximum mapping nesting depth, root included.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// How sequence values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencePolicy {
    /// Compact JSON text, e.g. `[1,"a",true]` (default)
    #[default]
    Json,
    /// Fail with [`FlattenError::UnsupportedSequence`]
    Reject,
}

impl std::str::FromStr for SequencePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(SequencePolicy::Json),
            "reject" => Ok(SequencePolicy::Reject),
            _ => Err(format!(
                "Invalid sequence policy '{}'. Valid options: json, reject",
                s
            )),
        }
    }
}

/// How null values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    /// `KEY=` with an empty value (default)
    #[default]
    Empty,
    /// Leave the key out of the output
    Skip,
}

impl std::str::FromStr for NullPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "empty" => Ok(NullPolicy::Empty),
            "skip" => Ok(NullPolicy::Skip),
            _ => Err(format!(
                "Invalid null policy '{}'. Valid options: empty, skip",
                s
            )),
        }
    }
}

/// Options controlling a flattening call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenOptions {
    /// Maximum mapping nesting depth, counting the root as 1 (default: 64).
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Prepended verbatim to every key path.
    #[serde(default)]
    pub prefix: String,

    #[serde(default)]
    pub sequences: SequencePolicy,

    #[serde(default)]
    pub nulls: NullPolicy,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            prefix: String::new(),
            sequences: SequencePolicy::default(),
            nulls: NullPolicy::default(),
        }
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// One flattened assignment, rendered as `KEY=value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedEntry {
    key: String,
    value: String,
}

impl FlattenedEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for FlattenedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Flattens documents with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct Flattener {
    options: FlattenOptions,
}

impl Flattener {
    pub fn new(options: FlattenOptions) -> Self {
        Self { options }
    }

    /// Flatten a document into entries in depth-first document order.
    ///
    /// The root must be a mapping.
    pub fn entries(&self, document: &ConfigNode) -> FlattenResult<Vec<FlattenedEntry>> {
        let root = document
            .as_mapping()
            .ok_or(FlattenError::UnsupportedRootType {
                found: document.kind(),
            })?;

        let mut entries = Vec::new();
        collect(root, &self.options.prefix, 1, &self.options, &mut entries)?;

        debug!(
            entries = entries.len(),
            root_keys = root.len(),
            "flattened document"
        );
        Ok(entries)
    }

    /// Flatten a document into `KEY=value` lines.
    pub fn lines(&self, document: &ConfigNode) -> FlattenResult<Vec<String>> {
        Ok(self
            .entries(document)?
            .iter()
            .map(FlattenedEntry::to_string)
            .collect())
    }

    /// Flatten a document into newline-separated text. An empty root gives `""`.
    pub fn text(&self, document: &ConfigNode) -> FlattenResult<String> {
        Ok(self.lines(document)?.join("\n"))
    }

    /// Parse raw text and flatten it.
    ///
    /// With no explicit format the text is tried as JSON, then as YAML.
    pub fn text_from_str(&self, input: &str, format: Option<InputFormat>) -> FlattenResult<String> {
        let document = match format {
            Some(format) => parse_document(input, format)?,
            None => parse_auto(input)?,
        };
        self.text(&document)
    }
}

/// Flatten a document with default options into `KEY=value` lines.
pub fn flatten(document: &ConfigNode) -> FlattenResult<Vec<String>> {
    Flattener::default().lines(document)
}

/// Flatten a document with default options into newline-separated text.
pub fn flatten_to_string(document: &ConfigNode) -> FlattenResult<String> {
    Flattener::default().text(document)
}

fn collect(
    mapping: &Mapping,
    prefix: &str,
    depth: usize,
    options: &FlattenOptions,
    out: &mut Vec<FlattenedEntry>,
) -> FlattenResult<()> {
    if depth > options.max_depth {
        return Err(FlattenError::DepthExceeded {
            path: prefix.trim_end_matches('_').to_string(),
            max_depth: options.max_depth,
        });
    }

    for (key, value) in mapping {
        let key = format!("{}{}", prefix, key.to_uppercase());
        match value {
            ConfigNode::Mapping(child) => {
                collect(child, &format!("{key}_"), depth + 1, options, out)?;
            }
            ConfigNode::Scalar(scalar) => {
                if let Some(rendered) = render_scalar(scalar, options.nulls) {
                    out.push(FlattenedEntry::new(key, rendered));
                }
            }
            ConfigNode::Sequence(_) => match options.sequences {
                SequencePolicy::Json => {
                    let rendered = value.to_json().to_string();
                    out.push(FlattenedEntry::new(key, rendered));
                }
                SequencePolicy::Reject => {
                    return Err(FlattenError::UnsupportedSequence { path: key });
                }
            },
        }
    }

    Ok(())
}

/// Render a scalar value. `None` means the entry is left out.
fn render_scalar(scalar: &Scalar, nulls: NullPolicy) -> Option<String> {
    match scalar {
        Scalar::String(s) => Some(s.clone()),
        Scalar::Number(n) => Some(n.to_string()),
        Scalar::Bool(b) => Some(b.to_string()),
        Scalar::Null => match nulls {
            NullPolicy::Empty => Some(String::new()),
            NullPolicy::Skip => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> ConfigNode {
        ConfigNode::from(value)
    }

    #[test]
    fn test_flat_mapping_keeps_order() {
        let lines = flatten(&doc(json!({"stage": "development", "arch": "x86_64", "count": 3}))).unwrap();
        assert_eq!(lines, vec!["STAGE=development", "ARCH=x86_64", "COUNT=3"]);
    }

    #[test]
    fn test_nested_mapping() {
        let lines = flatten(&doc(json!({"a": {"b": 1, "c": 2}}))).unwrap();
        assert_eq!(lines, vec!["A_B=1", "A_C=2"]);
    }

    #[test]
    fn test_triple_nesting() {
        let lines = flatten(&doc(json!({"a": {"b": {"c": 3}}}))).unwrap();
        assert_eq!(lines, vec!["A_B_C=3"]);
    }

    #[test]
    fn test_siblings_after_nested_mapping() {
        let lines = flatten(&doc(json!({"a": {"b": {"c": 1}, "d": 2}, "e": 3}))).unwrap();
        assert_eq!(lines, vec!["A_B_C=1", "A_D=2", "E=3"]);
    }

    #[test]
    fn test_keys_are_uppercased() {
        let lines = flatten(&doc(json!({"lowerKey": "v"}))).unwrap();
        assert_eq!(lines, vec!["LOWERKEY=v"]);
    }

    #[test]
    fn test_empty_root() {
        assert!(flatten(&doc(json!({}))).unwrap().is_empty());
        assert_eq!(flatten_to_string(&doc(json!({}))).unwrap(), "");
    }

    #[test]
    fn test_empty_nested_mapping_contributes_nothing() {
        let lines = flatten(&doc(json!({"a": {}, "b": 1}))).unwrap();
        assert_eq!(lines, vec!["B=1"]);
    }

    #[test]
    fn test_scalar_rendering() {
        let lines = flatten(&doc(json!({
            "t": true,
            "f": false,
            "n": null,
            "i": -7,
            "x": 2.5,
            "s": "with spaces"
        })))
        .unwrap();
        assert_eq!(
            lines,
            vec!["T=true", "F=false", "N=", "I=-7", "X=2.5", "S=with spaces"]
        );
    }

    #[test]
    fn test_null_skip_policy() {
        let flattener = Flattener::new(FlattenOptions {
            nulls: NullPolicy::Skip,
            ..Default::default()
        });
        let lines = flattener.lines(&doc(json!({"a": null, "b": 1}))).unwrap();
        assert_eq!(lines, vec!["B=1"]);
    }

    #[test]
    fn test_sequence_json_encoded() {
        let lines = flatten(&doc(json!({"hosts": ["a", "b"], "mixed": [1, {"k": null}]}))).unwrap();
        assert_eq!(lines, vec![r#"HOSTS=["a","b"]"#, r#"MIXED=[1,{"k":null}]"#]);
    }

    #[test]
    fn test_sequence_reject_policy() {
        let flattener = Flattener::new(FlattenOptions {
            sequences: SequencePolicy::Reject,
            ..Default::default()
        });
        let err = flattener.lines(&doc(json!({"a": {"list": [1]}}))).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnsupportedSequence);
        assert_eq!(err.to_string(), "sequence value at 'A_LIST' is not supported");
    }

    #[test]
    fn test_prefix_applied_verbatim() {
        let flattener = Flattener::new(FlattenOptions {
            prefix: "Project_".to_string(),
            ..Default::default()
        });
        let lines = flattener.lines(&doc(json!({"stage": "dev", "db": {"port": 1}}))).unwrap();
        assert_eq!(lines, vec!["Project_STAGE=dev", "Project_DB_PORT=1"]);
    }

    #[test]
    fn test_non_mapping_roots_rejected() {
        for (value, kind) in [
            (json!([1, 2]), "sequence"),
            (json!("text"), "string"),
            (json!(1), "number"),
            (json!(null), "null"),
            (json!(false), "boolean"),
        ] {
            let err = flatten(&doc(value)).unwrap_err();
            match err {
                FlattenError::UnsupportedRootType { found } => assert_eq!(found, kind),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_depth_limit() {
        let flattener = Flattener::new(FlattenOptions {
            max_depth: 2,
            ..Default::default()
        });
        assert_eq!(
            flattener.lines(&doc(json!({"a": {"b": 1}}))).unwrap(),
            vec!["A_B=1"]
        );

        let err = flattener
            .lines(&doc(json!({"a": {"b": {"c": 1}}})))
            .unwrap_err();
        match err {
            FlattenError::DepthExceeded { path, max_depth } => {
                assert_eq!(path, "A_B");
                assert_eq!(max_depth, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_text_from_str() {
        let flattener = Flattener::default();
        assert_eq!(
            flattener
                .text_from_str(r#"{"a": {"b": 1, "c": 2}}"#, Some(InputFormat::Json))
                .unwrap(),
            "A_B=1\nA_C=2"
        );
        assert_eq!(
            flattener.text_from_str("a:\n  b: x\n", None).unwrap(),
            "A_B=x"
        );
        let err = flattener
            .text_from_str("{", Some(InputFormat::Json))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::MalformedInput);
    }

    #[test]
    fn test_entry_display() {
        let entry = FlattenedEntry::new("A_B", "1");
        assert_eq!(entry.key(), "A_B");
        assert_eq!(entry.value(), "1");
        assert_eq!(entry.to_string(), "A_B=1");
    }
}
