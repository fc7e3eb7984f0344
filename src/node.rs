//! Document tree for configuration input.
//!
//! Parsed JSON and YAML documents are converted into [`ConfigNode`] so the
//! flattener dispatches on one explicit set of variants regardless of the
//! source format. Mapping entries keep their insertion order.

use crate::error::{FlattenError, FlattenResult};
use serde_json::{Map, Number, Value};

/// Ordered key/value entries of a mapping node.
pub type Mapping = Vec<(String, ConfigNode)>;

/// A leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// A value in a configuration document.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    /// String-keyed entries in document order.
    Mapping(Mapping),
    Scalar(Scalar),
    Sequence(Vec<ConfigNode>),
}

impl ConfigNode {
    /// Build a mapping node from `(key, value)` pairs, keeping their order.
    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ConfigNode)>,
    {
        ConfigNode::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn string(value: impl Into<String>) -> Self {
        ConfigNode::Scalar(Scalar::String(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        ConfigNode::Scalar(Scalar::Bool(value))
    }

    pub fn null() -> Self {
        ConfigNode::Scalar(Scalar::Null)
    }

    pub fn number(value: impl Into<Number>) -> Self {
        ConfigNode::Scalar(Scalar::Number(value.into()))
    }

    /// Short name of the node kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigNode::Mapping(_) => "mapping",
            ConfigNode::Sequence(_) => "sequence",
            ConfigNode::Scalar(Scalar::Null) => "null",
            ConfigNode::Scalar(Scalar::Bool(_)) => "boolean",
            ConfigNode::Scalar(Scalar::Number(_)) => "number",
            ConfigNode::Scalar(Scalar::String(_)) => "string",
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfigNode::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Convert back into a JSON value. Mapping order is preserved.
    pub fn to_json(&self) -> Value {
        match self {
            ConfigNode::Mapping(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json());
                }
                Value::Object(map)
            }
            ConfigNode::Sequence(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            ConfigNode::Scalar(Scalar::Null) => Value::Null,
            ConfigNode::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            ConfigNode::Scalar(Scalar::Number(n)) => Value::Number(n.clone()),
            ConfigNode::Scalar(Scalar::String(s)) => Value::String(s.clone()),
        }
    }

    /// Convert a YAML value into a node.
    ///
    /// Scalar mapping keys (numbers, booleans, null) are stringified from their
    /// parsed value, so `0x10` becomes `"16"`. Tags are dropped and the tagged
    /// value is kept.
    pub fn from_yaml(value: serde_yaml::Value) -> FlattenResult<Self> {
        convert_yaml(value, "")
    }
}

impl From<Value> for ConfigNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ConfigNode::null(),
            Value::Bool(b) => ConfigNode::bool(b),
            Value::Number(n) => ConfigNode::Scalar(Scalar::Number(n)),
            Value::String(s) => ConfigNode::string(s),
            Value::Array(items) => {
                ConfigNode::Sequence(items.into_iter().map(ConfigNode::from).collect())
            }
            Value::Object(map) => {
                ConfigNode::Mapping(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

fn convert_yaml(value: serde_yaml::Value, path: &str) -> FlattenResult<ConfigNode> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => ConfigNode::null(),
        Yaml::Bool(b) => ConfigNode::bool(b),
        Yaml::Number(n) => yaml_number(&n),
        Yaml::String(s) => ConfigNode::string(s),
        Yaml::Sequence(items) => ConfigNode::Sequence(
            items
                .into_iter()
                .map(|item| convert_yaml(item, path))
                .collect::<FlattenResult<_>>()?,
        ),
        Yaml::Mapping(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, value) in map {
                let key = yaml_key(key, path)?;
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                let value = convert_yaml(value, &child_path)?;
                entries.push((key, value));
            }
            ConfigNode::Mapping(entries)
        }
        Yaml::Tagged(tagged) => convert_yaml(tagged.value, path)?,
    })
}

fn yaml_key(key: serde_yaml::Value, path: &str) -> FlattenResult<String> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Null => Ok("null".to_string()),
        Yaml::Tagged(tagged) => yaml_key(tagged.value, path),
        Yaml::Sequence(_) | Yaml::Mapping(_) => Err(FlattenError::NonStringKey {
            path: if path.is_empty() {
                "<root>".to_string()
            } else {
                path.to_string()
            },
        }),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> ConfigNode {
    if let Some(i) = n.as_i64() {
        ConfigNode::number(i)
    } else if let Some(u) = n.as_u64() {
        ConfigNode::number(u)
    } else {
        // `.nan` and `.inf` have no JSON number form; keep their YAML spelling.
        match n.as_f64().and_then(Number::from_f64) {
            Some(f) => ConfigNode::Scalar(Scalar::Number(f)),
            None => ConfigNode::string(n.to_string()),
        }
    }
}
