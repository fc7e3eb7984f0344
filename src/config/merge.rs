//! Deep merge of layered YAML settings.
//!
//! Mappings merge key by key, higher tiers winning. Sequences and scalars are
//! replaced whole.

use serde_json::Value;

/// Return `base` with `overlay` merged over it.
///
/// A null overlay, at any level, leaves the base value in place.
///
/// # Example
/// ```
/// use serde_json::json;
/// use env_flatten::config::deep_merge;
///
/// let base = json!({"flatten": {"max_depth": 64, "prefix": ""}});
/// let overlay = json!({"flatten": {"prefix": "PROJECT_"}});
/// let result = deep_merge(base, overlay);
/// assert_eq!(result, json!({"flatten": {"max_depth": 64, "prefix": "PROJECT_"}}));
/// ```
pub fn deep_merge(mut base: Value, overlay: Value) -> Value {
    merge_into(&mut base, overlay);
    base
}

/// Merge tier values in order, later values taking precedence.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    let mut merged = Value::Null;
    for value in values {
        merge_into(&mut merged, value);
    }
    merged
}

fn merge_into(base: &mut Value, overlay: Value) {
    match overlay {
        Value::Null => {}
        Value::Object(entries) => {
            let Value::Object(target) = base else {
                *base = Value::Object(entries);
                return;
            };
            for (key, value) in entries {
                match target.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        other => *base = other,
    }
}
