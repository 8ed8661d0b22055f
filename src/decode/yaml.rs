//! YAML decoding with Spring-style flattening.
//!
//! Nested mappings join with `.`, non-string keys and sequence items are
//! bracketed (`codes[404]`, `key[i]`), empty sequences and `null` become an
//! empty string, and scalars keep their literal text. Multiple
//! documents are flattened in order; later documents override earlier ones.

use crate::error::DecodeError;
use crate::types::PropertyMap;
use serde::Deserialize;
use serde_yaml::Value;
use std::path::Path;

pub(super) fn decode(path: &Path, bytes: &[u8]) -> Result<PropertyMap, DecodeError> {
    let yaml_error = |message: String| DecodeError::Yaml {
        path: path.to_path_buf(),
        message,
    };

    let mut map = PropertyMap::new();
    for document in serde_yaml::Deserializer::from_slice(bytes) {
        let value = Value::deserialize(document).map_err(|e| yaml_error(e.to_string()))?;
        match value {
            Value::Null => {}
            Value::Mapping(_) => flatten_into(&mut map, None, &value),
            Value::Tagged(tagged) if tagged.value.is_mapping() => {
                flatten_into(&mut map, None, &tagged.value)
            }
            other => {
                return Err(yaml_error(format!(
                    "top-level value must be a mapping, found {}",
                    kind(&other)
                )));
            }
        }
    }
    Ok(map)
}

fn flatten_into(map: &mut PropertyMap, prefix: Option<&str>, value: &Value) {
    match value {
        Value::Mapping(mapping) => {
            for (key, child) in mapping {
                let key = mapping_key(key);
                let path = match prefix {
                    Some(prefix) if key.starts_with('[') => format!("{prefix}{key}"),
                    Some(prefix) => format!("{prefix}.{key}"),
                    None => key,
                };
                flatten_into(map, Some(&path), child);
            }
        }
        Value::Sequence(items) => {
            let prefix = prefix.unwrap_or_default();
            if items.is_empty() {
                map.insert(prefix.to_string(), String::new());
            }
            for (i, item) in items.iter().enumerate() {
                let path = format!("{prefix}[{i}]");
                flatten_into(map, Some(&path), item);
            }
        }
        Value::Tagged(tagged) => flatten_into(map, prefix, &tagged.value),
        scalar => {
            if let Some(key) = prefix {
                map.insert(key.to_string(), scalar_text(scalar));
            }
        }
    }
}

/// String keys are used as written; any other key is bracketed, so
/// `404: x` under `codes` becomes `codes[404]`.
fn mapping_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => format!("[{}]", scalar_text(other)),
    }
}

/// Literal text of a scalar. Non-scalar keys fall back to their YAML form.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
