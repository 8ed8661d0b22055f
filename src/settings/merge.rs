//! Field-by-field overlay of YAML settings documents.

use serde_yaml::Value;

/// Overlay `upper` onto `lower`, with `upper` taking precedence.
///
/// - Mappings merge recursively, key by key
/// - Sequences and scalars from `upper` replace `lower` outright
/// - A null in `upper` means "not specified" and keeps `lower`
pub fn overlay(lower: Value, upper: Value) -> Value {
    match (lower, upper) {
        (Value::Mapping(mut lower_map), Value::Mapping(upper_map)) => {
            for (key, upper_value) in upper_map {
                let merged = match lower_map.remove(&key) {
                    Some(lower_value) => overlay(lower_value, upper_value),
                    None => upper_value,
                };
                lower_map.insert(key, merged);
            }
            Value::Mapping(lower_map)
        }
        (lower, Value::Null) => lower,
        (_, upper) => upper,
    }
}

/// Overlay each layer in order, later layers winning.
pub fn overlay_all(layers: impl IntoIterator<Item = Value>) -> Value {
    layers.into_iter().fold(Value::Null, overlay)
}
