//! Schema partitioning - splits a record schema into the views a form needs.
//!
//! Only literal nested `properties` objects are traversed. `$ref`, composition
//! keywords and `items` are treated as opaque leaves and copied as-is.

use serde_json::{Map, Value};

use crate::types::Language;

/// Returns true when a property schema is explicitly marked `readOnly: true`.
///
/// A missing or non-boolean `readOnly` counts as writable.
pub fn is_read_only(prop: &Value) -> bool {
    prop.get("readOnly")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Drop every read-only property, recursively.
///
/// Nested `properties` of kept entries are filtered the same way, and each
/// `required` list is narrowed to the properties that remain.
pub fn writable_view(schema: &Value) -> Value {
    filter_properties(
        schema,
        &|_: &str, prop: &Value| !is_read_only(prop),
        &writable_view,
    )
}

/// Keep only read-only properties, recursively.
///
/// The `required` list is narrowed so it never names a dropped property.
pub fn read_only_view(schema: &Value) -> Value {
    filter_properties(
        schema,
        &|_: &str, prop: &Value| is_read_only(prop),
        &read_only_view,
    )
}

/// Drop the sibling-language variants of translated fields, recursively.
///
/// For each base name in `translated`, the property `{base}_{other}` is removed,
/// where `other` is the language that is not `keep`, and dropped names are
/// removed from `required`. An empty `translated` returns the schema unchanged.
pub fn language_filtered_view<S: AsRef<str>>(
    schema: &Value,
    translated: &[S],
    keep: Language,
) -> Value {
    if translated.is_empty() {
        return schema.clone();
    }

    let other = keep.other();
    let dropped: Vec<String> = translated
        .iter()
        .map(|base| other.field_name(base.as_ref()))
        .collect();

    drop_named(schema, &dropped)
}

// --- Internal implementation ---

fn drop_named(schema: &Value, dropped: &[String]) -> Value {
    filter_properties(
        schema,
        &|key: &str, _: &Value| !dropped.iter().any(|d| d.as_str() == key),
        &|child: &Value| drop_named(child, dropped),
    )
}

/// Rebuild `schema` with only the properties accepted by `keep`, applying
/// `recurse` to each kept property.
///
/// Schemas without a `properties` object pass through unchanged.
fn filter_properties(
    schema: &Value,
    keep: &dyn Fn(&str, &Value) -> bool,
    recurse: &dyn Fn(&Value) -> Value,
) -> Value {
    let Some(map) = schema.as_object() else {
        return schema.clone();
    };
    let Some(props) = map.get("properties").and_then(Value::as_object) else {
        return schema.clone();
    };

    let kept: Map<String, Value> = props
        .iter()
        .filter(|&(key, prop)| keep(key.as_str(), prop))
        .map(|(key, prop)| (key.clone(), recurse(prop)))
        .collect();

    let mut result = Map::new();
    for (key, value) in map {
        match key.as_str() {
            "properties" => {
                result.insert(key.clone(), Value::Object(kept.clone()));
            }
            "required" => {
                result.insert(key.clone(), prune_required(value, &kept));
            }
            _ => {
                result.insert(key.clone(), value.clone());
            }
        }
    }

    Value::Object(result)
}

fn prune_required(required: &Value, props: &Map<String, Value>) -> Value {
    match required {
        Value::Array(names) => Value::Array(
            names
                .iter()
                .filter(|name| name.as_str().map(|n| props.contains_key(n)).unwrap_or(false))
                .cloned()
                .collect(),
        ),
        // Draft-03 style boolean `required` - leave as-is
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn read_only_requires_literal_true() {
        assert!(is_read_only(&json!({ "readOnly": true })));
        assert!(!is_read_only(&json!({ "readOnly": false })));
        assert!(!is_read_only(&json!({ "readOnly": "true" })));
        assert!(!is_read_only(&json!({ "type": "string" })));
        assert!(!is_read_only(&json!(true)));
    }

    #[test]
    fn non_object_schema_passes_through() {
        let schema = json!({ "type": "string", "readOnly": true });
        assert_eq!(writable_view(&schema), schema);
        assert_eq!(read_only_view(&schema), schema);
        assert_eq!(writable_view(&json!(true)), json!(true));
    }

    #[test]
    fn properties_order_is_preserved() {
        let schema = json!({
            "type": "object",
            "properties": {
                "zeta": { "type": "string" },
                "id": { "type": "string", "readOnly": true },
                "alpha": { "type": "string" }
            }
        });
        let writable = writable_view(&schema);
        let keys: Vec<&String> = writable["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn ref_is_an_opaque_leaf() {
        let schema = json!({
            "type": "object",
            "properties": {
                "parent": { "$ref": "#" }
            }
        });
        assert_eq!(writable_view(&schema), schema);
    }

    #[test]
    fn language_filter_without_fields_is_identity() {
        let schema = json!({
            "type": "object",
            "properties": { "label_ko": {}, "label_en": {} }
        });
        let empty: [&str; 0] = [];
        assert_eq!(language_filtered_view(&schema, &empty, Language::Ko), schema);
    }

    #[test]
    fn non_array_required_is_kept() {
        let schema = json!({
            "type": "object",
            "required": true,
            "properties": { "id": { "readOnly": true } }
        });
        assert_eq!(read_only_view(&schema)["required"], json!(true));
    }
}
