//! Choice fields: nullability detection and option lists.

use serde_json::Value;

use crate::types::EnumValue;

/// Title given to the empty choice offered for nullable fields.
pub const NULL_CHOICE_TITLE: &str = "(none)";

/// Returns true when any branch of a field schema admits `null`.
///
/// Walks `type` (string or array) and the `anyOf` / `oneOf` unions, recursively.
pub fn is_nullable(schema: &Value) -> bool {
    let Some(map) = schema.as_object() else {
        return false;
    };

    let type_admits_null = match map.get("type") {
        Some(Value::String(t)) => t == "null",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("null")),
        _ => false,
    };
    if type_admits_null {
        return true;
    }

    ["anyOf", "oneOf"].iter().any(|keyword| {
        map.get(*keyword)
            .and_then(Value::as_array)
            .map(|branches| branches.iter().any(is_nullable))
            .unwrap_or(false)
    })
}

/// Choices embedded in the field's own schema.
///
/// Reads `oneOf` entries carrying `const` (with optional `title`), or
/// `items.oneOf` for multi-select array fields. Entries without `const`,
/// such as a `{"type": "null"}` branch, are skipped.
pub fn inline_choices(schema: &Value) -> Vec<EnumValue> {
    let branches = schema
        .get("oneOf")
        .or_else(|| schema.get("items").and_then(|items| items.get("oneOf")))
        .and_then(Value::as_array);

    let Some(branches) = branches else {
        return Vec::new();
    };

    branches
        .iter()
        .filter_map(|branch| {
            let value = branch.get("const")?;
            let title = match branch.get("title").and_then(Value::as_str) {
                Some(title) => title.to_string(),
                None => display_value(value),
            };
            Some(EnumValue {
                value: value.clone(),
                title,
            })
        })
        .collect()
}

/// Options for a choice field: a null choice first when the field is
/// nullable, followed by `values` in their given order.
pub fn selectable_choices(schema: &Value, values: Vec<EnumValue>) -> Vec<EnumValue> {
    let mut choices = Vec::with_capacity(values.len() + 1);
    if is_nullable(schema) {
        choices.push(EnumValue {
            value: Value::Null,
            title: NULL_CHOICE_TITLE.to_string(),
        });
    }
    choices.extend(values);
    choices
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
