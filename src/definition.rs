//! Helpers over a resource's [`SchemaDefinition`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::SchemaDefinition;

/// UI widget name the backend assigns to foreign-key columns.
pub const FOREIGN_KEY_FIELD: &str = "ForeignKeyField";

/// A field whose choices come from another resource's enum values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyField {
    pub field: String,
    /// Resource whose `enum-values` populate the field.
    pub resource: String,
}

impl SchemaDefinition {
    /// UI-schema field paths that do not exist in the data schema.
    ///
    /// Keys starting with `ui:` are options, not fields. Nested UI objects are
    /// checked against the matching nested `properties`. Paths are
    /// slash-separated, e.g. `/network/gateway`.
    pub fn orphan_ui_fields(&self) -> Vec<String> {
        let mut orphans = Vec::new();
        if let Value::Object(ui) = &self.ui_schema {
            collect_orphans(ui, Some(&self.schema), "", &mut orphans);
        }
        orphans
    }

    /// Top-level fields rendered as foreign-key pickers, in UI-schema order.
    pub fn foreign_key_fields(&self) -> Vec<ForeignKeyField> {
        let Some(ui) = self.ui_schema.as_object() else {
            return Vec::new();
        };

        ui.iter()
            .filter_map(|(field, hints)| {
                if hints.get("ui:field").and_then(Value::as_str) != Some(FOREIGN_KEY_FIELD) {
                    return None;
                }
                let resource = hints
                    .get("ui:options")
                    .and_then(|o| o.get("resourceName"))
                    .and_then(Value::as_str)?;
                Some(ForeignKeyField {
                    field: field.clone(),
                    resource: resource.to_string(),
                })
            })
            .collect()
    }

    /// Schema of a single top-level field.
    pub fn field_schema(&self, field: &str) -> Option<&Value> {
        self.schema.get("properties")?.get(field)
    }
}

fn collect_orphans(
    ui: &Map<String, Value>,
    schema: Option<&Value>,
    path: &str,
    orphans: &mut Vec<String>,
) {
    let props = schema
        .and_then(|s| s.get("properties"))
        .and_then(Value::as_object);

    for (key, hints) in ui {
        if key.starts_with("ui:") {
            continue;
        }
        let child_path = format!("{}/{}", path, key);
        let Some(child_schema) = props.and_then(|p| p.get(key)) else {
            orphans.push(child_path);
            continue;
        };
        if let Value::Object(nested) = hints {
            collect_orphans(nested, Some(child_schema), &child_path, orphans);
        }
    }
}
