//! Core types shared by the resource client and the schema helpers.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Status reported when no response was received at all.
pub const NO_RESPONSE_STATUS: i32 = -1;

/// One instance of a resource, as an untyped field map.
///
/// Persisted records carry `id`, `created_at` and `updated_at`.
pub type Record = Map<String, Value>;

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Data schema plus UI presentation hints for a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub schema: Value,
    #[serde(default)]
    pub ui_schema: Value,
}

/// A foreign-key-style choice: the stored value and its display title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    #[serde(rename = "const")]
    pub value: Value,
    pub title: String,
}

/// Summary row returned by a resource's collection endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListValue {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Language variant of a translated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ko,
    En,
}

impl Language {
    /// Field name suffix, without the separating underscore.
    pub fn suffix(&self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
        }
    }

    /// The sibling language.
    pub fn other(&self) -> Self {
        match self {
            Language::Ko => Language::En,
            Language::En => Language::Ko,
        }
    }

    /// Name of the variant field for a translated base name, e.g. `label_ko`.
    pub fn field_name(&self, base: &str) -> String {
        format!("{}_{}", base, self.suffix())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ko" => Ok(Language::Ko),
            "en" => Ok(Language::En),
            other => Err(format!("unknown language \"{}\": expected ko or en", other)),
        }
    }
}

/// How `update` sends an edited record back to the backend.
///
/// A deployment uses exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UpdateStrategy {
    /// `PUT /{resource}` with the full record.
    #[default]
    Replace,
    /// `PATCH /{resource}/{id}/` with the record.
    Patch,
}

impl fmt::Display for UpdateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStrategy::Replace => f.write_str("replace"),
            UpdateStrategy::Patch => f.write_str("patch"),
        }
    }
}

impl FromStr for UpdateStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "replace" | "put" => Ok(UpdateStrategy::Replace),
            "patch" => Ok(UpdateStrategy::Patch),
            other => Err(format!(
                "unknown update strategy \"{}\": expected replace or patch",
                other
            )),
        }
    }
}

/// Connection settings for a [`ResourceClient`](crate::ResourceClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base endpoint URL; resource paths are appended to it.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    pub update_strategy: UpdateStrategy,
}

impl ClientConfig {
    /// Create a config with the default update strategy.
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_millis(timeout_ms),
            update_strategy: UpdateStrategy::default(),
        }
    }

    /// Set the update strategy.
    pub fn update_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.update_strategy = strategy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn language_sibling_and_field_name() {
        assert_eq!(Language::Ko.other(), Language::En);
        assert_eq!(Language::En.other(), Language::Ko);
        assert_eq!(Language::Ko.field_name("label"), "label_ko");
        assert_eq!(Language::En.other().field_name("label"), "label_ko");
    }

    #[test]
    fn language_parse() {
        assert_eq!("ko".parse::<Language>(), Ok(Language::Ko));
        assert_eq!("EN".parse::<Language>(), Ok(Language::En));
        assert!("jp".parse::<Language>().is_err());
    }

    #[test]
    fn update_strategy_parse() {
        assert_eq!("replace".parse::<UpdateStrategy>(), Ok(UpdateStrategy::Replace));
        assert_eq!("PATCH".parse::<UpdateStrategy>(), Ok(UpdateStrategy::Patch));
        assert!("post".parse::<UpdateStrategy>().is_err());
    }

    #[test]
    fn client_config_defaults() {
        let config = ClientConfig::new("http://localhost:8000", DEFAULT_TIMEOUT_MS);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.update_strategy, UpdateStrategy::Replace);

        let config = config.update_strategy(UpdateStrategy::Patch);
        assert_eq!(config.update_strategy, UpdateStrategy::Patch);
    }

    #[test]
    fn enum_value_uses_const_key() {
        let value: EnumValue =
            serde_json::from_value(json!({ "const": "abc", "title": "Device A" })).unwrap();
        assert_eq!(value.value, json!("abc"));
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({ "const": "abc", "title": "Device A" })
        );
    }

    #[test]
    fn schema_definition_without_ui_schema() {
        let def: SchemaDefinition =
            serde_json::from_value(json!({ "schema": { "type": "object" } })).unwrap();
        assert!(def.ui_schema.is_null());
    }
}
