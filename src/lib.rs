//! Resource Console
//!
//! Generic building blocks for a schema-driven CRUD administration console.
//!
//! A [`ResourceClient`] maps a resource name onto list / retrieve / create /
//! update / remove / schema / enum-value requests and folds every failure into
//! one [`ClientError`]. The schema helpers split a resource's JSON Schema into
//! the views a form needs: writable fields for the editor, read-only fields for
//! the summary table, and one language variant of each translated field.
//!
//! # Example
//!
//! ```
//! use resource_console::{read_only_view, writable_view};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {
//!         "id": { "type": "string", "readOnly": true },
//!         "hostname": { "type": "string" }
//!     },
//!     "required": ["id", "hostname"]
//! });
//!
//! let writable = writable_view(&schema);
//! assert!(writable["properties"].get("id").is_none());
//! assert!(writable["properties"].get("hostname").is_some());
//!
//! let read_only = read_only_view(&schema);
//! assert_eq!(read_only["required"], json!(["id"]));
//! ```
//!
//! # Error Normalization
//!
//! | Failure | `kind()` | `status()` |
//! |---------|----------|------------|
//! | Response with `{type, errors}` body | backend `type` | response status |
//! | Response with other body | `transport_error` | response status |
//! | Local fault (bad URL, undecodable body) | fault kind | `-1` |
//! | No response (refused, timed out) | `unknown` | `-1` |
//!
//! [`ClientError::is_required_auth`] is true for status 401 and 403.

mod client;
mod definition;
mod error;
mod input;
mod normalize;
mod partition;
mod select;
mod types;
mod validator;

pub use client::{
    ResourceClient, DECODE_ERROR_KIND, INVALID_URL_KIND, MISSING_ID_KIND, REQUEST_ERROR_KIND,
};
pub use definition::{ForeignKeyField, FOREIGN_KEY_FIELD};
pub use error::{
    ClientError, ErrorDetail, ErrorResponse, FieldError, InputError, ValidateError,
    DEFAULT_ERROR_MESSAGE, TRANSPORT_ERROR_KIND, UNKNOWN_KIND,
};
pub use input::{load_json, load_json_str, load_record};
pub use normalize::{classify_body, normalize, Failure};
pub use partition::{is_read_only, language_filtered_view, read_only_view, writable_view};
pub use select::{inline_choices, is_nullable, selectable_choices, NULL_CHOICE_TITLE};
pub use types::{
    json_type_name, ClientConfig, EnumValue, Language, ListValue, Record, SchemaDefinition,
    UpdateStrategy, DEFAULT_TIMEOUT_MS, NO_RESPONSE_STATUS,
};
pub use validator::{validate_for_submit, validate_record};
