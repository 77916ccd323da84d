//! Error types for resource operations, input loading and validation.

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Kind used when nothing is known about a failure.
pub const UNKNOWN_KIND: &str = "unknown";

/// Kind used when a response arrived but its body was not a structured error.
pub const TRANSPORT_ERROR_KIND: &str = "transport_error";

/// Generic message shown when a failure carries no usable text.
pub const DEFAULT_ERROR_MESSAGE: &str =
    "An unknown problem occurred, please try again in a moment.";

/// One entry of a structured error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub detail: String,
    /// Offending field path, when the failure is tied to one field.
    pub attr: Option<String>,
}

impl ErrorDetail {
    /// An `unknown`-coded entry with no field path.
    pub fn unknown(detail: impl Into<String>) -> Self {
        Self {
            code: UNKNOWN_KIND.to_string(),
            detail: detail.into(),
            attr: None,
        }
    }
}

/// Structured error body: a kind tag plus a non-empty list of entries.
///
/// This is both the shape backends send (`{type, errors}`) and the shape every
/// client failure is normalized into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub errors: Vec<ErrorDetail>,
}

impl ErrorResponse {
    /// A single-entry error of the given kind.
    pub fn single(kind: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            errors: vec![ErrorDetail::unknown(detail)],
        }
    }

    /// The fallback used when there is no information at all.
    pub fn unknown() -> Self {
        Self::single(UNKNOWN_KIND, DEFAULT_ERROR_MESSAGE)
    }

    /// Parse a backend body if, and only if, it has the structured shape.
    ///
    /// Requires a string `type` and a non-empty `errors` array whose entries
    /// each have string `code` and `detail` and a string-or-null `attr`.
    pub fn from_body(body: &Value) -> Option<Self> {
        let map = body.as_object()?;
        map.get("type")?.as_str()?;
        let errors = map.get("errors")?.as_array()?;
        if errors.is_empty() || !errors.iter().all(is_error_detail) {
            return None;
        }
        serde_json::from_value(body.clone()).ok()
    }

    /// The first entry's detail, or the generic message when it is blank.
    pub fn message(&self) -> &str {
        self.errors
            .first()
            .map(|e| e.detail.as_str())
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_ERROR_MESSAGE)
    }
}

fn is_error_detail(entry: &Value) -> bool {
    let Some(map) = entry.as_object() else {
        return false;
    };
    let is_string = |key: &str| map.get(key).map(Value::is_string).unwrap_or(false);
    let attr_ok = matches!(map.get("attr"), Some(Value::Null) | Some(Value::String(_)));
    is_string("code") && is_string("detail") && attr_ok
}

/// Failure of a resource client operation.
///
/// Every failure, whatever its origin, carries a status (`-1` when no response
/// was received) and a structured error body.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ClientError {
    status: i32,
    detail: ErrorResponse,
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl ClientError {
    pub(crate) fn new(status: i32, detail: ErrorResponse, message: String) -> Self {
        Self {
            status,
            detail,
            message,
            source: None,
        }
    }

    pub(crate) fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// HTTP status of the failed response, or `-1` without one.
    pub fn status(&self) -> i32 {
        self.status
    }

    /// Structured error body.
    pub fn detail(&self) -> &ErrorResponse {
        &self.detail
    }

    /// Kind tag of the structured error body.
    pub fn kind(&self) -> &str {
        &self.detail.kind
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True when the backend refused the call for lack of authorization (401 or 403).
    pub fn is_required_auth(&self) -> bool {
        self.status == 401 || self.status == 403
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        if self.is_required_auth() {
            4
        } else {
            3
        }
    }

    /// JSON report of the failure: status plus the structured body.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "status": self.status,
            "type": self.detail.kind,
            "errors": self.detail.errors,
        })
    }
}

/// Errors while loading JSON documents from disk.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("expected a JSON object, got {actual}")]
    NotAnObject { actual: String },
}

impl InputError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            InputError::FileNotFound { .. } | InputError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors during record validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<FieldError> },
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::InvalidSchema { .. } => 2,
            ValidateError::Invalid { .. } => 1,
        }
    }
}

/// Single validation failure with path context.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
