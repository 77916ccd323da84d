//! Failure classification.
//!
//! Backends fail in several shapes: a structured error body, free text, or no
//! response at all. [`normalize`] folds all of them into one [`ClientError`]
//! through an ordered fallback chain:
//!
//! | Failure | Kind | Status |
//! |---------|------|--------|
//! | Response with a structured body | backend `type`, verbatim | response status |
//! | Response with any other body | `transport_error` | response status |
//! | Local fault | the fault's own kind (or `unknown`) | `-1` |
//! | No response | `unknown` | `-1` |

use serde_json::Value;

use crate::error::{
    ClientError, ErrorResponse, DEFAULT_ERROR_MESSAGE, TRANSPORT_ERROR_KIND, UNKNOWN_KIND,
};
use crate::types::NO_RESPONSE_STATUS;

/// What went wrong with a call, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// A response was received with a failing status.
    Response { status: u16, body: String },
    /// A local fault with a message, e.g. an undecodable success body.
    Fault { kind: Option<String>, message: String },
    /// Nothing was received: connection refused, timeout, aborted call.
    NoResponse,
}

/// Normalize a failure into a [`ClientError`].
pub fn normalize(failure: &Failure) -> ClientError {
    match failure {
        Failure::Response { status, body } => {
            let detail = classify_body(body);
            let message = detail.message().to_string();
            ClientError::new(i32::from(*status), detail, message)
        }
        Failure::Fault { kind, message } => {
            let kind = kind
                .as_deref()
                .filter(|k| !k.is_empty())
                .unwrap_or(UNKNOWN_KIND);
            ClientError::new(
                NO_RESPONSE_STATUS,
                ErrorResponse::single(kind, message.clone()),
                message.clone(),
            )
        }
        Failure::NoResponse => ClientError::new(
            NO_RESPONSE_STATUS,
            ErrorResponse::unknown(),
            DEFAULT_ERROR_MESSAGE.to_string(),
        ),
    }
}

/// Classify a failing response body.
///
/// A structured body is used verbatim. A body that is plain text (or a JSON
/// string) becomes the detail of a `transport_error`. Any other JSON value,
/// or a blank body, carries the generic message instead.
pub fn classify_body(body: &str) -> ErrorResponse {
    let text = match serde_json::from_str::<Value>(body) {
        Ok(value) => {
            if let Some(structured) = ErrorResponse::from_body(&value) {
                return structured;
            }
            match value {
                Value::String(s) => s,
                _ => DEFAULT_ERROR_MESSAGE.to_string(),
            }
        }
        Err(_) => body.to_string(),
    };

    let text = if text.trim().is_empty() {
        DEFAULT_ERROR_MESSAGE.to_string()
    } else {
        text
    };
    ErrorResponse::single(TRANSPORT_ERROR_KIND, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorDetail;
    use serde_json::json;

    #[test]
    fn plain_text_response_becomes_transport_error() {
        let err = normalize(&Failure::Response {
            status: 500,
            body: "Internal Server Error".into(),
        });
        assert_eq!(err.status(), 500);
        assert_eq!(err.kind(), "transport_error");
        assert_eq!(
            err.detail().errors,
            vec![ErrorDetail {
                code: "unknown".into(),
                detail: "Internal Server Error".into(),
                attr: None,
            }]
        );
        assert_eq!(err.message(), "Internal Server Error");
        assert!(!err.is_required_auth());
    }

    #[test]
    fn structured_response_passes_through() {
        let body = json!({
            "type": "auth_error.token_expired",
            "errors": [
                { "code": "expired", "detail": "token expired", "attr": null },
                { "code": "scope", "detail": "missing scope", "attr": "scope" }
            ]
        });
        let err = normalize(&Failure::Response {
            status: 401,
            body: body.to_string(),
        });
        assert!(err.is_required_auth());
        assert_eq!(err.kind(), "auth_error.token_expired");
        assert_eq!(err.detail().errors.len(), 2);
        assert_eq!(err.detail().errors[1].attr.as_deref(), Some("scope"));
        assert_eq!(err.message(), "token expired");
    }

    #[test]
    fn json_string_body_is_unwrapped() {
        let detail = classify_body(r#""Bad Gateway""#);
        assert_eq!(detail.kind, "transport_error");
        assert_eq!(detail.errors[0].detail, "Bad Gateway");
    }

    #[test]
    fn unstructured_json_body_uses_default_message() {
        let detail = classify_body(r#"{"detail":[{"msg":"field required"}]}"#);
        assert_eq!(detail.kind, "transport_error");
        assert_eq!(detail.errors[0].detail, DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn empty_body_uses_default_message() {
        let err = normalize(&Failure::Response {
            status: 403,
            body: String::new(),
        });
        assert_eq!(err.kind(), "transport_error");
        assert_eq!(err.message(), DEFAULT_ERROR_MESSAGE);
        assert!(err.is_required_auth());
    }

    #[test]
    fn fault_uses_its_own_kind() {
        let err = normalize(&Failure::Fault {
            kind: Some("decode_error".into()),
            message: "expected an array".into(),
        });
        assert_eq!(err.status(), -1);
        assert_eq!(err.kind(), "decode_error");
        assert_eq!(err.detail().errors[0].detail, "expected an array");
    }

    #[test]
    fn nameless_fault_is_unknown() {
        let err = normalize(&Failure::Fault {
            kind: None,
            message: "boom".into(),
        });
        assert_eq!(err.kind(), "unknown");
        assert_eq!(err.message(), "boom");
    }

    #[test]
    fn no_response_is_unknown_with_sentinel_status() {
        let err = normalize(&Failure::NoResponse);
        assert_eq!(err.status(), -1);
        assert_eq!(err.detail(), &ErrorResponse::unknown());
        assert!(!err.is_required_auth());
    }
}
