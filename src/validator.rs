//! Record validation against resource schemas.

use serde_json::Value;

use crate::error::{FieldError, ValidateError};
use crate::partition::writable_view;
use crate::types::{Record, SchemaDefinition};

/// Validate a record about to be submitted.
///
/// Read-only fields are server-managed, so the record is checked against the
/// writable view of the definition's schema.
///
/// # Errors
///
/// Returns `ValidateError::InvalidSchema` if the schema cannot be compiled, or
/// `ValidateError::Invalid` if the record doesn't match it.
pub fn validate_for_submit(
    definition: &SchemaDefinition,
    record: &Record,
) -> Result<(), ValidateError> {
    validate_record(&writable_view(&definition.schema), record)
}

/// Validate a record against a schema, collecting every failure.
pub fn validate_record(schema: &Value, record: &Record) -> Result<(), ValidateError> {
    let validator =
        jsonschema::validator_for(schema).map_err(|e| ValidateError::InvalidSchema {
            message: e.to_string(),
        })?;

    let instance = Value::Object(record.clone());
    let errors: Vec<FieldError> = validator
        .iter_errors(&instance)
        .map(|e| FieldError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}
