//! Loading JSON documents and records from files.

use std::path::Path;

use serde_json::Value;

use crate::error::InputError;
use crate::types::{json_type_name, Record};

/// Load a JSON document from a file path.
///
/// # Errors
///
/// Returns `InputError::FileNotFound` if the file doesn't exist,
/// or `InputError::InvalidJson` if the file isn't valid JSON.
pub fn load_json(path: &Path) -> Result<Value, InputError> {
    if !path.exists() {
        return Err(InputError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| InputError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_json_str(&content)
}

/// Load a JSON document from a string.
pub fn load_json_str(content: &str) -> Result<Value, InputError> {
    serde_json::from_str(content).map_err(|source| InputError::InvalidJson { source })
}

/// Load a record (a JSON object) from a file path.
///
/// # Errors
///
/// In addition to the errors of [`load_json`], returns
/// `InputError::NotAnObject` when the document is not a JSON object.
pub fn load_record(path: &Path) -> Result<Record, InputError> {
    match load_json(path)? {
        Value::Object(map) => Ok(map),
        other => Err(InputError::NotAnObject {
            actual: json_type_name(&other).to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_file() {
        let err = load_record(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, InputError::FileNotFound { .. }));
    }

    #[test]
    fn record_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("device.json");
        fs::write(&path, r#"{"hostname":"edge-01","port":22}"#).unwrap();

        let record = load_record(&path).unwrap();
        assert_eq!(record["hostname"], "edge-01");
        assert_eq!(record["port"], 22);
    }

    #[test]
    fn array_is_not_a_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.json");
        fs::write(&path, "[1, 2]").unwrap();

        match load_record(&path) {
            Err(InputError::NotAnObject { actual }) => assert_eq!(actual, "array"),
            other => panic!("expected NotAnObject, got {:?}", other),
        }
    }

    #[test]
    fn malformed_json() {
        let err = load_json_str("{ not json").unwrap_err();
        assert!(matches!(err, InputError::InvalidJson { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
