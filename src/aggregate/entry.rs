//! Validated extraction of package entries from parsed records

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::aggregate::error::AggregateError;
use crate::parser::ConfigRecord;

/// Field holding the package name
pub const NAME_FIELD: &str = "name";

/// Field holding the package version
pub const VERSION_FIELD: &str = "version";

/// A package name and version extracted from one configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    /// Package name (never empty)
    pub name: String,
    /// Declared version, verbatim
    pub version: String,
    /// File the entry was extracted from
    pub source: PathBuf,
}

impl PackageEntry {
    /// Extract the entry from a parsed record
    ///
    /// `name` must be a non-empty string. `version` may be a non-empty string
    /// or a number, which is kept in its textual form. Every other field of
    /// the record is ignored.
    pub fn from_record(record: &ConfigRecord, path: &Path) -> Result<Self, AggregateError> {
        let name = match record.get(NAME_FIELD) {
            None => return Err(missing(path, NAME_FIELD)),
            Some(Value::String(name)) => name.trim(),
            Some(other) => {
                return Err(invalid(
                    path,
                    NAME_FIELD,
                    format!("expected a string, found {}", kind_of(other)),
                ));
            }
        };
        if name.is_empty() {
            return Err(invalid(path, NAME_FIELD, "must not be empty".to_string()));
        }

        let version = match record.get(VERSION_FIELD) {
            None => return Err(missing(path, VERSION_FIELD)),
            Some(Value::String(version)) => version.trim().to_string(),
            Some(Value::Number(number)) => number.to_string(),
            Some(other) => {
                return Err(invalid(
                    path,
                    VERSION_FIELD,
                    format!("expected a string or number, found {}", kind_of(other)),
                ));
            }
        };
        if version.is_empty() {
            return Err(invalid(path, VERSION_FIELD, "must not be empty".to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            version,
            source: path.to_path_buf(),
        })
    }
}

fn missing(path: &Path, field: &'static str) -> AggregateError {
    AggregateError::MissingField {
        path: path.to_path_buf(),
        field,
    }
}

fn invalid(path: &Path, field: &'static str, reason: String) -> AggregateError {
    AggregateError::InvalidField {
        path: path.to_path_buf(),
        field,
        reason,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a table",
    }
}
