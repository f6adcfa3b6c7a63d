use ctl::{ChangeLogEntry, Lines};
use serde_json::Value;

use crate::error::ReplayError;

/// The part of a serialized log entry that replay needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayEntry {
    /// Only used for reporting; logs written by hand may omit it.
    pub timestamp: Option<String>,
    pub block_name: String,
    pub updated_content: Lines,
}

impl ReplayEntry {
    /// Read an entry from one element of a serialized log.
    pub fn from_value(value: &Value) -> Result<Self, ReplayError> {
        let Some(record) = value.as_object() else {
            return Err(ReplayError::MalformedChangeLog(format!(
                "expected an object, found {}",
                type_name(value)
            )));
        };

        let block_name = match record.get("block_name") {
            Some(Value::String(name)) => name.clone(),
            Some(other) => return Err(wrong_type("block_name", "a string", other)),
            None => return Err(missing("block_name")),
        };

        let updated_content = match record.get("updated_content") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(line) => Ok(line.clone()),
                    other => Err(wrong_type("updated_content", "a list of strings", other)),
                })
                .collect::<Result<Lines, _>>()?,
            Some(other) => return Err(wrong_type("updated_content", "a list of strings", other)),
            None => return Err(missing("updated_content")),
        };

        let timestamp = match record.get("timestamp") {
            Some(Value::String(ts)) => Some(ts.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };

        Ok(ReplayEntry {
            timestamp,
            block_name,
            updated_content,
        })
    }
}

impl From<&ChangeLogEntry> for ReplayEntry {
    fn from(entry: &ChangeLogEntry) -> Self {
        ReplayEntry {
            timestamp: Some(entry.timestamp.clone()),
            block_name: entry.block_name.clone(),
            updated_content: entry.updated_content.clone(),
        }
    }
}

fn missing(field: &str) -> ReplayError {
    ReplayError::MalformedChangeLog(format!("entry has no '{}' field", field))
}

fn wrong_type(field: &str, expected: &str, got: &Value) -> ReplayError {
    ReplayError::MalformedChangeLog(format!(
        "'{}' must be {}, found {}",
        field,
        expected,
        type_name(got)
    ))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
