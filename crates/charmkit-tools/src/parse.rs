//! Output-shape parsers and argument encoders.
//!
//! Hook tools answer in one of three shapes:
//!
//! | Shape | Example tool | Parser |
//! |-------|--------------|--------|
//! | Scalar line | `config-get port` | [`scalar`] |
//! | Newline list | `relation-ids db` | [`list`] |
//! | JSON object | `config-get --all --format=json` | [`map`] |
//!
//! Parsers are pure functions over captured stdout and never expose a
//! partially parsed value: they return the full result or an error.

use crate::ToolError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

fn text<'a>(tool: &str, bytes: &'a [u8]) -> Result<&'a str, ToolError> {
    std::str::from_utf8(bytes).map_err(|e| ToolError::unparsable(tool, format!("invalid UTF-8: {e}")))
}

/// Parses a single value.
///
/// Trailing whitespace is dropped. Multi-line values (e.g. a
/// certificate stored in relation data) are returned intact.
///
/// # Errors
///
/// `MissingValue` if the output is blank, `UnparsableResponse` if it is
/// not UTF-8.
pub fn scalar(tool: &str, bytes: &[u8]) -> Result<String, ToolError> {
    let value = text(tool, bytes)?.trim_end();
    if value.trim_start().is_empty() {
        return Err(ToolError::MissingValue {
            tool: tool.to_string(),
        });
    }
    Ok(value.to_string())
}

/// Parses a newline-delimited list.
///
/// Blank lines are skipped; order and duplicates are preserved. Blank
/// output is an empty list.
///
/// # Errors
///
/// `UnparsableResponse` if the output is not UTF-8.
pub fn list(tool: &str, bytes: &[u8]) -> Result<Vec<String>, ToolError> {
    Ok(text(tool, bytes)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Parses each list entry with `FromStr`.
///
/// # Errors
///
/// `UnparsableResponse` naming the first entry that fails to parse.
pub fn list_of<T>(tool: &str, bytes: &[u8]) -> Result<Vec<T>, ToolError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    list(tool, bytes)?
        .into_iter()
        .map(|entry| {
            entry
                .parse::<T>()
                .map_err(|e| ToolError::unparsable(tool, format!("entry '{entry}': {e}")))
        })
        .collect()
}

/// Parses a JSON object of scalar values into a string map.
///
/// Strings are taken verbatim, numbers and booleans are rendered with
/// their JSON text, and `null` entries (unset options) are omitted. A
/// blank output or a top-level `null` is an empty map.
///
/// # Errors
///
/// `UnparsableResponse` for invalid JSON, a non-object top level, or a
/// nested array/object value.
pub fn map(tool: &str, bytes: &[u8]) -> Result<BTreeMap<String, String>, ToolError> {
    if text(tool, bytes)?.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ToolError::unparsable(tool, format!("invalid JSON: {e}")))?;

    let object = match value {
        Value::Object(object) => object,
        Value::Null => return Ok(BTreeMap::new()),
        other => {
            return Err(ToolError::unparsable(
                tool,
                format!("expected a JSON object, got {}", json_kind(&other)),
            ))
        }
    };

    let mut result = BTreeMap::new();
    for (key, value) in object {
        let rendered = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(ToolError::unparsable(
                    tool,
                    format!("value for '{key}' is a {}, not a scalar", json_kind(&other)),
                ))
            }
        };
        result.insert(key, rendered);
    }
    Ok(result)
}

/// Deserializes a JSON document into `T`.
///
/// # Errors
///
/// `UnparsableResponse` if the output does not match `T`.
pub fn json<T: DeserializeOwned>(tool: &str, bytes: &[u8]) -> Result<T, ToolError> {
    serde_json::from_slice(bytes).map_err(|e| ToolError::unparsable(tool, e.to_string()))
}

/// Parses a boolean answer (`True`/`true`/`False`/`false`).
///
/// # Errors
///
/// `UnparsableResponse` for anything else, including blank output.
pub fn boolean(tool: &str, bytes: &[u8]) -> Result<bool, ToolError> {
    match text(tool, bytes)?.trim() {
        "True" | "true" => Ok(true),
        "False" | "false" => Ok(false),
        other => Err(ToolError::unparsable(
            tool,
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Encodes settings as `key=value` arguments.
///
/// An empty value is passed through as `key=`, which hook tools treat
/// as "unset this key".
///
/// # Errors
///
/// `InvalidArgument` for an empty key or a key containing `=`.
pub fn encode_pairs<I, K, V>(tool: &str, settings: I) -> Result<Vec<String>, ToolError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    settings
        .into_iter()
        .map(|(key, value)| {
            let key = key.as_ref();
            if key.is_empty() {
                return Err(ToolError::invalid_argument(tool, "empty key"));
            }
            if key.contains('=') {
                return Err(ToolError::invalid_argument(
                    tool,
                    format!("key '{key}' contains '='"),
                ));
            }
            Ok(format!("{key}={}", value.as_ref()))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
