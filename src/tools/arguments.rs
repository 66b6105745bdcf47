//! Argument validation against a tool's input schema, and typed extraction.
//!
//! A JSON `null` counts as absent everywhere. Zero, `false` and the empty
//! string count as present.

use crate::error::ToolError;
use crate::tools::ToolDefinition;
use crate::types::Arguments;
use serde_json::Value;

/// Check required fields and the JSON type of every declared field.
pub fn validate(definition: &ToolDefinition, args: &Arguments) -> Result<(), ToolError> {
    for field in definition.required() {
        if lookup(args, field).is_none() {
            return Err(ToolError::MissingArgument(field.to_string()));
        }
    }

    let Some(properties) = definition.parameters["properties"].as_object() else {
        return Ok(());
    };
    for (field, spec) in properties {
        let (Some(value), Some(expected)) = (lookup(args, field), spec["type"].as_str()) else {
            continue;
        };
        if !matches_type(value, expected) {
            return Err(ToolError::invalid(
                field,
                format!("expected {}, got {}", expected, type_name(value)),
            ));
        }
    }
    Ok(())
}

fn lookup<'a>(args: &'a Arguments, field: &str) -> Option<&'a Value> {
    args.get(field).filter(|v| !v.is_null())
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A required, non-empty string argument.
pub fn required_str<'a>(args: &'a Arguments, field: &str) -> Result<&'a str, ToolError> {
    let value = lookup(args, field).ok_or_else(|| ToolError::MissingArgument(field.to_string()))?;
    let s = value
        .as_str()
        .ok_or_else(|| ToolError::invalid(field, format!("expected string, got {}", type_name(value))))?;
    if s.trim().is_empty() {
        return Err(ToolError::invalid(field, "must not be empty"));
    }
    Ok(s)
}

/// An optional string argument. Empty strings are returned as given.
pub fn optional_str(args: &Arguments, field: &str) -> Result<Option<String>, ToolError> {
    match lookup(args, field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ToolError::invalid(
            field,
            format!("expected string, got {}", type_name(other)),
        )),
    }
}

/// An optional count of seconds. Accepts `30` and `30.0`, rejects negative
/// or fractional values. `0` is a real value, not "unset".
pub fn optional_seconds(args: &Arguments, field: &str) -> Result<Option<u64>, ToolError> {
    let Some(value) = lookup(args, field) else {
        return Ok(None);
    };
    if let Some(n) = value.as_u64() {
        return Ok(Some(n));
    }
    match value.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
            Ok(Some(f as u64))
        }
        Some(_) => Err(ToolError::invalid(
            field,
            "must be a non-negative whole number of seconds",
        )),
        None => Err(ToolError::invalid(
            field,
            format!("expected number, got {}", type_name(value)),
        )),
    }
}
