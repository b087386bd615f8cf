//! Field value validation for mutation payloads.
//!
//! Unlike domain filtering this is fail-closed: unknown fields and type
//! mismatches are hard errors, never silently dropped.

use serde_json::{Map, Value};

use crate::schema::{FieldDef, FieldType, ModelSchema};

/// Validates a create/write payload against the live schema.
///
/// Checks run in order: required fields, unknown fields, then per-field
/// types. A value of `false` means "explicitly empty" and is never
/// type-checked. Returns human-readable errors; empty means valid.
#[must_use]
pub fn validate_values(
    values: &Map<String, Value>,
    schema: &ModelSchema,
    required_fields: &[String],
) -> Vec<String> {
    let mut errors = Vec::new();

    for name in required_fields {
        let present = values
            .get(name)
            .is_some_and(|value| !matches!(value, Value::Null | Value::Bool(false)));
        if !present {
            errors.push(format!("missing required field: {name}"));
        }
    }

    for (name, value) in values {
        let Some(def) = schema.get(name) else {
            errors.push(format!("unknown field: {name}"));
            continue;
        };
        if matches!(value, Value::Null | Value::Bool(false)) {
            continue;
        }
        if let Some(error) = type_error(name, value, def) {
            errors.push(error);
        }
    }

    errors
}

fn type_error(name: &str, value: &Value, def: &FieldDef) -> Option<String> {
    let expected = match def.field_type {
        FieldType::Integer | FieldType::Many2one => (!is_integer(value)).then_some("an integer"),
        FieldType::Float | FieldType::Monetary => (!value.is_number()).then_some("a number"),
        FieldType::Boolean => (!value.is_boolean()).then_some("a boolean"),
        FieldType::One2many | FieldType::Many2many => (!value.is_array()).then_some("a list"),
        FieldType::Selection => {
            if def.selection.is_empty() || def.allows_selection(value) {
                None
            } else {
                let allowed: Vec<String> = def.selection.iter().map(|o| o.key()).collect();
                return Some(format!(
                    "invalid value for field '{name}': {value} is not one of [{}]",
                    allowed.join(", ")
                ));
            }
        }
        FieldType::Char
        | FieldType::Text
        | FieldType::Html
        | FieldType::Date
        | FieldType::Datetime
        | FieldType::Binary
        | FieldType::Other(_) => None,
    }?;

    Some(format!(
        "invalid value for field '{name}': expected {expected}, got {}",
        json_type(value)
    ))
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        _ => false,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
