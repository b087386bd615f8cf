//! Fail-open domain normalization.
//!
//! Callers hand domains over in inconsistent shapes: a bare condition without
//! the enclosing array, a double-wrapped array, a JSON string, or a structured
//! `{"conditions": [...]}` object. [`normalize`] reduces all of them to one
//! canonical [`Domain`]. Anything it cannot make sense of becomes the empty
//! domain ("match all"); the schema-aware check in
//! [`validate`](super::validate) is the actual correctness gate.

use serde_json::{Map, Value};
use tracing::debug;

use super::validate::filter_elements;
use super::{Condition, Domain, DomainElement, LogicalOp};

/// Normalizes any caller-supplied filter representation. Never fails.
#[must_use]
pub fn normalize(input: &Value) -> Domain {
    match input {
        Value::Null => Domain::new(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed) => normalize(&parsed),
            Err(err) => {
                debug!(error = %err, "domain string is not valid JSON, using empty domain");
                Domain::new()
            }
        },
        Value::Object(map) => from_structured(map),
        Value::Array(items) => from_array(items),
        Value::Bool(_) | Value::Number(_) => Domain::new(),
    }
}

/// `{"conditions": [{"field", "operator", "value"}, ...]}`. Malformed records are dropped.
fn from_structured(map: &Map<String, Value>) -> Domain {
    let Some(conditions) = map.get("conditions").and_then(Value::as_array) else {
        return Domain::new();
    };

    let domain: Domain = conditions
        .iter()
        .filter_map(|record| structured_condition(record).map(DomainElement::Condition))
        .collect();

    if domain.len() < conditions.len() {
        debug!(
            dropped = conditions.len() - domain.len(),
            "dropped malformed structured conditions"
        );
    }
    domain
}

/// `{"field": .., "operator": .., "value": ..}` with string field and operator and a value key.
pub(crate) fn structured_condition(record: &Value) -> Option<Condition> {
    let record = record.as_object()?;
    let field = record.get("field")?.as_str()?;
    let operator = record.get("operator")?.as_str()?;
    let value = record.get("value")?;
    Some(Condition::new(field, operator, value.clone()))
}

/// How a top-level domain array is read.
pub(crate) enum ArrayShape<'a> {
    Empty,
    /// `[[[...]]]`: the single element is re-read one level down.
    DoubleWrapped(&'a Value),
    /// Contains a nested array or a logical token: filtered element by element.
    Canonical,
    /// A bare `["field", "op", value]` without the enclosing array.
    BareTriple,
    Unrecognized,
}

pub(crate) fn array_shape(items: &[Value]) -> ArrayShape<'_> {
    if items.is_empty() {
        return ArrayShape::Empty;
    }

    if let [outer @ Value::Array(inner)] = items {
        if matches!(inner.as_slice(), [Value::Array(_)]) {
            return ArrayShape::DoubleWrapped(outer);
        }
    }

    let already_canonical = items.iter().any(|item| match item {
        Value::Array(_) => true,
        Value::String(token) => LogicalOp::from_token(token).is_some(),
        _ => false,
    });
    if already_canonical {
        return ArrayShape::Canonical;
    }

    if matches!(items, [Value::String(_), Value::String(_), _, ..]) {
        return ArrayShape::BareTriple;
    }
    ArrayShape::Unrecognized
}

fn from_array(items: &[Value]) -> Domain {
    match array_shape(items) {
        ArrayShape::Empty => Domain::new(),
        ArrayShape::DoubleWrapped(outer) => normalize(outer),
        ArrayShape::Canonical => filter_elements(items),
        ArrayShape::BareTriple => match items {
            [Value::String(field), Value::String(operator), value, ..] => {
                Domain::single(Condition::new(field.as_str(), operator.as_str(), value.clone()))
            }
            _ => Domain::new(),
        },
        ArrayShape::Unrecognized => {
            debug!(len = items.len(), "unrecognized domain array, using empty domain");
            Domain::new()
        }
    }
}
