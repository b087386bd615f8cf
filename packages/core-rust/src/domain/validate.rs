//! Domain validation in two modes.
//!
//! - [`filter_elements`] is the silent filter applied before every remote
//!   search: legal-looking elements are kept, everything else is dropped.
//! - [`check`] is the diagnostic mode behind the explicit "check domain"
//!   operation: it reports every problem against the live schema and never
//!   alters the domain.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::normalize::{array_shape, normalize, structured_condition, ArrayShape};
use super::{Condition, Domain, DomainElement, LogicalOp, Operator};
use crate::schema::{FieldDef, FieldType, ModelSchema};

/// Maximum number of "did you mean" suggestions per unknown field.
pub const MAX_FIELD_SUGGESTIONS: usize = 3;

/// Keeps logical tokens and 3-element arrays whose first two elements are strings.
#[must_use]
pub fn filter_elements(items: &[Value]) -> Domain {
    let domain: Domain = items
        .iter()
        .filter_map(|item| match item {
            Value::String(token) => LogicalOp::from_token(token).map(DomainElement::Logical),
            Value::Array(parts) => match parts.as_slice() {
                [Value::String(field), Value::String(operator), value] => Some(
                    DomainElement::Condition(Condition::new(
                        field.as_str(),
                        operator.as_str(),
                        value.clone(),
                    )),
                ),
                _ => None,
            },
            _ => None,
        })
        .collect();

    if domain.len() < items.len() {
        debug!(
            dropped = items.len() - domain.len(),
            "dropped illegal domain elements"
        );
    }
    domain
}

/// Outcome of a diagnostic domain check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DomainReport {
    /// `true` when `errors` is empty. Warnings do not affect validity.
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Reports every problem of `domain` against `schema` without discarding anything.
#[must_use]
pub fn check(domain: &Domain, schema: &ModelSchema) -> DomainReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for condition in domain.conditions() {
        let root = condition.root_field();
        let def = schema.get(root);
        if def.is_none() {
            errors.push(unknown_field(root, schema));
        }

        let operator = condition.parsed_operator();
        if operator.is_none() {
            errors.push(format!(
                "invalid operator '{}' for field '{}'",
                condition.operator, condition.field
            ));
        }

        // Type hints only apply to the field itself, not to a related path.
        if let (Some(def), Some(operator)) = (def, operator) {
            if root == condition.field {
                if let Some(warning) = value_warning(condition, operator, def) {
                    warnings.push(warning);
                }
            }
        }
    }

    if let Some(warning) = arity_warning(domain) {
        warnings.push(warning);
    }

    DomainReport {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Diagnostic check of caller input as given.
///
/// Every element the normalizer would drop is reported as an error naming its
/// position, then the normalized domain goes through [`check`]. Returns the
/// normalized domain alongside the report.
#[must_use]
pub fn check_input(input: &Value, schema: &ModelSchema) -> (Domain, DomainReport) {
    let domain = normalize(input);
    let mut report = check(&domain, schema);

    let mut errors = input_errors(input);
    if !errors.is_empty() {
        errors.append(&mut report.errors);
        report.errors = errors;
        report.valid = false;
    }
    (domain, report)
}

/// Problems the normalizer resolves silently, mirroring its shape decisions.
fn input_errors(input: &Value) -> Vec<String> {
    match input {
        Value::Null => Vec::new(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed) => input_errors(&parsed),
            Err(err) => vec![format!("domain is not valid JSON: {err}")],
        },
        Value::Bool(_) | Value::Number(_) => {
            vec![format!("domain must be an array, got {input}")]
        }
        Value::Object(map) => match map.get("conditions").and_then(Value::as_array) {
            Some(conditions) => conditions
                .iter()
                .enumerate()
                .filter(|(_, record)| structured_condition(record).is_none())
                .map(|(index, record)| {
                    format!(
                        "condition {index}: expected {{field, operator, value}} with string \
                         field and operator, got {record}"
                    )
                })
                .collect(),
            None => vec!["domain object has no 'conditions' array".to_string()],
        },
        Value::Array(items) => match array_shape(items) {
            ArrayShape::Empty | ArrayShape::BareTriple => Vec::new(),
            ArrayShape::DoubleWrapped(outer) => input_errors(outer),
            ArrayShape::Canonical => items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| {
                    element_error(item).map(|e| format!("element {index}: {e}"))
                })
                .collect(),
            ArrayShape::Unrecognized => vec![format!("unrecognized domain shape: {input}")],
        },
    }
}

/// Why [`filter_elements`] would drop `item`, if it would.
fn element_error(item: &Value) -> Option<String> {
    match item {
        Value::String(token) if LogicalOp::from_token(token).is_some() => None,
        Value::String(_) => Some(format!(
            "unknown logical operator {item} (expected one of &, |, !)"
        )),
        Value::Array(parts) => match parts.as_slice() {
            [Value::String(_), Value::String(_), _] => None,
            [Value::String(field), operator, _] => Some(format!(
                "invalid operator {operator} for field '{field}': operators are strings"
            )),
            [field, _, _] => Some(format!("field name must be a string, got {field}")),
            _ => Some(format!(
                "a condition needs 3 elements, got {}: {item}",
                parts.len()
            )),
        },
        _ => Some(format!(
            "expected a logical operator or a condition, got {item}"
        )),
    }
}

fn unknown_field(name: &str, schema: &ModelSchema) -> String {
    let suggestions = schema.suggest(name, MAX_FIELD_SUGGESTIONS);
    if suggestions.is_empty() {
        format!("field not found: '{name}'")
    } else {
        format!(
            "field not found: '{name}' (did you mean: {})",
            suggestions.join(", ")
        )
    }
}

fn value_warning(condition: &Condition, operator: Operator, def: &FieldDef) -> Option<String> {
    let value = &condition.value;
    // `false`/`null` is how the remote system spells "not set".
    if matches!(value, Value::Null | Value::Bool(false)) {
        return None;
    }

    match def.field_type {
        FieldType::Many2one | FieldType::One2many | FieldType::Many2many
            if operator == Operator::Eq && !value.is_number() =>
        {
            Some(format!(
                "field '{}' is a {} relation; '=' expects a record id, got {value}",
                condition.field, def.field_type
            ))
        }
        FieldType::Selection
            if matches!(operator, Operator::Eq | Operator::Neq)
                && !def.selection.is_empty()
                && !def.allows_selection(value) =>
        {
            let allowed: Vec<String> = def.selection.iter().map(|option| option.key()).collect();
            Some(format!(
                "value {value} is not a declared selection value of '{}' (allowed: {})",
                condition.field,
                allowed.join(", ")
            ))
        }
        _ => None,
    }
}

/// Walks the prefix structure and warns when logical operators lack operands.
fn arity_warning(domain: &Domain) -> Option<String> {
    if domain.is_empty() {
        return None;
    }

    let mut expected = 1usize;
    for element in domain.elements() {
        // Surplus elements are joined by an implicit AND.
        if expected == 0 {
            expected = 1;
        }
        expected -= 1;
        if let DomainElement::Logical(op) = element {
            expected += op.arity();
        }
    }

    (expected > 0).then(|| {
        format!(
            "logical operators are missing {expected} operand(s); \
             the remote system will reject this domain"
        )
    })
}
