//! Canonical domain representation.
//!
//! A domain is the remote system's filter language: a flat, prefix-notation
//! sequence mixing logical operator tokens (`"&"`, `"|"`, `"!"`) and
//! `[field, operator, value]` condition triples. Logical operators are only
//! preserved here, never evaluated.
//!
//! - [`normalize`](normalize::normalize) turns any caller-supplied shape into a [`Domain`]
//! - [`validate`] holds the silent element filter and the schema-aware diagnostic check

pub mod normalize;
pub mod validate;

use std::fmt;

use serde::ser::{Serialize, SerializeTuple, Serializer};
use serde_json::Value;

pub use normalize::normalize;
pub use validate::{check, check_input, filter_elements, DomainReport};

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Prefix logical operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// `"&"`, consumes the next two elements.
    And,
    /// `"|"`, consumes the next two elements.
    Or,
    /// `"!"`, consumes the next element.
    Not,
}

impl LogicalOp {
    /// Parses a wire token into a logical operator.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "&" => Some(Self::And),
            "|" => Some(Self::Or),
            "!" => Some(Self::Not),
            _ => None,
        }
    }

    /// The wire token for this operator.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::And => "&",
            Self::Or => "|",
            Self::Not => "!",
        }
    }

    /// Number of following elements this operator consumes.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::And | Self::Or => 2,
            Self::Not => 1,
        }
    }
}

/// Comparison operator from the fixed legal operator set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    EqOrUnset,
    EqLike,
    EqIlike,
    Like,
    NotLike,
    Ilike,
    NotIlike,
    In,
    NotIn,
    ChildOf,
    ParentOf,
    Any,
    NotAny,
}

impl Operator {
    /// Every legal operator, in wire order.
    pub const ALL: [Operator; 19] = [
        Self::Eq,
        Self::Neq,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::EqOrUnset,
        Self::EqLike,
        Self::EqIlike,
        Self::Like,
        Self::NotLike,
        Self::Ilike,
        Self::NotIlike,
        Self::In,
        Self::NotIn,
        Self::ChildOf,
        Self::ParentOf,
        Self::Any,
        Self::NotAny,
    ];

    /// Parses a wire operator. Matching is exact (no case folding).
    #[must_use]
    pub fn parse(op: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == op)
    }

    /// The wire spelling of this operator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::EqOrUnset => "=?",
            Self::EqLike => "=like",
            Self::EqIlike => "=ilike",
            Self::Like => "like",
            Self::NotLike => "not like",
            Self::Ilike => "ilike",
            Self::NotIlike => "not ilike",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::ChildOf => "child_of",
            Self::ParentOf => "parent_of",
            Self::Any => "any",
            Self::NotAny => "not any",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Elements
// ---------------------------------------------------------------------------

/// A single `[field, operator, value]` condition.
///
/// The operator is kept as the caller wrote it: the silent filter does not
/// reject unknown operators, only the diagnostic check reports them.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: String,
    pub value: Value,
}

impl Condition {
    #[must_use]
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value,
        }
    }

    /// First segment of a dotted field path (`partner_id.name` -> `partner_id`).
    #[must_use]
    pub fn root_field(&self) -> &str {
        self.field
            .split_once('.')
            .map_or(self.field.as_str(), |(root, _)| root)
    }

    /// The operator, if it belongs to the legal set.
    #[must_use]
    pub fn parsed_operator(&self) -> Option<Operator> {
        Operator::parse(&self.operator)
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.field)?;
        tuple.serialize_element(&self.operator)?;
        tuple.serialize_element(&self.value)?;
        tuple.end()
    }
}

/// One element of a canonical domain.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainElement {
    Logical(LogicalOp),
    Condition(Condition),
}

impl Serialize for DomainElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Logical(op) => serializer.serialize_str(op.token()),
            Self::Condition(condition) => condition.serialize(serializer),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// Canonical domain: an ordered sequence of logical tokens and condition triples.
///
/// An empty domain means "match all records".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Domain(Vec<DomainElement>);

impl Domain {
    /// Creates an empty domain.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Domain holding exactly one condition.
    #[must_use]
    pub fn single(condition: Condition) -> Self {
        Self(vec![DomainElement::Condition(condition)])
    }

    #[must_use]
    pub fn elements(&self) -> &[DomainElement] {
        &self.0
    }

    #[must_use]
    pub fn into_elements(self) -> Vec<DomainElement> {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, element: DomainElement) {
        self.0.push(element);
    }

    /// Iterates the condition triples, skipping logical tokens.
    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter().filter_map(|element| match element {
            DomainElement::Condition(condition) => Some(condition),
            DomainElement::Logical(_) => None,
        })
    }

    /// Wire form: a JSON array of tokens and `[field, operator, value]` arrays.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Array(
            self.0
                .iter()
                .map(|element| match element {
                    DomainElement::Logical(op) => Value::String(op.token().to_string()),
                    DomainElement::Condition(c) => Value::Array(vec![
                        Value::String(c.field.clone()),
                        Value::String(c.operator.clone()),
                        c.value.clone(),
                    ]),
                })
                .collect(),
        )
    }
}

impl FromIterator<DomainElement> for Domain {
    fn from_iter<I: IntoIterator<Item = DomainElement>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for Domain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.0)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}
