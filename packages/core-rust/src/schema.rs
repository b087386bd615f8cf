//! Live field schema of a remote model.
//!
//! Mirrors the remote `fields_get` payload: a map from field name to a
//! definition carrying the field type, `required`/`readonly` flags, the target
//! model of relational fields, and the declared values of selection fields.
//! Schemas are fetched fresh for every validating call and never cached.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// FieldType
// ---------------------------------------------------------------------------

/// Closed vocabulary of remote field types.
///
/// Types outside the vocabulary land in [`FieldType::Other`] and receive no
/// type-specific validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Integer,
    Float,
    Monetary,
    Boolean,
    Char,
    Text,
    Html,
    Date,
    Datetime,
    Binary,
    Selection,
    Many2one,
    One2many,
    Many2many,
    Other(String),
}

impl FieldType {
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "integer" => Self::Integer,
            "float" => Self::Float,
            "monetary" => Self::Monetary,
            "boolean" => Self::Boolean,
            "char" => Self::Char,
            "text" => Self::Text,
            "html" => Self::Html,
            "date" => Self::Date,
            "datetime" => Self::Datetime,
            "binary" => Self::Binary,
            "selection" => Self::Selection,
            "many2one" => Self::Many2one,
            "one2many" => Self::One2many,
            "many2many" => Self::Many2many,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Monetary => "monetary",
            Self::Boolean => "boolean",
            Self::Char => "char",
            Self::Text => "text",
            Self::Html => "html",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Binary => "binary",
            Self::Selection => "selection",
            Self::Many2one => "many2one",
            Self::One2many => "one2many",
            Self::Many2many => "many2many",
            Self::Other(name) => name,
        }
    }

    /// Whether values of this type reference record ids of another model.
    #[must_use]
    pub fn is_relational(&self) -> bool {
        matches!(self, Self::Many2one | Self::One2many | Self::Many2many)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}

// ---------------------------------------------------------------------------
// FieldDef
// ---------------------------------------------------------------------------

/// One declared `(value, label)` pair of a selection field.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOption {
    pub value: Value,
    pub label: String,
}

impl SelectionOption {
    /// The value as the string it is compared by.
    #[must_use]
    pub fn key(&self) -> String {
        value_key(&self.value)
    }
}

impl Serialize for SelectionOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.value, &self.label).serialize(serializer)
    }
}

/// Definition of a single field within a [`ModelSchema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Human-readable label.
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub required: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub readonly: bool,
    /// Target model, relational types only.
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    /// Declared values, selection type only. Dynamic selections arrive empty.
    #[serde(
        default,
        deserialize_with = "deserialize_selection",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub selection: Vec<SelectionOption>,
}

impl FieldDef {
    #[must_use]
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            string: None,
            required: false,
            readonly: false,
            relation: None,
            selection: Vec::new(),
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    #[must_use]
    pub fn relation(mut self, model: impl Into<String>) -> Self {
        self.relation = Some(model.into());
        self
    }

    #[must_use]
    pub fn selection<I, V, L>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<Value>,
        L: Into<String>,
    {
        self.selection = options
            .into_iter()
            .map(|(value, label)| SelectionOption {
                value: value.into(),
                label: label.into(),
            })
            .collect();
        self
    }

    /// Whether `value` matches one of the declared selection values.
    #[must_use]
    pub fn allows_selection(&self, value: &Value) -> bool {
        let key = value_key(value);
        self.selection.iter().any(|option| option.key() == key)
    }
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

fn deserialize_selection<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<SelectionOption>, D::Error> {
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Array(mut pair) if !pair.is_empty() => {
                let label = pair.get(1).map(value_key).unwrap_or_default();
                Some(SelectionOption {
                    value: pair.swap_remove(0),
                    label,
                })
            }
            _ => None,
        })
        .collect())
}

/// String form used for loose value comparison (`"3"` equals `3`).
pub(crate) fn value_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// ModelSchema
// ---------------------------------------------------------------------------

/// Field schema of one remote model, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelSchema {
    fields: BTreeMap<String, FieldDef>,
}

impl ModelSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `fields_get`-style JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not an object of field definitions.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Builder-style insertion, mostly for fixtures.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, def: FieldDef) {
        self.fields.insert(name.into(), def);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDef)> {
        self.fields.iter().map(|(name, def)| (name.as_str(), def))
    }

    /// Fields a new record must supply.
    ///
    /// Required fields minus readonly ones, `id`, private (`_`-prefixed)
    /// fields, and one2many fields, which the remote system fills itself.
    #[must_use]
    pub fn required_fields(&self) -> Vec<String> {
        self.iter()
            .filter(|(name, def)| {
                def.required
                    && !def.readonly
                    && *name != "id"
                    && !name.starts_with('_')
                    && def.field_type != FieldType::One2many
            })
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Up to `limit` field names closest to `name`, best match first.
    #[must_use]
    pub fn suggest(&self, name: &str, limit: usize) -> Vec<String> {
        let needle = name.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .fields
            .keys()
            .filter_map(|candidate| {
                let lowered = candidate.to_lowercase();
                let mut score = similarity(&needle, &lowered);
                if !needle.is_empty() && lowered.contains(&needle) {
                    score = score.max(SUGGESTION_CUTOFF);
                }
                (score >= SUGGESTION_CUTOFF).then_some((score, candidate.as_str()))
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, candidate)| candidate.to_string())
            .collect()
    }
}

const SUGGESTION_CUTOFF: f64 = 0.5;

/// Normalized edit similarity in `[0, 1]`.
#[allow(clippy::cast_precision_loss)]
fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }

    // Single-row Levenshtein.
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = diagonal + usize::from(ca != cb);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(diagonal + 1);
        }
    }
    1.0 - row[b.len()] as f64 / longest as f64
}
