//! Permission probe messages.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Operation whose permission is probed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessOperation {
    #[default]
    Read,
    Write,
    Create,
    Unlink,
}

impl AccessOperation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Create => "create",
            Self::Unlink => "unlink",
        }
    }
}

impl fmt::Display for AccessOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCheckRequest {
    pub model: String,
    #[serde(default)]
    pub operation: AccessOperation,
    /// Records to probe individually. Empty means model-level only.
    #[serde(default)]
    pub record_ids: Vec<i64>,
    /// Fail the call instead of returning a negative decision.
    #[serde(default)]
    pub raise_on_denial: bool,
}

/// Result of an access probe. Computed fresh per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub model: String,
    pub operation: AccessOperation,
    pub has_access: bool,
    pub model_access: bool,
    pub record_access: BTreeMap<i64, bool>,
    pub denied_records: Vec<i64>,
    /// Denial reason per denied record.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub record_errors: BTreeMap<i64, String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub required_groups: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_defaults_to_read_without_records() {
        let request: AccessCheckRequest =
            serde_json::from_value(json!({"model": "sale.order"})).unwrap();
        assert_eq!(request.operation, AccessOperation::Read);
        assert!(request.record_ids.is_empty());
        assert!(!request.raise_on_denial);
    }

    #[test]
    fn decision_serializes_record_maps_with_string_keys() {
        let decision = AccessDecision {
            model: "sale.order".into(),
            operation: AccessOperation::Write,
            has_access: false,
            model_access: true,
            record_access: BTreeMap::from([(1, true), (2, false)]),
            denied_records: vec![2],
            record_errors: BTreeMap::from([(2, "Record not found or access denied".into())]),
            reason: None,
            required_groups: None,
        };
        let value = serde_json::to_value(&decision).unwrap();
        assert_eq!(value["record_access"], json!({"1": true, "2": false}));
        assert_eq!(value["operation"], json!("write"));
        assert!(value.get("reason").is_none());
    }
}
