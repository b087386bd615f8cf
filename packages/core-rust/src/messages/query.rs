//! Search and introspection messages.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Record;
use crate::domain::{Domain, DomainReport};

/// Input of `search_records`. `domain` accepts every shape the normalizer does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub model: String,
    #[serde(default)]
    pub domain: Value,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub order: Option<String>,
}

/// Paging and projection passed to the remote `search_read`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub order: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub model: String,
    pub count: usize,
    pub records: Vec<Record>,
    /// The canonical domain actually sent.
    pub domain: Domain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainCheckRequest {
    pub model: String,
    #[serde(default)]
    pub domain: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainCheckResult {
    #[serde(flatten)]
    pub report: DomainReport,
    pub domain: Domain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCheckRequest {
    pub model: String,
    pub values: Map<String, Value>,
    /// Enforce the model's required fields, as a create would.
    #[serde(default)]
    pub check_required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCheckReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfoRequest {
    pub model: String,
}

/// Registry entry of a remote model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: i64,
    pub name: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    #[serde(flatten)]
    pub info: ModelInfo,
    pub field_count: usize,
    pub required_fields: Vec<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::normalize;

    #[test]
    fn search_request_domain_defaults_to_null() {
        let request: SearchRequest =
            serde_json::from_value(json!({"model": "res.partner", "limit": 5})).unwrap();
        assert!(request.domain.is_null());
        assert_eq!(request.limit, Some(5));
    }

    #[test]
    fn domain_check_result_flattens_report() {
        let result = DomainCheckResult {
            report: DomainReport {
                valid: true,
                errors: vec![],
                warnings: vec!["w".into()],
            },
            domain: normalize(&json!(["name", "=", "x"])),
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "valid": true,
                "errors": [],
                "warnings": ["w"],
                "domain": [["name", "=", "x"]],
            })
        );
    }
}
