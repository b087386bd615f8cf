//! Request and response types exchanged with the callable-operation layer.
//!
//! Field names are `snake_case` on the wire. Every operation answers with a
//! [`ToolResponse`] envelope: `{"success": true, "result": ...}` or
//! `{"success": false, "error": "..."}`.

pub mod access;
pub mod mutation;
pub mod query;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use access::{AccessCheckRequest, AccessDecision, AccessOperation};
pub use mutation::{BatchError, BatchPhase, BatchResult, BulkOperationRequest, MutationKind};
pub use query::{
    DomainCheckRequest, DomainCheckResult, ModelInfo, ModelInfoRequest, ModelSummary,
    SearchOptions, SearchRequest, SearchResult, ValueCheckReport, ValueCheckRequest,
};

/// A record as returned by the remote system: field name to value.
pub type Record = Map<String, Value>;

/// Envelope returned by every operation. No error ever crosses it as anything but a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    /// Structured context for a failure, e.g. per-record validation errors.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<Value>,
}

impl ToolResponse {
    /// Wraps a serializable result. A result that cannot be serialized becomes a failure.
    pub fn success<T: Serialize>(result: &T) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self {
                success: true,
                result: Some(value),
                error: None,
                details: None,
            },
            Err(err) => Self::failure(format!("failed to serialize result: {err}")),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }
}
