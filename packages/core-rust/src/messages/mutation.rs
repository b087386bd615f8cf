//! Bulk create/write/unlink messages.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Mutation verb. `update` and `delete` are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Create,
    #[serde(alias = "update")]
    Write,
    #[serde(alias = "delete")]
    Unlink,
}

impl MutationKind {
    /// Remote method name.
    #[must_use]
    pub fn method(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Write => "write",
            Self::Unlink => "unlink",
        }
    }
}

/// Input of a bulk mutation.
///
/// `values` is used by `create`, `record_ids` + `update_values` by `write`,
/// `record_ids` alone by `unlink`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkOperationRequest {
    pub model: String,
    pub operation: MutationKind,
    #[serde(default)]
    pub values: Vec<Map<String, Value>>,
    #[serde(default)]
    pub record_ids: Vec<i64>,
    #[serde(default)]
    pub update_values: Map<String, Value>,
    /// Window size; clamped into the configured bounds.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub validate_only: bool,
}

/// Where a bulk mutation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    Validating,
    ValidationFailed,
    WouldExecute,
    Executing,
    Done,
}

/// A single failed item of a bulk mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchError {
    /// Position of the item in the request.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub record_id: Option<i64>,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub values: Option<Map<String, Value>>,
}

/// Accumulated outcome of a bulk mutation. Built once per call, only ever added to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub operation: MutationKind,
    pub model: String,
    pub phase: BatchPhase,
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub batch_size: usize,
    /// Number of windows submitted to the remote system.
    pub batches: usize,
    pub validate_only: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub would_affect: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub updated_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_ids: Option<Vec<i64>>,
    pub errors: Vec<BatchError>,
}

impl BatchResult {
    #[must_use]
    pub fn new(
        operation: MutationKind,
        model: impl Into<String>,
        total: usize,
        batch_size: usize,
    ) -> Self {
        Self {
            operation,
            model: model.into(),
            phase: BatchPhase::Validating,
            total,
            processed: 0,
            succeeded: 0,
            failed: 0,
            batch_size,
            batches: 0,
            validate_only: false,
            would_affect: None,
            created_ids: None,
            updated_ids: None,
            deleted_ids: None,
            errors: Vec::new(),
        }
    }

    /// Id list for this result's operation, created on first use.
    pub fn ids_mut(&mut self) -> &mut Vec<i64> {
        let slot = match self.operation {
            MutationKind::Create => &mut self.created_ids,
            MutationKind::Write => &mut self.updated_ids,
            MutationKind::Unlink => &mut self.deleted_ids,
        };
        slot.get_or_insert_with(Vec::new)
    }
}
