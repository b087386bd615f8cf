//! Tool-call classification: converts a tool name and JSON arguments into a typed `Operation`.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::operation::{service_names, tool_names, ClassifyError, Operation, OperationContext};

// ---------------------------------------------------------------------------
// OperationService
// ---------------------------------------------------------------------------

/// Classifies incoming tool calls into typed `Operation` variants.
///
/// Each call receives a unique, monotonically increasing call ID.
#[derive(Debug)]
pub struct OperationService {
    call_id_counter: AtomicU64,
}

impl OperationService {
    #[must_use]
    pub fn new() -> Self {
        Self {
            call_id_counter: AtomicU64::new(1),
        }
    }

    fn next_call_id(&self) -> u64 {
        self.call_id_counter.fetch_add(1, Ordering::Relaxed)
    }

    fn make_ctx(&self, service_name: &'static str) -> OperationContext {
        OperationContext::new(self.next_call_id(), service_name)
    }

    /// Classify a tool call into an `Operation`.
    ///
    /// `null` arguments are treated as an empty object.
    ///
    /// # Errors
    ///
    /// - `ClassifyError::UnknownTool` for names outside [`tool_names::ALL`]
    /// - `ClassifyError::InvalidArguments` when the arguments do not
    ///   deserialize into the tool's request type
    pub fn classify(&self, tool: &str, arguments: Value) -> Result<Operation, ClassifyError> {
        let arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        match tool {
            // ----- Query domain (service_name = "query") -----
            tool_names::SEARCH_RECORDS => {
                let request = parse(tool_names::SEARCH_RECORDS, arguments)?;
                let ctx = self.make_ctx(service_names::QUERY);
                Ok(Operation::SearchRecords { ctx, request })
            }
            tool_names::CHECK_DOMAIN => {
                let request = parse(tool_names::CHECK_DOMAIN, arguments)?;
                let ctx = self.make_ctx(service_names::QUERY);
                Ok(Operation::CheckDomain { ctx, request })
            }
            tool_names::VALIDATE_VALUES => {
                let request = parse(tool_names::VALIDATE_VALUES, arguments)?;
                let ctx = self.make_ctx(service_names::QUERY);
                Ok(Operation::ValidateValues { ctx, request })
            }
            tool_names::MODEL_INFO => {
                let request = parse(tool_names::MODEL_INFO, arguments)?;
                let ctx = self.make_ctx(service_names::QUERY);
                Ok(Operation::ModelInfo { ctx, request })
            }

            // ----- Mutation domain (service_name = "mutation") -----
            tool_names::BULK_OPERATION => {
                let request = parse(tool_names::BULK_OPERATION, arguments)?;
                let ctx = self.make_ctx(service_names::MUTATION);
                Ok(Operation::BulkOperation { ctx, request })
            }

            // ----- Access domain (service_name = "access") -----
            tool_names::CHECK_ACCESS => {
                let request = parse(tool_names::CHECK_ACCESS, arguments)?;
                let ctx = self.make_ctx(service_names::ACCESS);
                Ok(Operation::CheckAccess { ctx, request })
            }

            other => Err(ClassifyError::UnknownTool {
                name: other.to_string(),
            }),
        }
    }
}

impl Default for OperationService {
    fn default() -> Self {
        Self::new()
    }
}

fn parse<T: DeserializeOwned>(tool: &'static str, arguments: Value) -> Result<T, ClassifyError> {
    serde_json::from_value(arguments)
        .map_err(|source| ClassifyError::InvalidArguments { tool, source })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
