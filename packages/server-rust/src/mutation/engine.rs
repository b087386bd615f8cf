use std::sync::Arc;

use recordgate_core::messages::{
    BatchError, BatchPhase, BatchResult, BulkOperationRequest, MutationKind,
};
use recordgate_core::{validate_values, ModelSchema, Record};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::service::config::GatewayConfig;
use crate::traits::{RpcClient, RpcError};

/// Errors that end a bulk mutation before any window is submitted.
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("Model '{model}' not found")]
    ModelNotFound { model: String },
    #[error("{0}")]
    InvalidInput(String),
    /// One entry per failing record. Nothing was written.
    #[error("validation failed for {} of {total} record(s)", .errors.len())]
    ValidationFailed { total: usize, errors: Vec<BatchError> },
    #[error("failed to load schema: {0}")]
    Schema(#[source] RpcError),
}

/// Validated work, borrowed from the request.
enum Plan<'a> {
    Create(&'a [Record]),
    Write {
        ids: &'a [i64],
        values: &'a Map<String, Value>,
    },
    Unlink(&'a [i64]),
}

impl Plan<'_> {
    fn total(&self) -> usize {
        match self {
            Self::Create(rows) => rows.len(),
            Self::Write { ids, .. } | Self::Unlink(ids) => ids.len(),
        }
    }
}

/// Runs bulk mutations against an injected [`RpcClient`].
///
/// Stateless between calls: every `run` builds its own [`BatchResult`].
pub struct BatchMutationEngine {
    client: Arc<dyn RpcClient>,
    config: Arc<GatewayConfig>,
}

impl BatchMutationEngine {
    #[must_use]
    pub fn new(client: Arc<dyn RpcClient>, config: Arc<GatewayConfig>) -> Self {
        Self { client, config }
    }

    /// Validates and, unless `validate_only` is set, executes a bulk mutation.
    ///
    /// A failing window does not stop later windows; its items are reported
    /// in `errors` with the window's remote error.
    ///
    /// # Errors
    ///
    /// - `ModelNotFound` if the model is unknown to the remote system
    /// - `InvalidInput` for empty record/value lists
    /// - `ValidationFailed` if any payload fails field validation
    /// - `Schema` if the schema could not be fetched
    pub async fn run(&self, request: &BulkOperationRequest) -> Result<BatchResult, MutationError> {
        let schema = match self.client.get_model_fields(&request.model).await {
            Ok(schema) => schema,
            Err(RpcError::ModelNotFound { model }) => {
                return Err(MutationError::ModelNotFound { model })
            }
            Err(err) => return Err(MutationError::Schema(err)),
        };

        let plan = validate(request, &schema).inspect_err(|err| {
            info!(
                model = %request.model,
                operation = request.operation.method(),
                error = %err,
                "bulk mutation rejected"
            );
        })?;

        let batch_size = self.config.batch_size(request.batch_size);
        let mut result =
            BatchResult::new(request.operation, &request.model, plan.total(), batch_size);

        if request.validate_only {
            result.phase = BatchPhase::WouldExecute;
            result.validate_only = true;
            result.would_affect = Some(result.total);
            return Ok(result);
        }

        result.phase = BatchPhase::Executing;
        match plan {
            Plan::Create(rows) => {
                for (window, chunk) in rows.chunks(batch_size).enumerate() {
                    let rows = chunk.iter().cloned().map(Value::Object).collect();
                    let args = vec![Value::Array(rows)];
                    result.batches += 1;
                    let outcome = self.submit(&request.model, "create", args).await;
                    let offset = window * batch_size;
                    match outcome {
                        Ok(created) => apply_success(&mut result, chunk.len(), parse_ids(&created)),
                        Err(error) => {
                            for (i, row) in chunk.iter().enumerate() {
                                let row = Some(row.clone());
                                push_failure(&mut result, offset + i, None, &error, row);
                            }
                        }
                    }
                }
            }
            Plan::Write { ids, values } => {
                for (window, chunk) in ids.chunks(batch_size).enumerate() {
                    let args = vec![Value::from(chunk.to_vec()), Value::Object(values.clone())];
                    result.batches += 1;
                    let outcome = self.submit(&request.model, "write", args).await;
                    apply_id_window(&mut result, window * batch_size, chunk, outcome);
                }
            }
            Plan::Unlink(ids) => {
                for (window, chunk) in ids.chunks(batch_size).enumerate() {
                    let args = vec![Value::from(chunk.to_vec())];
                    result.batches += 1;
                    let outcome = self.submit(&request.model, "unlink", args).await;
                    apply_id_window(&mut result, window * batch_size, chunk, outcome);
                }
            }
        }

        result.phase = BatchPhase::Done;
        debug!(
            model = %request.model,
            operation = request.operation.method(),
            total = result.total,
            succeeded = result.succeeded,
            failed = result.failed,
            batches = result.batches,
            "bulk mutation finished"
        );
        Ok(result)
    }

    /// Submits one window. Errors are returned as the text callers will see.
    async fn submit(
        &self,
        model: &str,
        method: &'static str,
        args: Vec<Value>,
    ) -> Result<Value, String> {
        match self.client.execute(model, method, args, Map::new()).await {
            Ok(value) => {
                metrics::counter!(
                    "recordgate_batch_windows_total",
                    "operation" => method,
                    "outcome" => "ok"
                )
                .increment(1);
                Ok(value)
            }
            Err(err) => {
                warn!(model, method, error = %err, "batch window failed");
                metrics::counter!(
                    "recordgate_batch_windows_total",
                    "operation" => method,
                    "outcome" => "error"
                )
                .increment(1);
                Err(err.to_string())
            }
        }
    }
}

fn validate<'a>(
    request: &'a BulkOperationRequest,
    schema: &ModelSchema,
) -> Result<Plan<'a>, MutationError> {
    match request.operation {
        MutationKind::Create => {
            if request.values.is_empty() {
                return Err(MutationError::InvalidInput(
                    "create requires a non-empty 'values' list".into(),
                ));
            }
            let required = schema.required_fields();
            let errors: Vec<BatchError> = request
                .values
                .iter()
                .enumerate()
                .filter_map(|(index, row)| {
                    let problems = validate_values(row, schema, &required);
                    (!problems.is_empty()).then(|| BatchError {
                        index,
                        record_id: None,
                        error: problems.join("; "),
                        values: Some(row.clone()),
                    })
                })
                .collect();
            if !errors.is_empty() {
                return Err(MutationError::ValidationFailed {
                    total: request.values.len(),
                    errors,
                });
            }
            Ok(Plan::Create(&request.values))
        }
        MutationKind::Write => {
            if request.record_ids.is_empty() {
                return Err(MutationError::InvalidInput(
                    "write requires a non-empty 'record_ids' list".into(),
                ));
            }
            if request.update_values.is_empty() {
                return Err(MutationError::InvalidInput(
                    "write requires a non-empty 'update_values' map".into(),
                ));
            }
            // Partial update: no required-field enforcement.
            let problems = validate_values(&request.update_values, schema, &[]);
            if !problems.is_empty() {
                return Err(MutationError::ValidationFailed {
                    total: request.record_ids.len(),
                    errors: vec![BatchError {
                        index: 0,
                        record_id: None,
                        error: problems.join("; "),
                        values: Some(request.update_values.clone()),
                    }],
                });
            }
            Ok(Plan::Write {
                ids: &request.record_ids,
                values: &request.update_values,
            })
        }
        MutationKind::Unlink => {
            if request.record_ids.is_empty() {
                return Err(MutationError::InvalidInput(
                    "unlink requires a non-empty 'record_ids' list".into(),
                ));
            }
            Ok(Plan::Unlink(&request.record_ids))
        }
    }
}

fn apply_success(result: &mut BatchResult, count: usize, ids: Vec<i64>) {
    result.processed += count;
    result.succeeded += count;
    result.ids_mut().extend(ids);
}

fn apply_id_window(
    result: &mut BatchResult,
    offset: usize,
    chunk: &[i64],
    outcome: Result<Value, String>,
) {
    match outcome {
        Ok(_) => apply_success(result, chunk.len(), chunk.to_vec()),
        Err(error) => {
            for (i, id) in chunk.iter().enumerate() {
                push_failure(result, offset + i, Some(*id), &error, None);
            }
        }
    }
}

fn push_failure(
    result: &mut BatchResult,
    index: usize,
    record_id: Option<i64>,
    error: &str,
    values: Option<Record>,
) {
    result.processed += 1;
    result.failed += 1;
    result.errors.push(BatchError {
        index,
        record_id,
        error: error.to_string(),
        values,
    });
}

/// `create` answers with a list of ids, or a single id for one record.
fn parse_ids(value: &Value) -> Vec<i64> {
    match value {
        Value::Array(items) => items.iter().filter_map(Value::as_i64).collect(),
        Value::Number(n) => n.as_i64().into_iter().collect(),
        _ => Vec::new(),
    }
}
