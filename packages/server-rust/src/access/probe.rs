use std::collections::BTreeMap;
use std::sync::Arc;

use recordgate_core::messages::{AccessCheckRequest, AccessDecision, AccessOperation};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::denial::{parse_denial, Denial};
use crate::traits::{RpcClient, RpcError};

/// Reason recorded for every record once the model-level gate has failed.
pub const NO_MODEL_ACCESS: &str = "No model-level access";

/// Reason recorded for a record the minimal read did not return.
pub const RECORD_HIDDEN: &str = "Record not found or access denied";

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("Model '{model}' not found")]
    ModelNotFound { model: String },
    /// Raised instead of returning a negative decision when the caller asked for it.
    #[error("{message}")]
    Denied {
        message: String,
        decision: Box<AccessDecision>,
    },
    #[error("failed to load schema: {0}")]
    Schema(#[source] RpcError),
}

/// Determines and explains access denial for a model and, optionally, records.
///
/// Record checks run one at a time, in input order, and only after the
/// model-level probe granted access.
pub struct AccessProbe {
    client: Arc<dyn RpcClient>,
}

impl AccessProbe {
    #[must_use]
    pub fn new(client: Arc<dyn RpcClient>) -> Self {
        Self { client }
    }

    /// Probes access for `request.operation` on the model and each requested record.
    ///
    /// A record the minimal read does not return counts as denied: from the
    /// outside, "does not exist" and "hidden by record rules" look the same.
    ///
    /// # Errors
    ///
    /// - `ModelNotFound` if the model is unknown
    /// - `Denied` if `raise_on_denial` is set and access is not granted
    /// - `Schema` if the schema lookup failed for another reason
    pub async fn check(&self, request: &AccessCheckRequest) -> Result<AccessDecision, AccessError> {
        let model = request.model.as_str();
        let operation = request.operation;

        match self.client.get_model_fields(model).await {
            Ok(_) => {}
            Err(RpcError::ModelNotFound { model }) => {
                return Err(AccessError::ModelNotFound { model })
            }
            Err(err) => return Err(AccessError::Schema(err)),
        }

        let model_probe = self.probe_model(model, operation).await;
        let mut decision = AccessDecision {
            model: model.to_string(),
            operation,
            has_access: false,
            model_access: model_probe.is_ok(),
            record_access: BTreeMap::new(),
            denied_records: Vec::new(),
            record_errors: BTreeMap::new(),
            reason: None,
            required_groups: None,
        };
        if let Err(denial) = model_probe {
            info!(model, %operation, reason = %denial.reason, "model-level access denied");
            metrics::counter!("recordgate_access_denials_total", "level" => "model").increment(1);
            decision.reason = Some(denial.reason);
            decision.required_groups = denial.required_groups;
        }

        for &id in &request.record_ids {
            if decision.record_access.contains_key(&id) {
                continue;
            }
            let outcome = if decision.model_access {
                self.probe_record(model, id).await
            } else {
                Err(NO_MODEL_ACCESS.to_string())
            };
            match outcome {
                Ok(()) => {
                    decision.record_access.insert(id, true);
                }
                Err(reason) => {
                    decision.record_access.insert(id, false);
                    decision.denied_records.push(id);
                    decision.record_errors.insert(id, reason);
                }
            }
        }

        decision.has_access =
            decision.model_access && decision.record_access.values().all(|granted| *granted);

        if decision.model_access && !decision.denied_records.is_empty() {
            metrics::counter!("recordgate_access_denials_total", "level" => "record")
                .increment(decision.denied_records.len() as u64);
            decision.reason = Some(format!(
                "Access denied to {} of {} record(s)",
                decision.denied_records.len(),
                decision.record_access.len()
            ));
        }

        if request.raise_on_denial && !decision.has_access {
            let message = denial_message(&decision);
            return Err(AccessError::Denied {
                message,
                decision: Box::new(decision),
            });
        }
        Ok(decision)
    }

    /// Non-raising `check_access_rights`: only a literal `true` grants access.
    async fn probe_model(&self, model: &str, operation: AccessOperation) -> Result<(), Denial> {
        let mut kwargs = Map::new();
        kwargs.insert("raise_exception".into(), Value::Bool(false));
        match self
            .client
            .execute(model, "check_access_rights", vec![json!(operation.as_str())], kwargs)
            .await
        {
            Ok(Value::Bool(true)) => Ok(()),
            Ok(other) => {
                debug!(
                    model,
                    %operation,
                    response = %other,
                    "access check answered without granting"
                );
                Err(Denial {
                    reason: format!("No {operation} access on model '{model}'"),
                    required_groups: None,
                })
            }
            Err(err) => Err(parse_denial(&err.to_string())),
        }
    }

    /// Minimal read of the `id` field; an empty answer means denied.
    async fn probe_record(&self, model: &str, id: i64) -> Result<(), String> {
        let fields = ["id".to_string()];
        match self.client.read_records(model, &[id], Some(&fields)).await {
            Ok(rows) if rows.is_empty() => Err(RECORD_HIDDEN.to_string()),
            Ok(_) => Ok(()),
            Err(err) => Err(parse_denial(&err.to_string()).reason),
        }
    }
}

/// The model-level reason when the model gate failed, since no record was read
/// in that case; otherwise the denied record ids.
fn denial_message(decision: &AccessDecision) -> String {
    if !decision.model_access || decision.denied_records.is_empty() {
        return decision
            .reason
            .clone()
            .unwrap_or_else(|| format!("Access denied on model '{}'", decision.model));
    }
    let ids: Vec<String> = decision.denied_records.iter().map(ToString::to_string).collect();
    format!(
        "Access denied for {} on {} record(s): {}",
        decision.operation,
        decision.model,
        ids.join(", ")
    )
}
