//! Query domain: search, domain diagnostics, value checks and model introspection.

use std::sync::Arc;
use std::task::{Context, Poll};

use recordgate_core::messages::{
    DomainCheckRequest, DomainCheckResult, ModelInfoRequest, ModelSummary, SearchOptions,
    SearchRequest, SearchResult, ValueCheckReport, ValueCheckRequest,
};
use recordgate_core::{check_input, normalize, validate_values, ModelSchema, ToolResponse};
use tower::Service;
use tracing::debug;

use crate::service::config::GatewayConfig;
use crate::service::operation::{Operation, OperationError, OperationFuture};
use crate::traits::{RpcClient, RpcError};

/// Read-only operations against the remote system.
#[derive(Clone)]
pub struct QueryService {
    client: Arc<dyn RpcClient>,
    config: Arc<GatewayConfig>,
}

impl QueryService {
    #[must_use]
    pub fn new(client: Arc<dyn RpcClient>, config: Arc<GatewayConfig>) -> Self {
        Self { client, config }
    }

    async fn handle(&self, op: Operation) -> Result<ToolResponse, OperationError> {
        let response = match op {
            Operation::SearchRecords { request, .. } => self.search_records(request).await,
            Operation::CheckDomain { request, .. } => self.check_domain(request).await,
            Operation::ValidateValues { request, .. } => self.validate_values(request).await,
            Operation::ModelInfo { request, .. } => self.model_info(request).await,
            _ => return Err(OperationError::WrongService),
        };
        Ok(response.unwrap_or_else(|err| ToolResponse::failure(err.to_string())))
    }

    async fn search_records(&self, request: SearchRequest) -> Result<ToolResponse, RpcError> {
        let domain = normalize(&request.domain);
        let options = SearchOptions {
            fields: request.fields,
            limit: Some(self.config.search_limit(request.limit)),
            offset: request.offset,
            order: request.order,
        };
        debug!(model = %request.model, conditions = domain.len(), "searching records");
        let records = self.client.search_read(&request.model, &domain, &options).await?;
        Ok(ToolResponse::success(&SearchResult {
            model: request.model,
            count: records.len(),
            records,
            domain,
        }))
    }

    async fn check_domain(&self, request: DomainCheckRequest) -> Result<ToolResponse, RpcError> {
        let schema = self.schema(&request.model).await?;
        let (domain, report) = check_input(&request.domain, &schema);
        Ok(ToolResponse::success(&DomainCheckResult { report, domain }))
    }

    async fn validate_values(&self, request: ValueCheckRequest) -> Result<ToolResponse, RpcError> {
        let schema = self.schema(&request.model).await?;
        let required = if request.check_required {
            schema.required_fields()
        } else {
            Vec::new()
        };
        let errors = validate_values(&request.values, &schema, &required);
        Ok(ToolResponse::success(&ValueCheckReport {
            valid: errors.is_empty(),
            errors,
        }))
    }

    async fn model_info(&self, request: ModelInfoRequest) -> Result<ToolResponse, RpcError> {
        let info = self.client.get_model_info(&request.model).await?;
        let schema = self.schema(&request.model).await?;
        Ok(ToolResponse::success(&ModelSummary {
            info,
            field_count: schema.len(),
            required_fields: schema.required_fields(),
        }))
    }

    async fn schema(&self, model: &str) -> Result<ModelSchema, RpcError> {
        self.client.get_model_fields(model).await
    }
}

impl Service<Operation> for QueryService {
    type Response = ToolResponse;
    type Error = OperationError;
    type Future = OperationFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        let svc = self.clone();
        Box::pin(async move { svc.handle(op).await })
    }
}

#[cfg(test)]
mod tests {
    use recordgate_core::messages::AccessCheckRequest;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::service::operation::{service_names, OperationContext};
    use crate::testing::ScriptedClient;

    fn service(client: &Arc<ScriptedClient>) -> QueryService {
        QueryService::new(client.clone(), Arc::new(GatewayConfig::default()))
    }

    fn ctx() -> OperationContext {
        OperationContext::new(7, service_names::QUERY)
    }

    fn search(domain: Value, limit: Option<u32>) -> Operation {
        Operation::SearchRecords {
            ctx: ctx(),
            request: SearchRequest {
                model: "res.partner".into(),
                domain,
                fields: Some(vec!["name".into()]),
                limit,
                offset: None,
                order: None,
            },
        }
    }

    #[tokio::test]
    async fn search_normalizes_the_domain_before_sending() {
        let mut row = recordgate_core::Record::new();
        row.insert("name".into(), json!("Acme"));
        let client = Arc::new(ScriptedClient::with_partner_model().search_rows(vec![row]));

        let resp = service(&client)
            .oneshot(search(json!("[[\"name\", \"ilike\", \"acme\"], \"junk\"]"), None))
            .await
            .unwrap();

        assert!(resp.is_success());
        let result = resp.result.unwrap();
        assert_eq!(result["count"], 1);
        assert_eq!(result["domain"], json!([["name", "ilike", "acme"]]));

        let calls = client.calls_to(&["search_read"]);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args["domain"], json!([["name", "ilike", "acme"]]));
        assert_eq!(calls[0].args["options"]["limit"], 80);
    }

    #[tokio::test]
    async fn search_limit_is_capped() {
        let client = Arc::new(ScriptedClient::with_partner_model());
        service(&client).oneshot(search(Value::Null, Some(50_000))).await.unwrap();
        let calls = client.calls_to(&["search_read"]);
        assert_eq!(calls[0].args["options"]["limit"], 1000);
        assert_eq!(calls[0].args["domain"], json!([]));
    }

    #[tokio::test]
    async fn search_on_unknown_model_fails_softly() {
        let client = Arc::new(ScriptedClient::new());
        let resp = service(&client).oneshot(search(json!([]), None)).await.unwrap();
        assert!(!resp.is_success());
        assert_eq!(resp.error.as_deref(), Some("Model 'res.partner' not found"));
    }

    #[tokio::test]
    async fn check_domain_reports_unknown_fields() {
        let client = Arc::new(ScriptedClient::with_partner_model());
        let op = Operation::CheckDomain {
            ctx: ctx(),
            request: DomainCheckRequest {
                model: "res.partner".into(),
                domain: json!([["nmae", "=", "x"]]),
            },
        };
        let resp = service(&client).oneshot(op).await.unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["valid"], false);
        assert_eq!(
            result["errors"][0],
            "field not found: 'nmae' (did you mean: name)"
        );
        assert_eq!(result["domain"], json!([["nmae", "=", "x"]]));
    }

    #[tokio::test]
    async fn check_domain_reports_elements_the_search_would_drop() {
        let client = Arc::new(ScriptedClient::with_partner_model());
        let op = Operation::CheckDomain {
            ctx: ctx(),
            request: DomainCheckRequest {
                model: "res.partner".into(),
                domain: json!([
                    ["name", "=", "x"],
                    ["email", 5, "y"],
                    ["is_company", "="],
                    "AND",
                ]),
            },
        };
        let resp = service(&client).oneshot(op).await.unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["valid"], false);
        assert_eq!(result["errors"].as_array().map(Vec::len), Some(3));
        assert_eq!(result["domain"], json!([["name", "=", "x"]]));
    }

    #[tokio::test]
    async fn validate_values_optionally_enforces_required_fields() {
        let client = Arc::new(ScriptedClient::with_partner_model());
        let op = |check_required| Operation::ValidateValues {
            ctx: ctx(),
            request: ValueCheckRequest {
                model: "res.partner".into(),
                values: json!({"email": "a@b.c"}).as_object().cloned().unwrap_or_default(),
                check_required,
            },
        };

        let lenient = service(&client).oneshot(op(false)).await.unwrap();
        assert_eq!(lenient.result.unwrap(), json!({"valid": true, "errors": []}));

        let strict = service(&client).oneshot(op(true)).await.unwrap();
        assert_eq!(
            strict.result.unwrap(),
            json!({"valid": false, "errors": ["missing required field: name"]})
        );
    }

    #[tokio::test]
    async fn model_info_merges_field_summary() {
        let client = Arc::new(ScriptedClient::with_partner_model());
        let op = Operation::ModelInfo {
            ctx: ctx(),
            request: ModelInfoRequest {
                model: "res.partner".into(),
            },
        };
        let resp = service(&client).oneshot(op).await.unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["model"], "res.partner");
        assert_eq!(result["field_count"], 6);
        assert_eq!(result["required_fields"], json!(["name"]));
    }

    #[tokio::test]
    async fn foreign_operation_is_rejected() {
        let client = Arc::new(ScriptedClient::with_partner_model());
        let op = Operation::CheckAccess {
            ctx: ctx(),
            request: AccessCheckRequest {
                model: "res.partner".into(),
                operation: recordgate_core::messages::AccessOperation::Read,
                record_ids: vec![],
                raise_on_denial: false,
            },
        };
        let err = service(&client).oneshot(op).await.unwrap_err();
        assert!(matches!(err, OperationError::WrongService));
    }
}
