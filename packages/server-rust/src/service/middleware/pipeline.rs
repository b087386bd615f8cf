//! Pipeline composition: registers the domain services and wraps them with middleware.

use std::sync::Arc;

use recordgate_core::ToolResponse;
use tower::ServiceBuilder;

use super::metrics::MetricsLayer;
use crate::access::AccessProbe;
use crate::mutation::BatchMutationEngine;
use crate::service::config::GatewayConfig;
use crate::service::domain::{AccessService, MutationService, QueryService};
use crate::service::operation::{service_names, Operation, OperationError};
use crate::service::router::OperationRouter;
use crate::traits::RpcClient;

/// Build the operation pipeline over a single remote client.
///
/// Only the metrics layer is installed. Timeouts belong to the transport
/// behind `client`.
#[must_use]
pub fn build_operation_pipeline(
    client: Arc<dyn RpcClient>,
    config: Arc<GatewayConfig>,
) -> impl tower::Service<Operation, Response = ToolResponse, Error = OperationError> {
    let mut router = OperationRouter::new();
    router.register(
        service_names::QUERY,
        QueryService::new(Arc::clone(&client), Arc::clone(&config)),
    );
    router.register(
        service_names::MUTATION,
        MutationService::new(Arc::new(BatchMutationEngine::new(Arc::clone(&client), config))),
    );
    router.register(
        service_names::ACCESS,
        AccessService::new(Arc::new(AccessProbe::new(client))),
    );

    ServiceBuilder::new().layer(MetricsLayer).service(router)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::service::classify::OperationService;
    use crate::service::operation::OperationContext;
    use crate::testing::ScriptedClient;

    fn pipeline(
        client: &Arc<ScriptedClient>,
    ) -> impl tower::Service<Operation, Response = ToolResponse, Error = OperationError> {
        build_operation_pipeline(client.clone(), Arc::new(GatewayConfig::default()))
    }

    #[tokio::test]
    async fn pipeline_routes_classified_tool_calls() {
        let client = Arc::new(ScriptedClient::with_partner_model().visible([5]));
        let classifier = OperationService::new();

        let op = classifier
            .classify("check_access", json!({"model": "res.partner", "record_ids": [5]}))
            .unwrap();
        let resp = pipeline(&client).oneshot(op).await.unwrap();
        assert_eq!(resp.result.unwrap()["has_access"], true);

        let op = classifier
            .classify(
                "bulk_operation",
                json!({
                    "model": "res.partner",
                    "operation": "update",
                    "record_ids": [5],
                    "update_values": {"email": "a@b.c"},
                }),
            )
            .unwrap();
        let resp = pipeline(&client).oneshot(op).await.unwrap();
        assert_eq!(resp.result.unwrap()["updated_ids"], json!([5]));

        let op = classifier
            .classify("search_records", json!({"model": "res.partner"}))
            .unwrap();
        let resp = pipeline(&client).oneshot(op).await.unwrap();
        assert_eq!(resp.result.unwrap()["count"], 0);
    }

    #[tokio::test]
    async fn unregistered_service_is_an_error() {
        let client = Arc::new(ScriptedClient::with_partner_model());
        let op = Operation::ModelInfo {
            ctx: OperationContext::new(1, "reporting"),
            request: recordgate_core::messages::ModelInfoRequest {
                model: "res.partner".into(),
            },
        };
        let err = pipeline(&client).oneshot(op).await.unwrap_err();
        assert!(matches!(err, OperationError::UnknownService { name, .. } if name == "reporting"));
    }
}
