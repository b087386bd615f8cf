//! Operation routing: dispatches `Operation` to domain services by `service_name`.

use std::collections::HashMap;
use std::task::{Context, Poll};

use recordgate_core::ToolResponse;
use tower::util::BoxService;
use tower::Service;

use super::operation::{Operation, OperationError, OperationFuture};

type DomainService = BoxService<Operation, ToolResponse, OperationError>;

/// Routes `Operation` values to the query, mutation or access service.
///
/// Operations whose `service_name` has no registered service return
/// `OperationError::UnknownService` naming the tool that was called.
#[derive(Default)]
pub struct OperationRouter {
    services: HashMap<&'static str, DomainService>,
}

impl OperationRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a domain service for the given name.
    pub fn register<S>(&mut self, name: &'static str, service: S)
    where
        S: Service<Operation, Response = ToolResponse, Error = OperationError> + Send + 'static,
        S::Future: Send + 'static,
    {
        self.services.insert(name, BoxService::new(service));
    }

    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }
}

impl Service<Operation> for OperationRouter {
    type Response = ToolResponse;
    type Error = OperationError;
    type Future = OperationFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        for svc in self.services.values_mut() {
            match svc.poll_ready(cx) {
                Poll::Ready(Ok(())) => {}
                not_ready => return not_ready,
            }
        }
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        let service_name = op.ctx().service_name;
        match self.services.get_mut(service_name) {
            Some(svc) => svc.call(op),
            None => {
                let tool = op.tool_name();
                Box::pin(async move {
                    Err(OperationError::UnknownService {
                        name: service_name.to_string(),
                        tool,
                    })
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use recordgate_core::messages::ModelInfoRequest;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::service::operation::{service_names, tool_names, OperationContext};

    /// Answers every operation with its service name, tool and call id.
    #[derive(Clone)]
    struct EchoService {
        name: &'static str,
    }

    impl Service<Operation> for EchoService {
        type Response = ToolResponse;
        type Error = OperationError;
        type Future = OperationFuture;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, op: Operation) -> Self::Future {
            let body = json!({
                "service": self.name,
                "tool": op.tool_name(),
                "call_id": op.ctx().call_id,
            });
            Box::pin(async move { Ok(ToolResponse::success(&body)) })
        }
    }

    fn model_info(service_name: &'static str) -> Operation {
        Operation::ModelInfo {
            ctx: OperationContext::new(1, service_name),
            request: ModelInfoRequest {
                model: "res.partner".into(),
            },
        }
    }

    #[tokio::test]
    async fn routes_to_registered_service() {
        let mut router = OperationRouter::new();
        router.register(service_names::QUERY, EchoService { name: "query" });

        let resp = router.oneshot(model_info(service_names::QUERY)).await.unwrap();
        assert_eq!(
            resp.result,
            Some(json!({"service": "query", "tool": "model_info", "call_id": 1}))
        );
    }

    #[tokio::test]
    async fn unknown_service_names_the_tool() {
        let mut router = OperationRouter::new();
        router.register(service_names::QUERY, EchoService { name: "query" });

        let err = router.oneshot(model_info("nonexistent")).await.unwrap_err();
        assert!(matches!(
            &err,
            OperationError::UnknownService { name, tool: tool_names::MODEL_INFO }
                if name == "nonexistent"
        ));
        assert_eq!(
            err.to_string(),
            "no service registered as 'nonexistent' for tool model_info"
        );
    }

    #[tokio::test]
    async fn routes_to_correct_service_among_multiple() {
        let mut router = OperationRouter::new();
        router.register(service_names::QUERY, EchoService { name: "query" });
        router.register(service_names::MUTATION, EchoService { name: "mutation" });
        router.register(service_names::ACCESS, EchoService { name: "access" });
        assert!(router.is_registered(service_names::ACCESS));

        for name in [service_names::MUTATION, service_names::ACCESS] {
            let resp = ServiceExt::ready(&mut router)
                .await
                .unwrap()
                .call(model_info(name))
                .await
                .unwrap();
            assert_eq!(resp.result.unwrap()["service"], name);
        }
    }
}
