//! Access domain: permission probing.

use std::sync::Arc;
use std::task::{Context, Poll};

use recordgate_core::ToolResponse;
use serde_json::json;
use tower::Service;

use crate::access::{AccessError, AccessProbe};
use crate::service::operation::{Operation, OperationError, OperationFuture};

#[derive(Clone)]
pub struct AccessService {
    probe: Arc<AccessProbe>,
}

impl AccessService {
    #[must_use]
    pub fn new(probe: Arc<AccessProbe>) -> Self {
        Self { probe }
    }

    async fn handle(&self, op: Operation) -> Result<ToolResponse, OperationError> {
        let Operation::CheckAccess { request, .. } = op else {
            return Err(OperationError::WrongService);
        };
        Ok(match self.probe.check(&request).await {
            Ok(decision) => ToolResponse::success(&decision),
            Err(AccessError::Denied { message, decision }) => {
                ToolResponse::failure(message).with_details(json!(decision))
            }
            Err(err) => ToolResponse::failure(err.to_string()),
        })
    }
}

impl Service<Operation> for AccessService {
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
