//! Mutation domain: bulk create/write/unlink.

use std::sync::Arc;
use std::task::{Context, Poll};

use recordgate_core::messages::BatchPhase;
use recordgate_core::ToolResponse;
use serde_json::json;
use tower::Service;

use crate::mutation::{BatchMutationEngine, MutationError};
use crate::service::operation::{Operation, OperationError, OperationFuture};

#[derive(Clone)]
pub struct MutationService {
    engine: Arc<BatchMutationEngine>,
}

impl MutationService {
    #[must_use]
    pub fn new(engine: Arc<BatchMutationEngine>) -> Self {
        Self { engine }
    }

    async fn handle(&self, op: Operation) -> Result<ToolResponse, OperationError> {
        let Operation::BulkOperation { request, .. } = op else {
            return Err(OperationError::WrongService);
        };
        match self.engine.run(&request).await {
            Ok(result) => Ok(ToolResponse::success(&result)),
            Err(err) => {
                let response = ToolResponse::failure(err.to_string());
                Ok(match err {
                    MutationError::ValidationFailed { total, errors } => {
                        response.with_details(json!({
                            "phase": BatchPhase::ValidationFailed,
                            "total": total,
                            "errors": errors,
                        }))
                    }
                    _ => response,
                })
            }
        }
    }
}

impl Service<Operation> for MutationService {
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
