//! Metrics middleware for operations.
//!
//! Wraps each operation in an `operation` tracing span and records
//! `recordgate_operations_total` and `recordgate_operation_duration_ms`
//! through the `metrics` facade.

use std::task::{Context, Poll};
use std::time::Instant;

use recordgate_core::ToolResponse;
use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use crate::service::operation::{Operation, OperationError, OperationFuture};

// ---------------------------------------------------------------------------
// MetricsLayer
// ---------------------------------------------------------------------------

/// Tower layer that instruments operations with timing and outcome.
#[derive(Debug, Clone)]
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService { inner }
    }
}

// ---------------------------------------------------------------------------
// MetricsService
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MetricsService<S> {
    inner: S,
}

/// `ok` for a successful envelope, `failed` for a failed one, `error` when
/// the pipeline itself rejected the operation.
fn outcome(result: &Result<ToolResponse, OperationError>) -> &'static str {
    match result {
        Ok(response) if response.is_success() => "ok",
        Ok(_) => "failed",
        Err(_) => "error",
    }
}

impl<S> Service<Operation> for MetricsService<S>
where
    S: Service<Operation, Response = ToolResponse, Error = OperationError> + Send,
    S::Future: Send + 'static,
{
    type Response = ToolResponse;
    type Error = OperationError;
    type Future = OperationFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        let service_name = op.ctx().service_name;
        let call_id = op.ctx().call_id;
        let tool = op.tool_name();

        let span = info_span!(
            "operation",
            service = service_name,
            tool = tool,
            call_id = call_id,
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let fut = self.inner.call(op);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;
                let elapsed = start.elapsed();
                let outcome = outcome(&result);

                #[allow(clippy::cast_possible_truncation)]
                let duration_ms = elapsed.as_millis() as u64;
                tracing::Span::current().record("duration_ms", duration_ms);
                tracing::Span::current().record("outcome", outcome);

                metrics::counter!(
                    "recordgate_operations_total",
                    "service" => service_name,
                    "outcome" => outcome
                )
                .increment(1);
                metrics::histogram!("recordgate_operation_duration_ms", "service" => service_name)
                    .record(elapsed.as_secs_f64() * 1000.0);

                tracing::info!(
                    service = service_name,
                    tool = tool,
                    call_id = call_id,
                    duration_ms = duration_ms,
                    outcome = outcome,
                    "operation complete"
                );

                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use recordgate_core::messages::ModelInfoRequest;
    use tower::ServiceExt;

    use super::*;
    use crate::service::operation::OperationContext;

    /// Immediately-completing service answering with a fixed envelope.
    struct ImmediateService(ToolResponse);

    impl Service<Operation> for ImmediateService {
        type Response = ToolResponse;
        type Error = OperationError;
        type Future = OperationFuture;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, _op: Operation) -> Self::Future {
            let response = self.0.clone();
            Box::pin(async move { Ok(response) })
        }
    }

    fn make_op() -> Operation {
        Operation::ModelInfo {
            ctx: OperationContext::new(42, "query"),
            request: ModelInfoRequest {
                model: "res.partner".into(),
            },
        }
    }

    #[tokio::test]
    async fn metrics_layer_passes_through_response() {
        let svc = MetricsLayer.layer(ImmediateService(ToolResponse::failure("nope")));
        let resp = svc.oneshot(make_op()).await.unwrap();
        assert_eq!(resp.error.as_deref(), Some("nope"));
    }

    #[test]
    fn outcome_distinguishes_failed_envelopes_from_errors() {
        assert_eq!(outcome(&Ok(ToolResponse::success(&1))), "ok");
        assert_eq!(outcome(&Ok(ToolResponse::failure("x"))), "failed");
        assert_eq!(outcome(&Err(OperationError::WrongService)), "error");
    }
}
