//! Operation routing and execution framework.
//!
//! 1. **Classification** (`classify`): tool name + JSON arguments -> `Operation`
//! 2. **Middleware** (`middleware`): tracing span and metrics layer
//! 3. **Routing** (`router`): dispatch to domain services by `service_name`
//! 4. **Domain services** (`domain`): query, mutation and access

pub mod classify;
pub mod config;
pub mod domain;
pub mod middleware;
pub mod operation;
pub mod router;

pub use classify::OperationService;
pub use config::GatewayConfig;
pub use middleware::build_operation_pipeline;
pub use operation::{
    service_names, tool_names, ClassifyError, Operation, OperationContext, OperationError,
    OperationFuture,
};
pub use router::OperationRouter;
