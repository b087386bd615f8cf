//! Typed operations flowing through the service pipeline.

use std::future::Future;
use std::pin::Pin;

use recordgate_core::messages::{
    AccessCheckRequest, BulkOperationRequest, DomainCheckRequest, ModelInfoRequest,
    SearchRequest, ValueCheckRequest,
};
use recordgate_core::ToolResponse;

/// Future returned by every service in the pipeline.
pub type OperationFuture =
    Pin<Box<dyn Future<Output = Result<ToolResponse, OperationError>> + Send>>;

/// Service names used for routing.
pub mod service_names {
    pub const QUERY: &str = "query";
    pub const MUTATION: &str = "mutation";
    pub const ACCESS: &str = "access";
}

/// Tool names accepted by [`OperationService::classify`](super::OperationService::classify).
pub mod tool_names {
    pub const SEARCH_RECORDS: &str = "search_records";
    pub const CHECK_DOMAIN: &str = "check_domain";
    pub const VALIDATE_VALUES: &str = "validate_values";
    pub const MODEL_INFO: &str = "model_info";
    pub const BULK_OPERATION: &str = "bulk_operation";
    pub const CHECK_ACCESS: &str = "check_access";

    pub const ALL: [&str; 6] = [
        SEARCH_RECORDS,
        CHECK_DOMAIN,
        VALIDATE_VALUES,
        MODEL_INFO,
        BULK_OPERATION,
        CHECK_ACCESS,
    ];
}

/// Context carried with every operation through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationContext {
    pub call_id: u64,
    pub service_name: &'static str,
}

impl OperationContext {
    #[must_use]
    pub fn new(call_id: u64, service_name: &'static str) -> Self {
        Self {
            call_id,
            service_name,
        }
    }
}

/// Typed operation variants dispatched through the pipeline.
#[derive(Debug, Clone)]
pub enum Operation {
    // ----- Query domain -----
    SearchRecords {
        ctx: OperationContext,
        request: SearchRequest,
    },
    CheckDomain {
        ctx: OperationContext,
        request: DomainCheckRequest,
    },
    ValidateValues {
        ctx: OperationContext,
        request: ValueCheckRequest,
    },
    ModelInfo {
        ctx: OperationContext,
        request: ModelInfoRequest,
    },

    // ----- Mutation domain -----
    BulkOperation {
        ctx: OperationContext,
        request: BulkOperationRequest,
    },

    // ----- Access domain -----
    CheckAccess {
        ctx: OperationContext,
        request: AccessCheckRequest,
    },
}

impl Operation {
    #[must_use]
    pub fn ctx(&self) -> &OperationContext {
        match self {
            Self::SearchRecords { ctx, .. }
            | Self::CheckDomain { ctx, .. }
            | Self::ValidateValues { ctx, .. }
            | Self::ModelInfo { ctx, .. }
            | Self::BulkOperation { ctx, .. }
            | Self::CheckAccess { ctx, .. } => ctx,
        }
    }

    /// Tool name this operation was classified from.
    #[must_use]
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::SearchRecords { .. } => tool_names::SEARCH_RECORDS,
            Self::CheckDomain { .. } => tool_names::CHECK_DOMAIN,
            Self::ValidateValues { .. } => tool_names::VALIDATE_VALUES,
            Self::ModelInfo { .. } => tool_names::MODEL_INFO,
            Self::BulkOperation { .. } => tool_names::BULK_OPERATION,
            Self::CheckAccess { .. } => tool_names::CHECK_ACCESS,
        }
    }
}

/// Errors returned by the pipeline itself. Component failures never surface
/// here; domain services turn them into a failed `ToolResponse`.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("no service registered as '{name}' for tool {tool}")]
    UnknownService { name: String, tool: &'static str },
    #[error("wrong service for operation")]
    WrongService,
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Errors from classifying a tool call into an `Operation`.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("unknown tool: {name}")]
    UnknownTool { name: String },
    #[error("invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
