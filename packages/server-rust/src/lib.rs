//! `RecordGate` Server: batch mutations, access probing and the tool-call
//! pipeline on top of an injected remote RPC client.

pub mod access;
pub mod mutation;
pub mod service;
pub mod telemetry;
pub mod traits;

#[cfg(test)]
mod testing;

pub use access::{AccessError, AccessProbe};
pub use mutation::{BatchMutationEngine, MutationError};
pub use service::{build_operation_pipeline, GatewayConfig, OperationService};
pub use telemetry::{init_tracing, LogFormat};
pub use traits::{RpcClient, RpcError};
