//! The remote RPC capability every component is handed explicitly.

use async_trait::async_trait;
use recordgate_core::messages::{ModelInfo, SearchOptions};
use recordgate_core::{Domain, ModelSchema, Record};
use serde_json::{Map, Value};

/// Failure of a remote call. Callers only ever see its `Display` text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcError {
    /// The request never produced a response (connection, protocol, timeout).
    #[error("transport error: {0}")]
    Transport(String),
    /// The remote system answered with a fault (business rule, permission, ...).
    #[error("{0}")]
    Remote(String),
    #[error("Model '{model}' not found")]
    ModelNotFound { model: String },
}

/// Record-oriented RPC surface of the remote business-data server.
///
/// Injected into each component as `Arc<dyn RpcClient>`; nothing resolves a
/// client from shared state. Calls are awaited one at a time by every caller
/// in this crate.
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Generic method invocation (`create`, `write`, `unlink`, `check_access_rights`, ...).
    async fn execute(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value, RpcError>;

    async fn search_read(
        &self,
        model: &str,
        domain: &Domain,
        options: &SearchOptions,
    ) -> Result<Vec<Record>, RpcError>;

    /// Reads `ids`, restricted to `fields` when given. Records hidden by
    /// record rules are simply absent from the result.
    async fn read_records(
        &self,
        model: &str,
        ids: &[i64],
        fields: Option<&[String]>,
    ) -> Result<Vec<Record>, RpcError>;

    /// Live field schema. Unknown models fail with [`RpcError::ModelNotFound`].
    async fn get_model_fields(&self, model: &str) -> Result<ModelSchema, RpcError>;

    /// Unknown models fail with [`RpcError::ModelNotFound`].
    async fn get_model_info(&self, model: &str) -> Result<ModelInfo, RpcError>;
}
