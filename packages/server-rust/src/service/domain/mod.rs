//! Domain services.
//!
//! Each service implements `tower::Service<Operation>` for one service name.
//! Component errors are turned into a failed [`ToolResponse`] here, so only
//! routing errors ever leave a service as `Err`.
//!
//! [`ToolResponse`]: recordgate_core::ToolResponse

pub mod access;
pub mod mutation;
pub mod query;

pub use access::AccessService;
pub use mutation::MutationService;
pub use query::QueryService;
